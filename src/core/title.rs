//! ASCII validation for pull-request titles.

use serde::Serialize;

/// One non-ASCII character found in a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offender {
    pub character: char,
    /// `U+XXXX` form of the codepoint.
    pub codepoint: String,
    /// 1-based position of the first occurrence.
    pub column: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleCheck {
    pub title: String,
    pub offenders: Vec<Offender>,
}

impl TitleCheck {
    pub fn is_valid(&self) -> bool {
        self.offenders.is_empty()
    }
}

/// Check that every character of `title` is ASCII (codepoints 0-127).
///
/// Offenders are deduplicated and listed in order of first occurrence.
/// An empty title is valid: it is vacuously ASCII.
pub fn check(title: &str) -> TitleCheck {
    let mut offenders: Vec<Offender> = Vec::new();
    for (index, ch) in title.chars().enumerate() {
        if ch.is_ascii() {
            continue;
        }
        if offenders.iter().any(|o| o.character == ch) {
            continue;
        }
        offenders.push(Offender {
            character: ch,
            codepoint: format!("U+{:04X}", ch as u32),
            column: index + 1,
        });
    }
    TitleCheck {
        title: title.to_string(),
        offenders,
    }
}
