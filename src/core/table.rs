//! CSV parsing and Markdown pipe-table rendering.
//!
//! A [`Table`] is parsed whole before anything is rendered, so a
//! malformed input never produces a partial table. Pipe and backslash
//! escaping is reversible ([`Table::parse_markdown`] recovers the
//! original cells); embedded newlines become `<br>` one-way.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::core::error::{Error, Result};
use crate::utils::io;

/// Separator dashes never shrink below this, even for narrow columns.
const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse a CSV file (comma delimiter, first row = header).
    ///
    /// Cells are whitespace-trimmed. Every row must have the same cell
    /// count as the header; the first violation aborts the parse with
    /// `input.malformed` naming the offending line.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::input_file_not_found(path));
        }

        let file = File::open(path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("open '{}'", path.display())))
        })?;

        // flexible(true): ragged rows reach us instead of aborting the
        // reader, so the error can name the line and expected count.
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record =
                result.map_err(|e| Error::input_malformed(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let cells: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();

            match &header {
                None => header = Some(cells),
                Some(expected) => {
                    if cells.len() != expected.len() {
                        return Err(Error::input_malformed(format!(
                            "line {}: expected {} cells, found {}",
                            line,
                            expected.len(),
                            cells.len()
                        )));
                    }
                    rows.push(cells);
                }
            }
        }

        let header = header.ok_or_else(|| Error::input_malformed("CSV file is empty"))?;
        Ok(Self { header, rows })
    }

    /// Render the table as Markdown: header, dash separator, body rows.
    ///
    /// Cells are padded to the column's maximum escaped width so the
    /// plain text aligns. Output ends with a trailing newline.
    pub fn render_markdown(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        out.push_str(&render_row(&self.header, &widths));
        out.push_str(&render_separator(&widths));
        for row in &self.rows {
            out.push_str(&render_row(row, &widths));
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .header
            .iter()
            .map(|cell| escape_cell(cell).chars().count().max(MIN_COLUMN_WIDTH))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = escape_cell(cell).chars().count();
                if len > widths[i] {
                    widths[i] = len;
                }
            }
        }
        widths
    }

    /// Parse a rendered Markdown table back into header and rows,
    /// reversing the pipe/backslash escaping.
    pub fn parse_markdown(input: &str) -> Result<Self> {
        let mut lines = input.lines().filter(|line| !line.trim().is_empty());

        let header_line = lines
            .next()
            .ok_or_else(|| Error::input_malformed("Markdown table is empty"))?;
        let header = parse_row(header_line)?;

        let separator_line = lines
            .next()
            .ok_or_else(|| Error::input_malformed("Markdown table has no separator row"))?;
        if !is_separator_row(separator_line) {
            return Err(Error::input_malformed(
                "second line of a Markdown table must be a dash separator",
            ));
        }

        let mut rows = Vec::new();
        for line in lines {
            let cells = parse_row(line)?;
            if cells.len() != header.len() {
                return Err(Error::input_malformed(format!(
                    "table row has {} cells, header has {}",
                    cells.len(),
                    header.len()
                )));
            }
            rows.push(cells);
        }

        Ok(Self { header, rows })
    }
}

/// Render a table to a destination file.
///
/// An existing destination is refused unless `force` is set, so a CI
/// run never clobbers a file by accident.
pub fn write_markdown(table: &Table, dest: &Path, force: bool) -> Result<()> {
    if dest.exists() && !force {
        return Err(
            Error::output_write_failed(dest, "destination already exists")
                .with_hint("Pass --force to overwrite it"),
        );
    }
    io::write_file(dest, &table.render_markdown())
}

/// Escape a cell for embedding in a pipe table.
///
/// `\` becomes `\\` and `|` becomes `\|` (both reversible). Newlines
/// become `<br>` so a multi-line cell cannot break the row; carriage
/// returns are dropped.
pub fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for ch in cell.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_cell`] for `\\` and `\|` (not `<br>`).
pub fn unescape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let escaped = escape_cell(cell);
        let padding = width - escaped.chars().count();
        line.push(' ');
        line.push_str(&escaped);
        for _ in 0..padding {
            line.push(' ');
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}

fn render_separator(widths: &[usize]) -> String {
    let mut line = String::from("|");
    for width in widths {
        line.push(' ');
        for _ in 0..*width {
            line.push('-');
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}

fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(inner) = trimmed
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
    else {
        return false;
    };
    inner.split('|').all(|cell| {
        let cell = cell.trim();
        !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
    })
}

/// Split a `| a | b |` line into unescaped cells.
fn parse_row(line: &str) -> Result<Vec<String>> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('|')
        .and_then(|rest| rest.strip_suffix('|'))
        .ok_or_else(|| Error::input_malformed(format!("not a table row: {}", line)))?;

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            current.push('\\');
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '|' => {
                cells.push(unescape_cell(current.trim()));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if escaped {
        current.push('\\');
    }
    cells.push(unescape_cell(current.trim()));
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn renders_m_plus_two_lines_with_n_cells_each() {
        let file = csv_file("name,role\nalice,admin\nbob,viewer\ncarol,editor\n");
        let table = Table::from_csv_path(file.path()).unwrap();
        let rendered = table.render_markdown();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5); // header + separator + 3 rows

        let parsed = Table::parse_markdown(&rendered).unwrap();
        assert_eq!(parsed.header.len(), 2);
        for row in &parsed.rows {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn cells_are_trimmed() {
        let file = csv_file("a , b\n  1,2  \n");
        let table = Table::from_csv_path(file.path()).unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let file = csv_file("name,notes\nalice,\"likes a, b, and c\"\n");
        let table = Table::from_csv_path(file.path()).unwrap();
        assert_eq!(table.rows[0][1], "likes a, b, and c");
    }

    #[test]
    fn pipe_escaping_round_trips() {
        let table = Table {
            header: vec!["cmd".to_string(), "desc".to_string()],
            rows: vec![vec!["a | b".to_string(), "pipe in cell".to_string()]],
        };
        let rendered = table.render_markdown();
        let parsed = Table::parse_markdown(&rendered).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn backslash_escaping_round_trips() {
        let table = Table {
            header: vec!["path".to_string()],
            rows: vec![vec!["C:\\temp\\file".to_string()], vec!["end\\".to_string()]],
        };
        let rendered = table.render_markdown();
        let parsed = Table::parse_markdown(&rendered).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn embedded_newline_becomes_br() {
        let file = csv_file("k,v\nx,\"line one\nline two\"\n");
        let table = Table::from_csv_path(file.path()).unwrap();
        let rendered = table.render_markdown();
        assert!(rendered.contains("line one<br>line two"));
        // Still one physical line per row
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn ragged_row_is_malformed() {
        let file = csv_file("a,b,c\n1,2,3\n4,5\n");
        let err = Table::from_csv_path(file.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "input.malformed");
        assert!(err.message.contains("expected 3 cells, found 2"));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = Table::from_csv_path(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert_eq!(err.code.as_str(), "input.file_not_found");
    }

    #[test]
    fn empty_file_is_malformed() {
        let file = csv_file("");
        let err = Table::from_csv_path(file.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "input.malformed");
    }

    #[test]
    fn separator_dashes_match_column_widths() {
        let file = csv_file("id,description\n1,a much longer cell\n");
        let table = Table::from_csv_path(file.path()).unwrap();
        let rendered = table.render_markdown();
        let lines: Vec<&str> = rendered.lines().collect();
        // Every line is the same width once cells are padded
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[0].len(), lines[2].len());
        assert!(lines[1].contains("------------------"));
    }

    #[test]
    fn narrow_columns_get_minimum_dash_run() {
        let file = csv_file("a,b\n1,2\n");
        let table = Table::from_csv_path(file.path()).unwrap();
        let rendered = table.render_markdown();
        assert_eq!(rendered.lines().nth(1).unwrap(), "| --- | --- |");
    }

    #[test]
    fn write_markdown_refuses_existing_destination() {
        let table = Table {
            header: vec!["a".to_string()],
            rows: vec![],
        };
        let dest = NamedTempFile::new().unwrap();
        let err = write_markdown(&table, dest.path(), false).unwrap_err();
        assert_eq!(err.code.as_str(), "output.write_failed");
        assert!(!err.hints.is_empty());

        write_markdown(&table, dest.path(), true).unwrap();
        let written = std::fs::read_to_string(dest.path()).unwrap();
        assert_eq!(written, table.render_markdown());
    }

    #[test]
    fn parse_markdown_rejects_missing_separator() {
        let err = Table::parse_markdown("| a | b |\n| 1 | 2 |\n").unwrap_err();
        assert_eq!(err.code.as_str(), "input.malformed");
    }
}
