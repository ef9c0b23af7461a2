//! Line table: per-line indent records and the char buffer backing the
//! whole source. The parser reads indents from here instead of re-scanning
//! whitespace, and error rendering recovers line text from here.

use crate::error::{self, Diagnostic};
use crate::lexer::token::{CR, EOF_CHAR, LF};

/// Indent style of a source. Only tabs or 4-space groups are valid, and a
/// source must not mix them. The numeric values feed diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentKind {
    Unknown,
    Tab,
    Space,
}

impl IndentKind {
    pub fn as_u8(self) -> u8 {
        match self {
            IndentKind::Unknown => 0,
            IndentKind::Tab => 9,
            IndentKind::Space => 32,
        }
    }
}

/// Indent count and absolute char range of one scanned physical line.
/// `start_idx` points at the first char after the indent; `end_idx` is one
/// past the last char before the line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub indents: usize,
    pub start_idx: usize,
    pub end_idx: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Init,
    Indent,
    End,
}

#[derive(Debug, Clone, Copy)]
struct ScanCursor {
    start_idx: usize,
    indents: usize,
    state: ScanState,
}

#[derive(Debug, Clone)]
pub struct LineTable {
    indent_kind: IndentKind,
    current_line: usize,
    lines: Vec<LineInfo>,
    scan: ScanCursor,
    buffer: Vec<char>,
}

impl LineTable {
    pub fn new() -> Self {
        Self {
            indent_kind: IndentKind::Unknown,
            current_line: 1,
            lines: Vec::new(),
            scan: ScanCursor {
                start_idx: 0,
                indents: 0,
                state: ScanState::Init,
            },
            buffer: Vec::new(),
        }
    }

    pub fn indent_kind(&self) -> IndentKind {
        self.indent_kind
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    /// Record the indent of the line being scanned. The first tab/space
    /// indent fixes the source's indent kind; later lines must match, and
    /// space indents must come in groups of four.
    pub fn set_indent(&mut self, count: usize, kind: IndentKind) -> Result<(), Diagnostic> {
        match kind {
            IndentKind::Unknown => {
                if count > 0 && self.indent_kind != kind {
                    return Err(error::invalid_indent_type(
                        self.indent_kind.as_u8(),
                        kind.as_u8(),
                    ));
                }
            }
            IndentKind::Tab | IndentKind::Space => {
                if self.indent_kind == IndentKind::Unknown {
                    self.indent_kind = kind;
                }
                if kind == IndentKind::Space && count % 4 != 0 {
                    return Err(error::invalid_indent_space_count(count));
                }
                if self.indent_kind != kind {
                    return Err(error::invalid_indent_type(
                        self.indent_kind.as_u8(),
                        kind.as_u8(),
                    ));
                }
            }
        }

        let indent_num = if self.indent_kind == IndentKind::Space {
            count / 4
        } else {
            count
        };

        self.scan.indents = indent_num;
        self.scan.state = ScanState::Indent;
        self.scan.start_idx += count;
        Ok(())
    }

    /// Commit the line being scanned, with `last_index` one past its final
    /// char (line break excluded).
    pub fn push_line(&mut self, last_index: usize) {
        self.lines.push(LineInfo {
            indents: self.scan.indents,
            start_idx: self.scan.start_idx,
            end_idx: last_index,
        });
        self.scan.state = ScanState::End;
    }

    /// Start scanning the next physical line at absolute index `index`.
    pub fn new_line(&mut self, index: usize) {
        self.scan = ScanCursor {
            start_idx: index,
            indents: 0,
            state: ScanState::Init,
        };
        self.current_line += 1;
    }

    /// Whether incoming SP/TAB chars still count as indentation.
    pub fn on_indent_stage(&self) -> bool {
        self.scan.state == ScanState::Init
    }

    pub fn append_buffer(&mut self, data: &[char]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn char_at(&self, idx: usize) -> char {
        self.buffer.get(idx).copied().unwrap_or(EOF_CHAR)
    }

    /// Indent (in logical units) of a scanned line; the line being scanned
    /// answers with its running indent.
    pub fn line_indent(&self, line_num: usize) -> Option<usize> {
        if line_num == 0 || line_num > self.current_line {
            return None;
        }
        if line_num == self.current_line {
            return Some(self.scan.indents);
        }
        self.lines.get(line_num - 1).map(|info| info.indents)
    }

    /// Line text without indent chars or line breaks. For the line still
    /// being scanned, text runs to the next break present in the buffer.
    pub fn line_text(&self, line_num: usize) -> String {
        if line_num == 0 || line_num > self.current_line {
            return String::new();
        }
        if line_num < self.current_line {
            let info = &self.lines[line_num - 1];
            return self.buffer[info.start_idx..info.end_idx].iter().collect();
        }
        let start = self.scan.start_idx;
        let mut end = start;
        while end < self.buffer.len() && !matches!(self.buffer[end], CR | LF | EOF_CHAR) {
            end += 1;
        }
        self.buffer[start..end].iter().collect()
    }

    /// Column (char offset into the displayed line text) of an absolute
    /// buffer index on the given line.
    pub fn line_column(&self, line_num: usize, cursor: usize) -> usize {
        if line_num == self.current_line {
            return cursor.saturating_sub(self.scan.start_idx);
        }
        match self.lines.get(line_num.wrapping_sub(1)) {
            Some(info) => cursor.saturating_sub(info.start_idx),
            None => 0,
        }
    }
}

impl Default for LineTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_indent_must_be_multiple_of_four() {
        let mut table = LineTable::new();
        assert!(table.set_indent(4, IndentKind::Space).is_ok());
        let err = table
            .set_indent(6, IndentKind::Space)
            .expect_err("expected indent count failure");
        assert_eq!(err.code(), 0x2022);
    }

    #[test]
    fn indent_kind_is_sticky() {
        let mut table = LineTable::new();
        table.set_indent(4, IndentKind::Space).expect("first indent");
        let err = table
            .set_indent(1, IndentKind::Tab)
            .expect_err("expected indent type conflict");
        assert_eq!(err.code(), 0x2021);
    }

    #[test]
    fn records_line_ranges_in_order() {
        let mut table = LineTable::new();
        let source: Vec<char> = "令A为1\n    B为2\n".chars().collect();
        table.append_buffer(&source);

        table.set_indent(0, IndentKind::Unknown).expect("indent");
        table.push_line(4);
        table.new_line(5);
        table.set_indent(4, IndentKind::Space).expect("indent");
        table.push_line(12);

        assert_eq!(table.line_indent(1), Some(0));
        assert_eq!(table.line_indent(2), Some(1));
        assert_eq!(table.line_text(1), "令A为1");
        assert_eq!(table.line_text(2), "B为2");
        // adjacent entries never overlap
        let lines = table.lines();
        assert!(lines[0].end_idx <= lines[1].start_idx);
    }

    #[test]
    fn current_line_text_stops_at_break() {
        let mut table = LineTable::new();
        let source: Vec<char> = "令A为1\n令B为2".chars().collect();
        table.append_buffer(&source);
        table.set_indent(0, IndentKind::Unknown).expect("indent");
        table.push_line(4);
        table.new_line(5);
        table.set_indent(0, IndentKind::Unknown).expect("indent");
        assert_eq!(table.line_text(2), "令B为2");
        assert_eq!(table.line_column(2, 6), 1);
    }
}
