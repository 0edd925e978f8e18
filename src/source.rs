//! Program text with a line table.
//!
//! Positions everywhere in the pipeline are character indices into the text,
//! which is also what ariadne expects when rendering reports.

use crate::error::TextSpan;
use std::fmt;

/// One line of the source. `length` excludes the line break,
/// `length_including_line_break` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLine {
    pub start: usize,
    pub length: usize,
    pub length_including_line_break: usize,
}

impl TextLine {
    pub fn span(&self) -> TextSpan {
        TextSpan::new(self.start, self.length)
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    chars: Vec<char>,
    lines: Vec<TextLine>,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars: Vec<char> = text.chars().collect();
        let lines = Self::parse_lines(&chars);
        Self { text, chars, lines }
    }

    fn parse_lines(chars: &[char]) -> Vec<TextLine> {
        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut position = 0;

        while position < chars.len() {
            let break_width = match (chars[position], chars.get(position + 1)) {
                ('\r', Some('\n')) => 2,
                ('\r', _) | ('\n', _) => 1,
                _ => 0,
            };

            if break_width == 0 {
                position += 1;
            } else {
                lines.push(TextLine {
                    start: line_start,
                    length: position - line_start,
                    length_including_line_break: position - line_start + break_width,
                });
                position += break_width;
                line_start = position;
            }
        }

        if position >= line_start {
            lines.push(TextLine {
                start: line_start,
                length: position - line_start,
                length_including_line_break: position - line_start,
            });
        }

        lines
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters in the text.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `position`, or `'\0'` past the end.
    pub fn char_at(&self, position: usize) -> char {
        self.chars.get(position).copied().unwrap_or('\0')
    }

    pub fn slice(&self, span: TextSpan) -> String {
        let start = span.start.min(self.chars.len());
        let end = span.end().min(self.chars.len());
        self.chars[start..end].iter().collect()
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Zero-based index of the line containing `position`.
    pub fn line_index(&self, position: usize) -> usize {
        // lines is never empty and is sorted by start
        match self.lines.binary_search_by(|line| line.start.cmp(&position)) {
            Ok(index) => index,
            Err(insertion) => insertion.saturating_sub(1),
        }
    }

    /// Zero-based `(line, column)` of `position`.
    pub fn line_column(&self, position: usize) -> (usize, usize) {
        let line = self.line_index(position);
        let column = position.saturating_sub(self.lines[line].start);
        (line, column)
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
