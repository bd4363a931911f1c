// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared utilities for diagnostics.

/// Convert a byte offset to (line, column), both 1-based.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let col = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
    (line, col)
}

/// Get the source text for a given 1-based line number.
pub fn get_source_line(source: &str, line: usize) -> String {
    source
        .lines()
        .nth(line.saturating_sub(1))
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_first_line() {
        assert_eq!(line_col("abc", 1), (1, 2));
    }

    #[test]
    fn line_col_after_newline() {
        assert_eq!(line_col("ab\ncd", 3), (2, 1));
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn line_col_clamps_past_end() {
        assert_eq!(line_col("ab", 100), (1, 3));
    }

    #[test]
    fn source_line_lookup() {
        assert_eq!(get_source_line("ab\ncd\n", 2), "cd");
        assert_eq!(get_source_line("ab", 9), "");
    }
}
