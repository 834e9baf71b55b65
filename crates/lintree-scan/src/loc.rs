//! Code-line counting.
//!
//! A line counts as code when, once trimmed, it is non-empty and does not
//! start with the single-line comment prefix. Block comments are not
//! recognised, so this is a density heuristic rather than exact accounting.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use lintree_core::ScanError;

/// Count code lines from a reader.
pub fn count_code_lines<R: BufRead>(mut reader: R, comment_prefix: &str) -> io::Result<u64> {
    let prefix = comment_prefix.as_bytes();
    let mut buffer = Vec::new();
    let mut count = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(count);
        }
        let line = buffer.trim_ascii();
        if !line.is_empty() && (prefix.is_empty() || !line.starts_with(prefix)) {
            count += 1;
        }
    }
}

/// Count code lines of a file on disk.
pub fn count_file_lines(path: &Path, comment_prefix: &str) -> Result<u64, ScanError> {
    let file = fs::File::open(path).map_err(|e| ScanError::io(path, e))?;
    count_code_lines(BufReader::new(file), comment_prefix).map_err(|e| ScanError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_code_lines() {
        let source = "package main\n\n// comment\n   // indented comment\nfunc main() {\n\t\n}\n";
        assert_eq!(count_code_lines(source.as_bytes(), "//").unwrap(), 3);
    }

    #[test]
    fn test_counts_last_line_without_newline() {
        assert_eq!(count_code_lines("a\nb".as_bytes(), "//").unwrap(), 2);
        assert_eq!(count_code_lines("".as_bytes(), "//").unwrap(), 0);
    }

    #[test]
    fn test_block_comments_are_code() {
        let source = "/* block\n   comment */\nx := 1 // trailing\n";
        assert_eq!(count_code_lines(source.as_bytes(), "//").unwrap(), 3);
    }

    #[test]
    fn test_non_utf8_content() {
        let source: &[u8] = b"\xff\xfe\n// \xff\n";
        assert_eq!(count_code_lines(source, "//").unwrap(), 1);
    }

    #[test]
    fn test_alternative_prefix() {
        let source = "# comment\nvalue = 1\n";
        assert_eq!(count_code_lines(source.as_bytes(), "#").unwrap(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = count_file_lines(Path::new("/definitely/not/here.go"), "//").unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }
}
