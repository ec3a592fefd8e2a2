use std::collections::HashMap;
use std::io::{self, BufRead};

use crate::error::Error;
use crate::model::Entry;

/// Parse entries from UTF-8 text.
pub fn parse_str(input: &str) -> Result<Vec<Entry>, Error> {
    parse_reader(input.as_bytes())
}

/// Parse entries from bytes.
///
/// Invalid UTF-8 in a line that holds an entry is reported as [`Error::Scan`];
/// skipped lines are not decoded.
pub fn parse_bytes(input: &[u8]) -> Result<Vec<Entry>, Error> {
    parse_reader(input)
}

/// Parse entries from a buffered reader.
///
/// Entries come back in first-occurrence order with unique keys; a repeated
/// key takes the value (and line) of its last occurrence.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Entry>, Error> {
    parse_reader_with_source(reader, None)
}

pub(crate) fn parse_reader_with_source<R: BufRead>(
    mut reader: R,
    source: Option<&str>,
) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    let mut by_key = HashMap::<String, usize>::new();
    let mut buf = Vec::new();
    let mut line_num = 0u32;

    loop {
        buf.clear();
        line_num += 1;
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| Error::Scan {
                line: line_num,
                source,
            })?;
        if read == 0 {
            break;
        }

        // Skipped lines are never decoded, so their bytes may be anything.
        let line = strip_line_ending(&buf);
        if !is_entry_line(line) {
            continue;
        }
        let line = std::str::from_utf8(line).map_err(|err| Error::Scan {
            line: line_num,
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;
        let Some((key, value)) = parse_line(line) else {
            continue;
        };

        let entry = Entry {
            key: key.to_owned(),
            value: value.to_owned(),
            source: source.map(str::to_owned),
            line: line_num,
        };

        if let Some(existing_idx) = by_key.get(&entry.key).copied() {
            entries[existing_idx] = entry;
        } else {
            by_key.insert(entry.key.clone(), entries.len());
            entries.push(entry);
        }
    }

    Ok(entries)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn is_entry_line(line: &[u8]) -> bool {
    !line.is_empty() && line[0] != b'#' && line.contains(&b'=')
}

/// Split one line into key and quote-trimmed value.
///
/// Returns `None` for blank lines, `#` comments, and lines without `=`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, raw_value) = line.split_once('=')?;
    Some((key, trim_quotes(raw_value)))
}

/// Drop at most one leading and one trailing `"`.
///
/// A value ending in `\"` keeps its trailing quote.
fn trim_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    if value.ends_with("\\\"") {
        return value;
    }
    value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<(String, String)> {
        parse_str(input)
            .expect("parse should succeed")
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }

    #[test]
    fn parses_basic_values_and_comments() {
        let input = "A=1\n# skip=me\n\nB=hello world\nC=\n";
        let parsed = parse_str(input).expect("parse should succeed");

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].key, "A");
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[0].line, 1);
        assert_eq!(parsed[1].key, "B");
        assert_eq!(parsed[1].value, "hello world");
        assert_eq!(parsed[1].line, 4);
        assert_eq!(parsed[2].key, "C");
        assert_eq!(parsed[2].value, "");
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let parsed = parse_str("A=1\nB=x\nA=2\n").expect("parse should succeed");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].key, "A");
        assert_eq!(parsed[0].value, "2");
        assert_eq!(parsed[0].line, 3);
        assert_eq!(parsed[1].key, "B");
    }

    #[test]
    fn lines_without_equals_are_ignored() {
        assert_eq!(
            values("JUST_A_WORD\nexport\nA=1\n"),
            vec![("A".to_owned(), "1".to_owned())]
        );
    }

    #[test]
    fn key_is_text_before_first_equals() {
        assert_eq!(
            values("URL=postgres://u:p@h/db?sslmode=require&x=1\n"),
            vec![(
                "URL".to_owned(),
                "postgres://u:p@h/db?sslmode=require&x=1".to_owned()
            )]
        );
    }

    #[test]
    fn keys_and_values_are_not_trimmed() {
        assert_eq!(
            values(" A = 1 \n"),
            vec![(" A ".to_owned(), " 1 ".to_owned())]
        );
    }

    #[test]
    fn indented_hash_is_not_a_comment() {
        assert_eq!(
            values("  #A=1\n"),
            vec![("  #A".to_owned(), "1".to_owned())]
        );
    }

    #[test]
    fn empty_key_is_recorded() {
        assert_eq!(values("=value\n"), vec![(String::new(), "value".to_owned())]);
    }

    #[test]
    fn strips_surrounding_double_quotes() {
        assert_eq!(
            values("SOME_ENV=\"hello, world!\"\n"),
            vec![("SOME_ENV".to_owned(), "hello, world!".to_owned())]
        );
    }

    #[test]
    fn keeps_trailing_escaped_quote() {
        assert_eq!(
            values("A=\"ends with escaped\\\"\n"),
            vec![("A".to_owned(), "ends with escaped\\\"".to_owned())]
        );
    }

    #[test]
    fn trims_only_one_quote_per_side() {
        assert_eq!(trim_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(trim_quotes("\"open"), "open");
        assert_eq!(trim_quotes("close\""), "close");
        assert_eq!(trim_quotes("\""), "");
        assert_eq!(trim_quotes("\"\""), "");
        assert_eq!(trim_quotes("mid\"dle"), "mid\"dle");
        assert_eq!(trim_quotes("'single'"), "'single'");
    }

    #[test]
    fn escaped_quote_check_runs_after_leading_trim() {
        assert_eq!(trim_quotes("\\\""), "\\\"");
        assert_eq!(trim_quotes("\"\\\""), "\\\"");
    }

    #[test]
    fn unquoted_values_are_unchanged() {
        for value in ["plain", "", "a b c", "x#y", "=="] {
            assert_eq!(trim_quotes(value), value);
        }
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        assert_eq!(
            values("A=\"1\"\r\nB=2\r\nC=3\r"),
            vec![
                ("A".to_owned(), "1".to_owned()),
                ("B".to_owned(), "2".to_owned()),
                ("C".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[test]
    fn final_line_without_newline_is_parsed() {
        assert_eq!(values("A=1"), vec![("A".to_owned(), "1".to_owned())]);
    }

    #[test]
    fn parses_unicode_values() {
        assert_eq!(
            values("GREETING=こんにちは\n"),
            vec![("GREETING".to_owned(), "こんにちは".to_owned())]
        );
    }

    #[test]
    fn invalid_utf8_is_a_scan_error() {
        let err = parse_bytes(b"A=1\nB=\xff\n").expect_err("expected scan error");
        match err {
            Error::Scan { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_utf8_comment_lines_are_skipped() {
        let parsed = parse_bytes(b"# caf\xe9 settings\nA=1\n").expect("parse should succeed");

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].key, "A");
        assert_eq!(parsed[0].value, "1");
        assert_eq!(parsed[0].line, 2);
    }

    #[test]
    fn non_utf8_lines_without_equals_are_skipped() {
        let parsed = parse_bytes(b"caf\xe9\r\nA=1\n").expect("parse should succeed");

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].key, "A");
        assert_eq!(parsed[0].value, "1");
    }

    #[test]
    fn non_utf8_key_is_a_scan_error() {
        let err = parse_bytes(b"# ok\n\xe9=1\n").expect_err("expected scan error");
        match err {
            Error::Scan { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn source_name_is_attached() {
        let parsed = parse_reader_with_source("A=1\n".as_bytes(), Some("app.env"))
            .expect("parse should succeed");
        assert_eq!(parsed[0].source.as_deref(), Some("app.env"));
    }
}
