//! Row codec for the persisted tables.
//!
//! Character tables and the glyph database are flat, UTF-8, one record per
//! line. Fields are separated by `,`; a field containing `,` or `"` is
//! wrapped in double quotes and embedded quotes are doubled. This is the only
//! escaping convention. Line breaks inside values are not representable.

use std::io::BufRead;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_while},
    character::complete::char,
    combinator::{all_consuming, map},
    multi::{many0, separated_list1},
    sequence::delimited,
};

use crate::error::{Error, Result};

/// Body of a quoted field: runs of non-quote text and doubled quotes.
fn quoted_body(input: &str) -> IResult<&str, String> {
    map(
        many0(alt((
            map(is_not("\""), |s: &str| s.to_string()),
            map(tag("\"\""), |_| "\"".to_string()),
        ))),
        |parts| parts.concat(),
    )(input)
}

fn quoted_field(input: &str) -> IResult<&str, String> {
    delimited(char('"'), quoted_body, char('"'))(input)
}

fn bare_field(input: &str) -> IResult<&str, String> {
    map(take_while(|c: char| c != ',' && c != '"'), |s: &str| s.to_string())(input)
}

fn field(input: &str) -> IResult<&str, String> {
    alt((quoted_field, bare_field))(input)
}

/// Parse one line into its fields.
///
/// `line_no` is only used for error reporting.
pub fn parse_row(line: &str, line_no: usize) -> Result<Vec<String>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    match all_consuming(separated_list1(char(','), field))(line) {
        Ok((_, fields)) => Ok(fields),
        Err(e) => Err(Error::RowFormat {
            line: line_no,
            reason: format!("cannot split fields: {:?}", e),
        }),
    }
}

/// Format fields as one line (without the trailing newline).
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> Result<String> {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        let field = field.as_ref();
        if field.contains(['\n', '\r']) {
            return Err(Error::RowFormat {
                line: 0,
                reason: format!("field {} contains a line break", i),
            });
        }
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    Ok(out)
}

/// Feed every non-empty line of `reader` to `handle` as parsed fields.
///
/// Returns the number of rows handled. Line numbers passed to `handle` are
/// 1-based.
pub fn for_each_row<R, F>(reader: R, mut handle: F) -> Result<usize>
where
    R: BufRead,
    F: FnMut(usize, Vec<String>) -> Result<()>,
{
    let mut count = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_row(&line, line_no)?;
        log::trace!("row {}: {} fields", line_no, fields.len());
        handle(line_no, fields)?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_row() {
        let fields = parse_row("Ededris-a,97,ཀ", 1).unwrap();
        assert_eq!(fields, vec!["Ededris-a", "97", "ཀ"]);
    }

    #[test]
    fn test_parse_quoted_comma() {
        let fields = parse_row("FontA,44,\",\"", 1).unwrap();
        assert_eq!(fields, vec!["FontA", "44", ","]);
    }

    #[test]
    fn test_parse_doubled_quote() {
        let fields = parse_row("FontA,34,\"\"\"\"", 1).unwrap();
        assert_eq!(fields, vec!["FontA", "34", "\""]);
    }

    #[test]
    fn test_parse_empty_trailing_field() {
        let fields = parse_row("FontA,31,", 1).unwrap();
        assert_eq!(fields, vec!["FontA", "31", ""]);
    }

    #[test]
    fn test_parse_strips_carriage_return() {
        let fields = parse_row("a,b\r", 1).unwrap();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_garbage_after_quote_fails() {
        let err = parse_row("FontA,\"x\"y,z", 7).unwrap_err();
        assert!(matches!(err, Error::RowFormat { line: 7, .. }));
    }

    #[test]
    fn test_parse_unterminated_quote_fails() {
        assert!(parse_row("FontA,\"abc", 1).is_err());
    }

    #[test]
    fn test_format_escapes_only_when_needed() {
        let line = format_row(&["FontA", "44", ",", "say \"hi\""]).unwrap();
        assert_eq!(line, "FontA,44,\",\",\"say \"\"hi\"\"\"");
        let back = parse_row(&line, 1).unwrap();
        assert_eq!(back, vec!["FontA", "44", ",", "say \"hi\""]);
    }

    #[test]
    fn test_format_rejects_line_break() {
        assert!(format_row(&["a\nb"]).is_err());
    }

    #[test]
    fn test_for_each_row_skips_blank_lines() {
        let data = "a,1,x\n\nb,2,y\n";
        let mut seen = Vec::new();
        let count = for_each_row(data.as_bytes(), |line, fields| {
            seen.push((line, fields[0].clone()));
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(seen, vec![(1, "a".to_string()), (3, "b".to_string())]);
    }
}
