use std::path::Path;

use crate::error::{Error, Result};

/// Parse comma-separated program text.
///
/// Whitespace and line breaks around each value are ignored, as is a single
/// trailing comma.
pub fn parse(text: &str) -> Result<Vec<i64>> {
    let text = text.trim();
    let text = text.strip_suffix(',').unwrap_or(text);
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .enumerate()
        .map(|(index, token)| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| Error::Parse {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read and parse a program file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<i64>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse("1,0,0,3,99").unwrap(), vec![1, 0, 0, 3, 99]);
    }

    #[test]
    fn test_parse_negative_and_large() {
        assert_eq!(
            parse("104,1125899906842624,-7,99").unwrap(),
            vec![104, 1125899906842624, -7, 99]
        );
    }

    #[test]
    fn test_parse_line_breaks() {
        assert_eq!(parse("1,2,\n3,4\n").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(parse("3,0,4,0,99,\n").unwrap(), vec![3, 0, 4, 0, 99]);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse(" \n").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_parse_error() {
        let err = parse("1,2,x,4").unwrap_err();
        assert!(matches!(err, Error::Parse { index: 2, ref token } if token == "x"));
        assert!(matches!(parse("1,,2"), Err(Error::Parse { index: 1, .. })));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load("/nonexistent/intcode/program.txt"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("intcode-load-{}.txt", std::process::id()));
        std::fs::write(&path, "3,0,4,0,99\n").unwrap();
        let program = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(program, vec![3, 0, 4, 0, 99]);
    }
}
