//! `.properties` parser.
//!
//! Line oriented: a line whose first non-blank character is `#` or `!` is a
//! comment, anything else is an entry. `#` and `!` later on a line belong
//! to the value.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use nom::{
    branch::alt,
    character::complete::{anychar, char, line_ending, multispace0, none_of, not_line_ending, one_of, space0},
    combinator::{map, opt, recognize},
    multi::many0,
    sequence::pair,
    IResult,
};
use rewrite_core::parser::parse_failure;
use rewrite_core::{ExecutionContext, Meta, Parser, ParserInput, SourceFile};
use tracing::debug;

use crate::tree::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertiesParseError {
    #[error("cannot parse properties at offset {offset}")]
    Syntax { offset: usize },

    #[error("source is not valid UTF-8")]
    Encoding,

    #[error("printed tree diverges from the input at offset {offset}")]
    PrintMismatch { offset: usize },
}

/// A backslash and the character it escapes. A backslash before a line
/// break continues the logical line.
fn escaped(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), opt(alt((line_ending, recognize(anychar))))))(input)
}

fn key(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((escaped, recognize(none_of("=: \t\x0c\r\n\\"))))))(input)
}

fn value_text(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((escaped, recognize(none_of("\\\r\n"))))))(input)
}

fn comment(input: &str) -> IResult<&str, Properties> {
    map(pair(one_of("#!"), not_line_ending), |(delimiter, message): (char, &str)| {
        Comment {
            meta: Meta::new(),
            prefix: String::new(),
            delimiter: if delimiter == '#' {
                CommentDelimiter::Hash
            } else {
                CommentDelimiter::Exclamation
            },
            message: message.to_string(),
        }
        .into()
    })(input)
}

fn entry(input: &str) -> IResult<&str, Properties> {
    let (input, key) = key(input)?;
    let (input, before_equals) = space0(input)?;
    let (input, delimiter) = opt(one_of("=:"))(input)?;
    let (input, value_prefix) = space0(input)?;
    let (input, text) = value_text(input)?;

    let delimiter = match delimiter {
        Some('=') => Delimiter::Equals,
        Some(_) => Delimiter::Colon,
        None => Delimiter::None,
    };
    let value = Value {
        meta: Meta::new(),
        prefix: value_prefix.to_string(),
        text: text.to_string(),
    };
    Ok((
        input,
        Entry {
            meta: Meta::new(),
            prefix: String::new(),
            key: key.to_string(),
            before_equals: before_equals.to_string(),
            delimiter,
            value: value.into(),
        }
        .into(),
    ))
}

fn with_prefix(element: Properties, prefix: &str) -> Properties {
    match element {
        Properties::Entry(entry) => Entry {
            prefix: prefix.to_string(),
            ..(*entry).clone()
        }
        .into(),
        Properties::Comment(comment) => Comment {
            prefix: prefix.to_string(),
            ..(*comment).clone()
        }
        .into(),
        other => other,
    }
}

/// Parse one file; the tree prints back to `source` exactly
pub fn parse_properties(source: &str) -> Result<File, PropertiesParseError> {
    let offset = |rest: &str| source.len() - rest.len();
    let mut content = Vec::new();
    let mut rest = source;

    let eof = loop {
        let (after, prefix) = multispace0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| PropertiesParseError::Syntax { offset: offset(rest) })?;
        if after.is_empty() {
            break prefix.to_string();
        }
        let (after, element) =
            alt((comment, entry))(after).map_err(|_| PropertiesParseError::Syntax { offset: offset(after) })?;
        if after.len() == rest.len() {
            return Err(PropertiesParseError::Syntax { offset: offset(rest) });
        }
        content.push(with_prefix(element, prefix));
        rest = after;
    };

    let file = File {
        meta: Meta::new(),
        source_path: PathBuf::from("file.properties"),
        charset: "UTF-8".to_string(),
        file_attributes: None,
        content,
        eof,
    };

    let printed = file.print();
    if printed != source {
        let offset = printed
            .bytes()
            .zip(source.bytes())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| printed.len().min(source.len()));
        return Err(PropertiesParseError::PrintMismatch { offset });
    }
    Ok(file)
}

#[derive(Debug, Default, Clone)]
pub struct PropertiesParser;

impl PropertiesParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single in-memory source placed at `path`
    pub fn parse_source(&self, path: impl Into<PathBuf>, source: &str, ctx: &ExecutionContext) -> Arc<dyn SourceFile> {
        let input = ParserInput::new(path, source.as_bytes());
        self.parse_one(&input, ctx)
    }

    fn parse_one(&self, input: &ParserInput, _ctx: &ExecutionContext) -> Arc<dyn SourceFile> {
        let parsed = input
            .text()
            .map_err(|_| PropertiesParseError::Encoding)
            .and_then(parse_properties);
        match parsed {
            Ok(file) => {
                debug!(path = %input.path.display(), entries = file.entries().count(), "parsed properties");
                Arc::new(File {
                    source_path: input.path.clone(),
                    ..file
                })
            }
            Err(e) => parse_failure(self.name(), input, e.to_string()),
        }
    }
}

impl Parser for PropertiesParser {
    fn name(&self) -> &'static str {
        "properties"
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "properties")
    }

    fn parse_inputs(&self, inputs: &[ParserInput], ctx: &ExecutionContext) -> Vec<Arc<dyn SourceFile>> {
        inputs.iter().map(|input| self.parse_one(input, ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(source: &str) -> File {
        let file = parse_properties(source).unwrap();
        assert_eq!(file.print(), source);
        file
    }

    #[test]
    fn test_delimiters() {
        let file = round_trip("a=1\nb: 2\nc 3\nd = 4\n");
        let found: Vec<(&str, Delimiter, &str)> = file
            .entries()
            .map(|e| (e.key.as_str(), e.delimiter, e.value_text()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a", Delimiter::Equals, "1"),
                ("b", Delimiter::Colon, "2"),
                ("c", Delimiter::None, "3"),
                ("d", Delimiter::Equals, "4"),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let file = round_trip("# header\n\n! bang\n  key=value\n\n");
        assert_eq!(file.content.len(), 3);
        assert!(matches!(&file.content[1], Properties::Comment(c) if c.delimiter == CommentDelimiter::Exclamation));
        assert_eq!(file.eof, "\n\n");
        assert_eq!(file.get("key"), Some("value"));
    }

    #[test]
    fn test_pound_inside_value_is_value() {
        let file = round_trip("key=**##**chassis.name\nurl=https://example.org/a**/#**b\n");
        assert_eq!(file.get("key"), Some("**##**chassis.name"));
        assert_eq!(file.get("url"), Some("https://example.org/a**/#**b"));
        assert!(file.content.iter().all(|c| matches!(c, Properties::Entry(_))));
    }

    #[test]
    fn test_continuation_and_escapes() {
        let file = round_trip("list=a,\\\n    b\nkey\\=with\\:escapes=v\r\nlast");
        assert_eq!(file.get("list"), Some("a,\\\n    b"));
        assert_eq!(file.get("key\\=with\\:escapes"), Some("v"));
        assert_eq!(file.get("last"), Some(""));
    }

    #[test]
    fn test_parser_keeps_path() {
        let ctx = ExecutionContext::new();
        let parsed = PropertiesParser::new().parse_source("gradle/wrapper/gradle-wrapper.properties", "a=b", &ctx);
        assert_eq!(parsed.source_path(), Path::new("gradle/wrapper/gradle-wrapper.properties"));
        assert_eq!(parsed.print(), "a=b");
    }
}
