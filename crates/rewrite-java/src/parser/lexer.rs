//! Tokenizer. Whitespace and comments are not tokens: they accumulate into
//! the `prefix` of the token that follows them, and the trailing run ends up
//! on the `Eof` token.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};

use super::JavaParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifiers and keywords alike
    Ident,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    Operator,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub prefix: String,
    pub text: String,
    pub offset: usize,
}

/// Longest first. `>` never combines here: generic type arguments close
/// with single `>` tokens and the grammar glues shift operators back
/// together.
const OPERATORS: &[&str] = &[
    "<<=", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", "<<", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "(", ")", "{", "}", "[", "]", ";", ",", ".", "@", "=", ">", "<", "!", "~", "?", ":", "+", "-", "*",
    "/", "&", "|", "^", "%",
];

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn trivia(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((multispace1, line_comment, block_comment))))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_' || c == '$'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))(input)
}

fn digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, take_while(|c: char| c.is_ascii_digit() || c == '_')))(input)
}

fn hex_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag_no_case("0x"),
        take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
        opt(one_of("lL")),
    )))(input)
}

fn decimal_number(input: &str) -> IResult<&str, &str> {
    let exponent = recognize(tuple((one_of("eE"), opt(one_of("+-")), digits)));
    recognize(tuple((
        alt((
            recognize(pair(digits, opt(pair(char('.'), opt(digits))))),
            recognize(pair(char('.'), digits)),
        )),
        opt(exponent),
        opt(one_of("lLfFdD")),
    )))(input)
}

fn classify_number(text: &str) -> TokenKind {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") {
        if lower.ends_with('l') {
            TokenKind::LongLiteral
        } else {
            TokenKind::IntLiteral
        }
    } else if lower.ends_with('l') {
        TokenKind::LongLiteral
    } else if lower.ends_with('f') {
        TokenKind::FloatLiteral
    } else if lower.ends_with('d') || lower.contains('.') || lower.contains('e') {
        TokenKind::DoubleLiteral
    } else {
        TokenKind::IntLiteral
    }
}

/// Byte length of a quoted literal starting at `input`, escapes included
fn quoted(input: &str, quote: char) -> Option<usize> {
    let mut chars = input.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => return None,
            c if c == quote => return Some(i + c.len_utf8()),
            _ => {}
        }
    }
    None
}

fn text_block(input: &str) -> Option<usize> {
    let mut chars = input.char_indices().skip(3);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if input[i..].starts_with("\"\"\"") {
            return Some(i + 3);
        }
    }
    None
}

fn next_token(rest: &str, offset: usize) -> Result<(TokenKind, usize), JavaParseError> {
    if let Ok((after, _)) = identifier(rest) {
        return Ok((TokenKind::Ident, rest.len() - after.len()));
    }

    let mut chars = rest.chars();
    let first = chars.next().unwrap_or_default();
    let second = chars.next();
    if first.is_ascii_digit() || (first == '.' && second.is_some_and(|c| c.is_ascii_digit())) {
        if let Ok((_, text)) = alt((hex_number, decimal_number))(rest) {
            return Ok((classify_number(text), text.len()));
        }
    }

    match first {
        '"' if rest.starts_with("\"\"\"") => text_block(rest)
            .map(|len| (TokenKind::StringLiteral, len))
            .ok_or(JavaParseError::Unterminated {
                what: "text block",
                offset,
            }),
        '"' => quoted(rest, '"')
            .map(|len| (TokenKind::StringLiteral, len))
            .ok_or(JavaParseError::Unterminated {
                what: "string literal",
                offset,
            }),
        '\'' => quoted(rest, '\'')
            .map(|len| (TokenKind::CharLiteral, len))
            .ok_or(JavaParseError::Unterminated {
                what: "character literal",
                offset,
            }),
        _ => OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .map(|op| (TokenKind::Operator, op.len()))
            .ok_or(JavaParseError::UnexpectedCharacter { found: first, offset }),
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, JavaParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        let (after, prefix) = match trivia(rest) {
            Ok(parsed) => parsed,
            Err(_) => (rest, ""),
        };
        rest = after;
        let offset = source.len() - rest.len();

        if rest.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                prefix: prefix.to_string(),
                text: String::new(),
                offset,
            });
            return Ok(tokens);
        }
        if rest.starts_with("/*") {
            return Err(JavaParseError::Unterminated {
                what: "block comment",
                offset,
            });
        }

        let (kind, len) = next_token(rest, offset)?;
        tokens.push(Token {
            kind,
            prefix: prefix.to_string(),
            text: rest[..len].to_string(),
            offset,
        });
        rest = &rest[len..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_trivia_becomes_prefix() {
        let tokens = tokenize("  // note\n  a /* b */ = 1;\n").unwrap();
        assert_eq!(tokens[0].prefix, "  // note\n  ");
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].prefix, " /* b */ ");
        assert_eq!(tokens.last().map(|t| t.prefix.as_str()), Some("\n"));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("1 2L 3.0 4f 0xFFL 1e10 .5 1_000");
        let found: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            found,
            vec![
                TokenKind::IntLiteral,
                TokenKind::LongLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral,
                TokenKind::LongLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_escapes() {
        let tokens = kinds(r#""a\"b" 'c' '\''"#);
        assert_eq!(tokens[0], (TokenKind::StringLiteral, r#""a\"b""#.to_string()));
        assert_eq!(tokens[1], (TokenKind::CharLiteral, "'c'".to_string()));
        assert_eq!(tokens[2], (TokenKind::CharLiteral, r"'\''".to_string()));
    }

    #[test]
    fn test_greater_than_is_never_combined() {
        let tokens = kinds("a >>= b >= c");
        let texts: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", ">", ">", "=", "b", ">", "=", "c", ""]);
    }

    #[test]
    fn test_unterminated() {
        assert!(matches!(
            tokenize("a = \"oops\n"),
            Err(JavaParseError::Unterminated {
                what: "string literal",
                ..
            })
        ));
        assert!(matches!(
            tokenize("/* never closed"),
            Err(JavaParseError::Unterminated {
                what: "block comment",
                ..
            })
        ));
    }
}
