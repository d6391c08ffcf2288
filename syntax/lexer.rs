//! Scanners shared by every dialect's lexer, and the token type they produce.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while},
    character::complete::{char, multispace1, none_of, satisfy},
    combinator::{map_res, opt, recognize, value},
    error::ParseError,
    multi::{fold_many0, many0_count},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use crate::Symbol;

/// A lexical token, and the source text from where it starts onwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T, S> {
    pub token: T,
    pub source: S,
}

impl<T, S> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// Split source text into tokens.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}

/// Wrap what `parser` recognizes in a [`Token`] that remembers where it began.
pub(crate) fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let (rest, t) = parser.parse(input.clone())?;
        Ok((rest, Token::new(t, input)))
    }
}

/// Whitespace, `% line` comments, and `%* block *%` comments.
pub(crate) fn space(input: &str) -> IResult<&str, &str> {
    let block = delimited(tag("%*"), take_until("*%"), tag("*%"));
    let line = pair(char('%'), opt(is_not("\r\n")));
    recognize(many0_count(alt((
        multispace1,
        recognize(block),
        recognize(line),
    ))))(input)
}

fn word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A letter or underscore, then letters, digits, and underscores.
pub(crate) fn symbol(input: &str) -> IResult<&str, Symbol> {
    let (rest, name) = recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(word_char),
    ))(input)?;
    Ok((rest, Symbol::from(name)))
}

fn escape(input: &str) -> IResult<&str, char> {
    preceded(
        char('\\'),
        alt((
            value('\\', char('\\')),
            value('"', char('"')),
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
        )),
    )(input)
}

/// A double-quoted string with backslash escapes.
pub(crate) fn string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(alt((none_of("\\\""), escape)), String::new, |mut s, c| {
            s.push(c);
            s
        }),
        char('"'),
    )(input)
}

/// Digits in `radix`, optionally separated by underscores.
fn digits(radix: u32) -> impl FnMut(&str) -> IResult<&str, i64> {
    move |input| {
        map_res(
            recognize(pair(
                satisfy(move |c| c.is_digit(radix)),
                take_while(move |c: char| c.is_digit(radix) || c == '_'),
            )),
            move |digits: &str| i64::from_str_radix(&digits.replace('_', ""), radix),
        )(input)
    }
}

/// Decimal, or hexadecimal after `0x`.
pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    alt((
        preceded(alt((tag("0x"), tag("0X"))), digits(16)),
        digits(10),
    ))(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn space() {
        assert_eq!(super::space(""), Ok(("", "")));
        assert_eq!(super::space("  \n p."), Ok(("p.", "  \n ")));
        assert_eq!(
            super::space("% fact\n%* multi\nline *% p."),
            Ok(("p.", "% fact\n%* multi\nline *% "))
        );
        assert_eq!(super::space("%"), Ok(("", "%")));
        assert_eq!(super::space("%* open"), Ok(("", "%* open")), "unterminated block");
    }

    #[test]
    fn symbol() {
        assert!(super::symbol("").is_err());
        assert!(super::symbol("9lives").is_err());
        assert_eq!(super::symbol("_x1 y"), Ok((" y", Symbol::from("_x1"))));
        assert_eq!(super::symbol("digit(i1)"), Ok(("(i1)", Symbol::from("digit"))));
    }

    #[test]
    fn string() {
        assert!(super::string("").is_err());
        assert!(super::string("\"open").is_err(), "unterminated");
        assert_eq!(super::string("\"\""), Ok(("", String::new())));
        assert_eq!(super::string("\"a b\"."), Ok((".", String::from("a b"))));
        assert_eq!(
            super::string(r#""say \"hi\"\n\t\\""#),
            Ok(("", String::from("say \"hi\"\n\t\\")))
        );
        assert_eq!(super::string("\"λ→∀\""), Ok(("", String::from("λ→∀"))));
        assert!(super::string(r#""\q""#).is_err(), "unknown escape");
    }

    #[test]
    fn integer() {
        assert!(super::integer("").is_err());
        assert!(super::integer("_1").is_err());
        assert!(super::integer("99_999_999_999_999_999_999").is_err(), "overflow");
        assert_eq!(super::integer("0"), Ok(("", 0)));
        assert_eq!(super::integer("1_000)"), Ok((")", 1000)));
        assert_eq!(super::integer("0x1F"), Ok(("", 31)));
        assert_eq!(super::integer("0Xff_ff"), Ok(("", 0xffff)));
    }
}
