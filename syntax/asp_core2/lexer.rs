//! ASP-Core-2 tokens and tokenizer.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, InputLength,
};

use crate::lexer::{integer, space, string, symbol, token, Lex, Token};
use crate::{AggregateFunction, Symbol};

/// Lexical element of an ASP-Core-2 program.
/// See ASP-Core-2 §5, the lexical matching table.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum AspCore2Token {
    Id(Symbol),
    Variable(Symbol),
    String(String),
    Number(i64),
    AnonymousVariable,
    Dot,
    Comma,
    QueryMark,
    Colon,
    SemiColon,
    Or,
    Naf,
    Cons,
    Plus,
    Minus,
    Times,
    Div,
    ParenOpen,
    ParenClose,
    SquareOpen,
    SquareClose,
    CurlyOpen,
    CurlyClose,
    Equal,
    Unequal,
    Less,
    Greater,
    LessOrEq,
    GreaterOrEq,
    Aggregate(AggregateFunction),
    Npp,
    /// Any other `#name`; never valid, but lexed so the parser
    /// can say what went wrong.
    Directive(Symbol),
}

impl InputLength for AspCore2Token {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

impl From<Symbol> for AspCore2Token {
    /// Classify a lexed name by its initial.
    fn from(s: Symbol) -> Self {
        match s.name() {
            "_" => Self::AnonymousVariable,
            "not" => Self::Naf,
            name if name.starts_with(|c: char| c.is_ascii_uppercase() || c == '_') => {
                Self::Variable(s)
            }
            _ => Self::Id(s),
        }
    }
}

impl From<i64> for AspCore2Token {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

/// Punctuation and operators. A tag precedes any of its prefixes.
fn punctuation(input: &str) -> IResult<&str, AspCore2Token> {
    use AspCore2Token::*;
    alt((
        alt((
            value(Cons, tag(":-")),
            value(Colon, tag(":")),
            value(Dot, tag(".")),
            value(Comma, tag(",")),
            value(QueryMark, tag("?")),
            value(SemiColon, tag(";")),
            value(Or, tag("|")),
        )),
        alt((
            value(Plus, tag("+")),
            value(Minus, tag("-")),
            value(Times, tag("*")),
            value(Div, tag("/")),
        )),
        alt((
            value(ParenOpen, tag("(")),
            value(ParenClose, tag(")")),
            value(SquareOpen, tag("[")),
            value(SquareClose, tag("]")),
            value(CurlyOpen, tag("{")),
            value(CurlyClose, tag("}")),
        )),
        alt((
            value(Unequal, tag("<>")),
            value(Unequal, tag("!=")),
            value(LessOrEq, tag("<=")),
            value(GreaterOrEq, tag(">=")),
            value(Equal, tag("=")),
            value(Less, tag("<")),
            value(Greater, tag(">")),
        )),
    ))(input)
}

/// `#count`, `#sum`, `#min`, `#max`, `#npp`, or some unknown directive.
fn directive(input: &str) -> IResult<&str, AspCore2Token> {
    map(preceded(char('#'), symbol), |s| {
        match s.name() {
            "npp" => AspCore2Token::Npp,
            name => match name.parse::<AggregateFunction>() {
                Ok(f) => AspCore2Token::Aggregate(f),
                Err(_) => AspCore2Token::Directive(s),
            },
        }
    })(input)
}

/// ASP-Core-2 lexer.
pub struct AspCore2Lexer;

impl<'a> Lex<'a, &str> for AspCore2Lexer {
    type Input = &'a str;
    type Token = Token<AspCore2Token, &'a str>;

    /// Tokenize a string representation of an ASP-Core-2 program.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        let name = map(symbol, AspCore2Token::from);
        let string = map(string, AspCore2Token::String);
        let number = map(integer, AspCore2Token::Number);
        many0(delimited(
            space,
            token(alt((name, string, number, directive, punctuation))),
            space,
        ))(input)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn asp_core2_lexer() {
        use AspCore2Token::*;

        assert_eq!(AspCore2Lexer::lex(""), Ok(("", vec![])), "nothing");
        assert_eq!(AspCore2Lexer::lex(" "), Ok((" ", vec![])), "whitespace");
        assert_eq!(
            AspCore2Lexer::lex("abc"),
            Ok(("", vec![Token::new(Id("abc".into()), "abc")])),
            "one token"
        );
        assert_eq!(
            AspCore2Lexer::lex("1 {abc} 2 :- do, re, mi."),
            Ok((
                "",
                vec![
                    Token::new(Number(1), "1 {abc} 2 :- do, re, mi."),
                    Token::new(CurlyOpen, "{abc} 2 :- do, re, mi."),
                    Token::new(Id("abc".into()), "abc} 2 :- do, re, mi."),
                    Token::new(CurlyClose, "} 2 :- do, re, mi."),
                    Token::new(Number(2), "2 :- do, re, mi."),
                    Token::new(Cons, ":- do, re, mi."),
                    Token::new(Id("do".into()), "do, re, mi."),
                    Token::new(Comma, ", re, mi."),
                    Token::new(Id("re".into()), "re, mi."),
                    Token::new(Comma, ", mi."),
                    Token::new(Id("mi".into()), "mi."),
                    Token::new(Dot, "."),
                ]
            )),
            "some tokens"
        );
    }

    #[test]
    fn names() {
        use AspCore2Token::*;

        let kinds = |input| {
            AspCore2Lexer::lex(input)
                .map(|(_, tokens)| tokens.into_iter().map(|t| t.token).collect::<Vec<_>>())
        };
        assert_eq!(
            kinds("p(X, _, _Y) :- not q."),
            Ok(vec![
                Id("p".into()),
                ParenOpen,
                Variable("X".into()),
                Comma,
                AnonymousVariable,
                Comma,
                Variable("_Y".into()),
                ParenClose,
                Cons,
                Naf,
                Id("q".into()),
                Dot,
            ])
        );
        assert_eq!(
            kinds("#sum{} <= 0 %* ignored *% % also ignored"),
            Ok(vec![
                Aggregate(AggregateFunction::Sum),
                CurlyOpen,
                CurlyClose,
                LessOrEq,
                Number(0),
            ])
        );
        assert_eq!(
            kinds("#npp #avg <> !="),
            Ok(vec![Npp, Directive("avg".into()), Unequal, Unequal])
        );
    }
}
