//! Turn a token stream into statements.

use nom::IResult;

use crate::{Token, Tokens};

/// Lexical tokens of type `T` with source text of type `S`.
pub type Input<'a, T, S> = Tokens<'a, Token<T, S>>;

/// A dialect's parser.
pub trait Parse<'a, S: Clone> {
    type Token: Clone;
    type Tree;

    /// Consume the whole stream.
    fn parse(
        input: Input<'a, Self::Token, S>,
    ) -> IResult<Input<'a, Self::Token, S>, Vec<Self::Tree>>;
}

/// Define `fn $function` that accepts exactly one token equal to `$tag`.
#[macro_export]
macro_rules! parse_token {
    ($function:ident<$ty: ty>, $tag: expr) => {
        fn $function<S: Clone>(
            input: $crate::Tokens<$crate::Token<$ty, S>>,
        ) -> ::nom::IResult<$crate::Tokens<$crate::Token<$ty, S>>, $crate::Tokens<$crate::Token<$ty, S>>>
        {
            ::nom::combinator::verify(
                ::nom::bytes::complete::take(1_usize),
                |t: &$crate::Tokens<$crate::Token<$ty, S>>| {
                    t.first().map_or(false, |t| t.token == $tag)
                },
            )(input)
        }
    };
}
