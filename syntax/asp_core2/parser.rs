//! ASP-Core-2 parser.
//!
//! Terms are parsed with Pratt-style precedence climbing based on
//! Monkey's `parse_pratt_expr` and related routines.

use nom::{
    branch::alt,
    combinator::{eof, map, opt, success},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Err, IResult, Slice as _,
};

use crate::{
    parse_token, Aggregate, AggregateElement, AggregateFunction, Application, Atom, BaseRule,
    BinOp, Choice, ChoiceElement, ChoiceRule, Constant, Guard, Literal, Npp, NppRule, Parse,
    Polarity, RelOp, Rule, Statement, Symbol, Term, Token,
};

use super::lexer::AspCore2Token;

/// Local alias.
type Input<'a, S> = crate::parser::Input<'a, AspCore2Token, S>;

/// ASP-Core-2 parser.
pub struct AspCore2Parser;

impl<'a, S: Clone> Parse<'a, S> for AspCore2Parser {
    type Token = AspCore2Token;
    type Tree = Statement<Term>;

    /// Parse a stream of ASP-Core-2 tokens as a sequence of statements.
    fn parse(input: Input<'a, S>) -> IResult<Input<'a, S>, Vec<Self::Tree>> {
        terminated(many0(statement), eof)(input)
    }
}

/// Define a parser combinator that recognizes a single token.
macro_rules! parse_asp_core2_token {
    ($function: ident, $token: ident) => {
        parse_token!($function<AspCore2Token>, AspCore2Token::$token);
    };
}

parse_asp_core2_token!(dot, Dot);
parse_asp_core2_token!(comma, Comma);
parse_asp_core2_token!(query_mark, QueryMark);
parse_asp_core2_token!(colon, Colon);
parse_asp_core2_token!(semi, SemiColon);
parse_asp_core2_token!(or, Or);
parse_asp_core2_token!(naf, Naf);
parse_asp_core2_token!(cons, Cons);
parse_asp_core2_token!(plus, Plus);
parse_asp_core2_token!(minus, Minus);
parse_asp_core2_token!(times, Times);
parse_asp_core2_token!(over, Div);
parse_asp_core2_token!(lparen, ParenOpen);
parse_asp_core2_token!(rparen, ParenClose);
parse_asp_core2_token!(lbracket, SquareOpen);
parse_asp_core2_token!(rbracket, SquareClose);
parse_asp_core2_token!(lbrace, CurlyOpen);
parse_asp_core2_token!(rbrace, CurlyClose);
parse_asp_core2_token!(eq, Equal);
parse_asp_core2_token!(ne, Unequal);
parse_asp_core2_token!(lt, Less);
parse_asp_core2_token!(gt, Greater);
parse_asp_core2_token!(leq, LessOrEq);
parse_asp_core2_token!(geq, GreaterOrEq);
parse_asp_core2_token!(npp_directive, Npp);
parse_asp_core2_token!(anonymous, AnonymousVariable);

/// Take one token and map it through `f`, failing if `f` declines.
fn one<S: Clone, O>(
    input: Input<S>,
    f: impl Fn(&AspCore2Token) -> Option<O>,
) -> IResult<Input<S>, O> {
    match input.first().and_then(|t| f(&t.token)) {
        Some(o) => Ok((input.slice(1..), o)),
        None => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

fn constant<S: Clone>(input: Input<S>) -> IResult<Input<S>, Constant> {
    one(input, |t| match t {
        AspCore2Token::String(s) => Some(Constant::String(s.clone())),
        AspCore2Token::Number(i) => Some(Constant::Number(*i)),
        AspCore2Token::Id(s) => Some(Constant::Name(s.clone())),
        _ => None,
    })
}

fn identifier<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    one(input, |t| match t {
        AspCore2Token::Id(s) => Some(s.clone()),
        _ => None,
    })
}

fn variable<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    one(input, |t| match t {
        AspCore2Token::Variable(s) => Some(s.clone()),
        _ => None,
    })
}

fn aggregate_function<S: Clone>(input: Input<S>) -> IResult<Input<S>, AggregateFunction> {
    one(input, |t| match t {
        AspCore2Token::Aggregate(f) => Some(*f),
        _ => None,
    })
}

fn terms<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Term>> {
    separated_list0(comma, term)(input)
}

fn arguments<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Term>> {
    delimited(lparen, terms, rparen)(input)
}

/// A name, applied to arguments if any.
fn application<S: Clone>(input: Input<S>) -> IResult<Input<S>, Application<Term>> {
    map(pair(identifier, opt(arguments)), |(predicate, arguments)| {
        Application::new(predicate, arguments.unwrap_or_default())
    })(input)
}

fn function<S: Clone>(input: Input<S>) -> IResult<Input<S>, Application<Term>> {
    map(pair(identifier, arguments), |(predicate, arguments)| {
        Application::new(predicate, arguments)
    })(input)
}

/// Binding strength of the arithmetic operators.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Sum,
    Product,
}

fn bin_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, (Precedence, Option<BinOp>)> {
    alt((
        map(plus, |_| (Precedence::Sum, Some(BinOp::Add))),
        map(minus, |_| (Precedence::Sum, Some(BinOp::Sub))),
        map(times, |_| (Precedence::Product, Some(BinOp::Mul))),
        map(over, |_| (Precedence::Product, Some(BinOp::Div))),
        success((Precedence::Lowest, None)),
    ))(input)
}

fn infix<S: Clone>(input: Input<S>, left: Term) -> IResult<Input<S>, Term> {
    let (input, (precedence, bin_op)) = bin_op(input)?;
    match bin_op {
        Some(op) => {
            let (input, right) = pratt_left(input, precedence)?;
            Ok((input, Term::binary_operation(left, op, right)))
        }
        None => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
    }
}

/// All binary operators are left associative.
fn pratt_right<S: Clone>(
    input: Input<S>,
    precedence: Precedence,
    left: Term,
) -> IResult<Input<S>, Term> {
    let (_, (peek, _)) = bin_op(input.clone())?;
    if peek > precedence {
        let (input, left) = infix(input, left)?;
        pratt_right(input, precedence, left)
    } else {
        Ok((input, left))
    }
}

fn pratt_left<S: Clone>(input: Input<S>, precedence: Precedence) -> IResult<Input<S>, Term> {
    let (input, left) = base_term(input)?;
    pratt_right(input, precedence, left)
}

fn base_term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    alt((
        map(preceded(minus, base_term), Term::neg),
        delimited(lparen, term, rparen),
        map(function, Term::Function),
        map(constant, Term::Constant),
        map(variable, Term::Variable),
        map(anonymous, |_| Term::Anonymous),
    ))(input)
}

fn term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    pratt_left(input, Precedence::Lowest)
}

/// `p(..)` or `-p(..)`.
fn classical_atom<S: Clone>(input: Input<S>) -> IResult<Input<S>, Atom<Term>> {
    alt((
        map(preceded(minus, application), Atom::Strong),
        map(application, Atom::App),
    ))(input)
}

fn rel_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, RelOp> {
    alt((
        map(leq, |_| RelOp::Leq),
        map(geq, |_| RelOp::Geq),
        map(ne, |_| RelOp::Ne),
        map(lt, |_| RelOp::Lt),
        map(gt, |_| RelOp::Gt),
        map(eq, |_| RelOp::Eq),
    ))(input)
}

fn relation<S: Clone>(input: Input<S>) -> IResult<Input<S>, Literal<Term>> {
    map(tuple((term, rel_op, term)), |(l, op, r)| {
        Literal::relation(l, op, r)
    })(input)
}

/// Literals allowed in element conditions: no nested aggregates.
fn naf_literal<S: Clone>(input: Input<S>) -> IResult<Input<S>, Literal<Term>> {
    alt((
        map(preceded(naf, classical_atom), Literal::Negative),
        relation,
        map(classical_atom, Literal::Positive),
    ))(input)
}

fn condition<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Literal<Term>>> {
    map(opt(preceded(colon, separated_list0(comma, naf_literal))), |c| {
        c.unwrap_or_default()
    })(input)
}

fn left_guard<S: Clone>(input: Input<S>) -> IResult<Input<S>, Option<Guard<Term>>> {
    opt(map(pair(term, rel_op), |(bound, op)| Guard::new(op, bound)))(input)
}

fn right_guard<S: Clone>(input: Input<S>) -> IResult<Input<S>, Option<Guard<Term>>> {
    opt(map(pair(rel_op, term), |(op, bound)| Guard::new(op, bound)))(input)
}

fn aggregate_element<S: Clone>(input: Input<S>) -> IResult<Input<S>, AggregateElement<Term>> {
    map(
        pair(separated_list1(comma, term), condition),
        |(terms, condition)| AggregateElement::new(terms, condition),
    )(input)
}

fn aggregate<S: Clone>(input: Input<S>) -> IResult<Input<S>, Aggregate<Term>> {
    map(
        tuple((
            left_guard,
            aggregate_function,
            delimited(lbrace, separated_list0(semi, aggregate_element), rbrace),
            right_guard,
        )),
        |(left, function, elements, right)| {
            Aggregate::new(function, elements, crate::AggregateBounds::new(left, right))
        },
    )(input)
}

fn body_literal<S: Clone>(input: Input<S>) -> IResult<Input<S>, Literal<Term>> {
    alt((
        map(preceded(naf, aggregate), |a| {
            Literal::Aggregate(Polarity::Negative, a)
        }),
        map(aggregate, |a| Literal::Aggregate(Polarity::Positive, a)),
        naf_literal,
    ))(input)
}

fn body<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Literal<Term>>> {
    separated_list0(comma, body_literal)(input)
}

/// Everything after the head: an optional body and the final dot.
fn rest<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Literal<Term>>> {
    terminated(
        map(opt(preceded(cons, body)), |b| b.unwrap_or_default()),
        dot,
    )(input)
}

fn choice_element<S: Clone>(input: Input<S>) -> IResult<Input<S>, ChoiceElement<Term>> {
    map(pair(classical_atom, condition), |(atom, condition)| {
        ChoiceElement::new(atom, condition)
    })(input)
}

fn choice<S: Clone>(input: Input<S>) -> IResult<Input<S>, Choice<Term>> {
    map(
        tuple((
            left_guard,
            delimited(lbrace, separated_list0(semi, choice_element), rbrace),
            right_guard,
        )),
        |(left, elements, right)| Choice::new(elements, crate::AggregateBounds::new(left, right)),
    )(input)
}

/// `#npp(p(t1, ..., tn), [o1, ..., ok])`
fn npp<S: Clone>(input: Input<S>) -> IResult<Input<S>, Npp<Term>> {
    map(
        preceded(
            npp_directive,
            delimited(
                lparen,
                pair(
                    terminated(application, comma),
                    delimited(lbracket, terms, rbracket),
                ),
                rparen,
            ),
        ),
        |(app, outcomes)| Npp::new(app.predicate, app.arguments, outcomes),
    )(input)
}

fn rule<S: Clone>(input: Input<S>) -> IResult<Input<S>, BaseRule<Term>> {
    alt((
        map(pair(npp, rest), |(head, body)| {
            BaseRule::Npp(NppRule::new(head, body))
        }),
        map(pair(choice, rest), |(head, body)| {
            BaseRule::Choice(ChoiceRule::new(head, body))
        }),
        map(
            pair(separated_list1(or, classical_atom), rest),
            |(head, body)| BaseRule::Disjunctive(Rule::new(head, body)),
        ),
        map(rest, |body| BaseRule::Disjunctive(Rule::new([], body))),
    ))(input)
}

fn statement<S: Clone>(input: Input<S>) -> IResult<Input<S>, Statement<Term>> {
    alt((
        map(terminated(classical_atom, query_mark), Statement::Query),
        map(rule, Statement::Rule),
    ))(input)
}

/// The name of the first `#directive` that is neither an aggregate
/// function nor `#npp`, if any.
pub(crate) fn unknown_directive<S: Clone>(tokens: &[Token<AspCore2Token, S>]) -> Option<Symbol> {
    tokens.iter().find_map(|t| match &t.token {
        AspCore2Token::Directive(name) => Some(name.clone()),
        _ => None,
    })
}

#[cfg(test)]
mod test {
    use crate::*;

    use super::*;

    fn eof<'a>() -> Tokens<'a, Token<AspCore2Token, ()>> {
        Tokens::new(&[])
    }

    macro_rules! tok {
        ($t: literal) => {
            Token::new(AspCore2Token::from($t), ())
        };
        ($t: ident) => {
            Token::new(AspCore2Token::$t, ())
        };
        ([$s: ident]) => {
            Token::new(AspCore2Token::from(sym!($s)), ())
        };
        ({$t: expr}) => {
            Token::new($t, ())
        };
    }

    macro_rules! toks {
        [$($t: tt),* $(,)?] => {
            Tokens::new(&[$(tok!($t)),*])
        };
    }

    macro_rules! assert_parse {
        ($parsed: expr, $expected: expr) => {
            assert_eq!($parsed, Ok((eof(), $expected)));
        };
    }

    #[test]
    fn app() {
        assert_parse!(body_literal(toks![[p], ParenOpen, ParenClose]), pos!(p()));
        assert_parse!(body_literal(toks![[p]]), pos!(p));
        assert_parse!(body_literal(toks![Minus, [p], ParenOpen, 1, ParenClose]), pos!(-p(1)));
    }

    #[test]
    fn app_app() {
        assert_parse!(
            body_literal(toks![[p], ParenOpen, [q], ParenOpen, [a], ParenClose, ParenClose]),
            pos!(p(func!(q(constant!(a)))))
        );
    }

    #[test]
    fn naf() {
        assert_parse!(body_literal(toks![Naf, [p]]), neg!(p));
    }

    #[test]
    fn eq() {
        assert_parse!(body_literal(toks![0, Equal, 0]), rel!(0, Eq, 0));
        assert_parse!(body_literal(toks![[X], Unequal, [Y]]), rel!(var!(X), Ne, var!(Y)));
    }

    #[test]
    fn neg() {
        assert_parse!(term(toks![Minus, 1]), Term::neg(1.into()));
        assert_parse!(
            term(toks![Minus, ParenOpen, 1, Plus, 2, ParenClose]),
            Term::neg(binary!(1, Add, 2))
        );
    }

    #[test]
    fn add_add() {
        // left associative
        assert_parse!(
            term(toks![1, Plus, 2, Plus, 3]),
            binary!(binary!(1, Add, 2), Add, 3)
        );
        // override with parenthesis
        assert_parse!(
            term(toks![1, Plus, ParenOpen, 2, Plus, 3, ParenClose]),
            binary!(1, Add, binary!(2, Add, 3))
        );
    }

    #[test]
    fn add_sub() {
        assert_parse!(
            term(toks![1, Minus, 2, Plus, 3]),
            binary!(binary!(1, Sub, 2), Add, 3)
        );
        assert_parse!(
            term(toks![1, Plus, 2, Minus, 3]),
            binary!(binary!(1, Add, 2), Sub, 3)
        );
    }

    #[test]
    fn add_neg() {
        assert_parse!(
            term(toks![1, Plus, Minus, 2]),
            binary!(1, Add, Term::neg(2.into()))
        );
    }

    #[test]
    fn add_mul_add() {
        assert_parse!(
            term(toks![2, Plus, 3, Times, 4, Plus, 5]),
            binary!(binary!(2, Add, binary!(3, Mul, 4)), Add, 5)
        );
    }

    #[test]
    fn div_mul() {
        assert_parse!(
            term(toks![8, Div, 2, Times, 3]),
            binary!(binary!(8, Div, 2), Mul, 3)
        );
    }

    #[test]
    fn anonymous() {
        assert_parse!(
            body_literal(toks![[p], ParenOpen, AnonymousVariable, ParenClose]),
            pos!(p(Term::Anonymous))
        );
    }

    #[test]
    fn aggregate() {
        assert_parse!(
            body_literal(toks![
                {AspCore2Token::Aggregate(AggregateFunction::Sum)},
                CurlyOpen,
                CurlyClose,
                LessOrEq,
                0
            ]),
            Literal::Aggregate(
                Polarity::Positive,
                crate::Aggregate::new(
                    AggregateFunction::Sum,
                    [],
                    AggregateBounds::new(None, Some(Guard::new(RelOp::Leq, 0.into())))
                )
            )
        );
        assert_parse!(
            body_literal(toks![
                Naf,
                1,
                Less,
                {AspCore2Token::Aggregate(AggregateFunction::Count)},
                CurlyOpen,
                [X],
                Colon,
                [p],
                ParenOpen,
                [X],
                ParenClose,
                CurlyClose
            ]),
            Literal::Aggregate(
                Polarity::Negative,
                crate::Aggregate::new(
                    AggregateFunction::Count,
                    [AggregateElement::new([var!(X)], [pos!(p(var!(X)))])],
                    AggregateBounds::new(Some(Guard::new(RelOp::Lt, 1.into())), None)
                )
            )
        );
    }

    #[test]
    fn choice_rule() {
        assert_parse!(
            rule(toks![
                1, LessOrEq, CurlyOpen, [p], ParenOpen, [X], ParenClose, Colon, [q], ParenOpen,
                [X], ParenClose, CurlyClose, LessOrEq, 2, Dot
            ]),
            BaseRule::Choice(ChoiceRule::new(
                Choice::new(
                    [ChoiceElement::new(atom!(p(var!(X))), [pos!(q(var!(X)))])],
                    AggregateBounds::range(1.into(), 2.into())
                ),
                []
            ))
        );
    }

    #[test]
    fn npp_rule() {
        assert_parse!(
            rule(toks![
                Npp, ParenOpen, [digit], ParenOpen, [X], ParenClose, Comma, SquareOpen, 0, Comma,
                1, SquareClose, ParenClose, Cons, [img], ParenOpen, [X], ParenClose, Dot
            ]),
            BaseRule::Npp(NppRule::new(
                crate::Npp::new(sym!(digit), [var!(X)], [0.into(), 1.into()]),
                [pos!(img(var!(X)))]
            ))
        );
    }

    #[test]
    fn rules() {
        assert_parse!(rule(toks![[p], Dot]), rule!([atom!(p)]));
        assert_parse!(
            rule(toks![[p], Or, [q], Cons, [r], Comma, Naf, [s], Dot]),
            rule!([atom!(p), atom!(q)], [pos!(r), neg!(s)])
        );
        assert_parse!(rule(toks![Cons, [p], Dot]), rule!([], [pos!(p)]));
    }

    #[test]
    fn statements() {
        assert_parse!(
            AspCore2Parser::parse(toks![[p], ParenOpen, [X], ParenClose, QueryMark, [p], Dot]),
            vec![
                Statement::Query(atom!(p(var!(X)))),
                Statement::Rule(rule!([atom!(p)])),
            ]
        );
    }
}
