//! Syntactic elements of an ASP-Core-2 style logic language
//! extended with neural-probabilistic predicate (NPP) declarations.
//!
//! See the "ASP-Core-2 Input Language Format" (2012). Every element
//! is generic over its term type, so the same structures describe both
//! the source program (over [`Term`]) and the ground program (over a
//! variable-free term type supplied by the grounder).

mod asp_core2;
mod lexer;
mod parser;
mod tokens;
mod visit;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use asp_core2::{AspCore2Lexer, AspCore2Parser, AspCore2Token};
pub use lexer::{Lex, Token};
pub use parser::Parse;
pub use tokens::Tokens;
pub use visit::*;

/// Uninterpreted element that names a constant, a predicate,
/// a function, or a variable.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uninterpreted element that represents itself. The variant order
/// is the term order: numbers precede strings precede symbolic constants.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Constant {
    Number(i64),
    String(String),
    Name(Symbol),
}

impl From<&str> for Constant {
    fn from(s: &str) -> Self {
        Self::Name(Symbol::from(s))
    }
}

impl From<Symbol> for Constant {
    fn from(s: Symbol) -> Self {
        Self::Name(s)
    }
}

impl From<i64> for Constant {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "\"{}\"", escape(s)),
            Self::Name(s) => s.fmt(f),
        }
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Arithmetic relational operators: equal, not equal, less than,
/// greater than, less than or equal to, greater than or equal to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Leq,
    Geq,
}

impl RelOp {
    pub fn eval<T>(&self, x: T, y: T) -> bool
    where
        T: Eq + Ord,
    {
        use RelOp::*;
        match self {
            Eq => x == y,
            Ne => x != y,
            Lt => x < y,
            Gt => x > y,
            Leq => x <= y,
            Geq => x >= y,
        }
    }

    /// The operator `op'` such that `x op y` iff `y op' x`.
    pub fn flip(self) -> Self {
        use RelOp::*;
        match self {
            Eq => Eq,
            Ne => Ne,
            Lt => Gt,
            Gt => Lt,
            Leq => Geq,
            Geq => Leq,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RelOp::*;
        f.write_str(match self {
            Eq => "=",
            Ne => "!=",
            Lt => "<",
            Gt => ">",
            Leq => "<=",
            Geq => ">=",
        })
    }
}

/// Binary (infix) integer arithmetic.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinOp::*;
        f.write_str(match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
        })
    }
}

/// Interpreted element that represents either itself (a constant or
/// a symbolic function), something else (a variable), or the result
/// of an arithmetic operation.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    Constant(Constant),
    Variable(Symbol),
    /// `_`: every occurrence is a distinct, never-bound variable.
    Anonymous,
    Function(Application<Term>),
    Neg(Box<Term>),
    BinaryOperation(Box<Term>, BinOp, Box<Term>),
}

impl Term {
    /// Boxing constructor.
    pub fn neg(x: Term) -> Self {
        Self::Neg(Box::new(x))
    }

    /// Boxing constructor.
    pub fn binary_operation(x: Term, op: BinOp, y: Term) -> Self {
        Self::BinaryOperation(Box::new(x), op, Box::new(y))
    }

    pub fn variable(name: &str) -> Self {
        Self::Variable(Symbol::from(name))
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Neg(_) | Self::BinaryOperation(..))
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Self::Constant(c)
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Self::Constant(Constant::Number(i))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Self::Constant(Constant::from(s))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Term::*;
        match self {
            Constant(c) => c.fmt(f),
            Variable(v) => v.fmt(f),
            Anonymous => f.write_str("_"),
            Function(app) => app.fmt(f),
            Neg(x) if x.is_arithmetic() => write!(f, "-({x})"),
            Neg(x) => write!(f, "-{x}"),
            BinaryOperation(x, op, y) => {
                let operand = |t: &Term| {
                    if let BinaryOperation(..) = t {
                        format!("({t})")
                    } else {
                        t.to_string()
                    }
                };
                write!(f, "{}{op}{}", operand(x), operand(y))
            }
        }
    }
}

/// Join displayable items with a separator.
pub(crate) fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// An _n_-ary predicate or function symbol applied to a tuple of terms.
/// If _n_ = 0, the arguments are elided.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Application<T> {
    pub predicate: Symbol,
    pub arguments: Vec<T>,
}

impl<T> Application<T> {
    pub fn new(predicate: Symbol, arguments: impl IntoIterator<Item = T>) -> Self {
        Self {
            predicate,
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl<T> fmt::Display for Application<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            self.predicate.fmt(f)
        } else {
            write!(f, "{}({})", self.predicate, join(&self.arguments, ","))
        }
    }
}

/// A _classical atom_: a predicate applied to terms, possibly under
/// classical (a.k.a. strong) negation, written `-p(..)`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Atom<T> {
    App(Application<T>),
    Strong(Application<T>),
}

impl<T> Atom<T> {
    pub fn app(predicate: Symbol, arguments: impl IntoIterator<Item = T>) -> Self {
        Self::App(Application::new(predicate, arguments))
    }

    pub fn strong(predicate: Symbol, arguments: impl IntoIterator<Item = T>) -> Self {
        Self::Strong(Application::new(predicate, arguments))
    }

    pub fn application(&self) -> &Application<T> {
        match self {
            Self::App(app) | Self::Strong(app) => app,
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, Self::Strong(_))
    }

    /// Rebuild an atom of the same sign with new arguments.
    pub fn with_arguments<U>(&self, arguments: Vec<U>) -> Atom<U> {
        let app = Application {
            predicate: self.application().predicate.clone(),
            arguments,
        };
        match self {
            Self::App(_) => Atom::App(app),
            Self::Strong(_) => Atom::Strong(app),
        }
    }

    pub fn signature(&self) -> Signature {
        Signature {
            name: self.application().predicate.clone(),
            arity: self.application().arity(),
            strong: self.is_strong(),
        }
    }
}

impl<T> fmt::Display for Atom<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(app) => app.fmt(f),
            Self::Strong(app) => write!(f, "-{app}"),
        }
    }
}

/// Predicate name, arity, and sign: the identity of a relation.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Signature {
    pub name: Symbol,
    pub arity: usize,
    pub strong: bool,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.strong { "-" } else { "" };
        write!(f, "{sign}{}/{}", self.name, self.arity)
    }
}

/// A comparison between a bound term and some value. On the left of
/// an aggregate or choice it reads `bound op value`; on the right,
/// `value op bound`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Guard<T> {
    pub op: RelOp,
    pub bound: T,
}

impl<T> Guard<T> {
    pub fn new(op: RelOp, bound: T) -> Self {
        Self { op, bound }
    }
}

/// Optional left and right guards of an aggregate or choice.
/// An absent guard is `None`, never a sentinel term.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregateBounds<T> {
    pub left: Option<Guard<T>>,
    pub right: Option<Guard<T>>,
}

impl<T> AggregateBounds<T> {
    pub fn new(left: Option<Guard<T>>, right: Option<Guard<T>>) -> Self {
        Self { left, right }
    }

    pub fn none() -> Self {
        Self::new(None, None)
    }

    /// `lower <= _ <= upper`.
    pub fn range(lower: T, upper: T) -> Self {
        Self::new(
            Some(Guard::new(RelOp::Leq, lower)),
            Some(Guard::new(RelOp::Leq, upper)),
        )
    }

    pub fn guards(&self) -> impl Iterator<Item = &Guard<T>> {
        self.left.iter().chain(self.right.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<T> Default for AggregateBounds<T> {
    fn default() -> Self {
        Self::none()
    }
}

/// Render `left {inner} right` for aggregates and choices.
fn fmt_bounded<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    bounds: &AggregateBounds<T>,
    inner: fmt::Arguments<'_>,
) -> fmt::Result {
    if let Some(Guard { op, bound }) = &bounds.left {
        write!(f, "{bound} {op} ")?;
    }
    f.write_fmt(inner)?;
    if let Some(Guard { op, bound }) = &bounds.right {
        write!(f, " {op} {bound}")?;
    }
    Ok(())
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AggregateFunction {
    Count,
    Sum,
    Max,
    Min,
}

impl AggregateFunction {
    /// Count and sum compare integers; max and min compare arbitrary terms.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Count | Self::Sum)
    }
}

/// The name after a `#` does not denote an aggregate function.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown aggregate function `#{0}`")]
pub struct UnknownAggregateFunction(pub Symbol);

impl FromStr for AggregateFunction {
    type Err = UnknownAggregateFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('#') {
            "count" => Ok(Self::Count),
            "sum" => Ok(Self::Sum),
            "max" => Ok(Self::Max),
            "min" => Ok(Self::Min),
            other => Err(UnknownAggregateFunction(Symbol::from(other))),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Count => "#count",
            Self::Sum => "#sum",
            Self::Max => "#max",
            Self::Min => "#min",
        })
    }
}

/// A tuple of terms, counted when its condition holds.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregateElement<T> {
    pub terms: Vec<T>,
    pub condition: Vec<Literal<T>>,
}

impl<T> AggregateElement<T> {
    pub fn new(
        terms: impl IntoIterator<Item = T>,
        condition: impl IntoIterator<Item = Literal<T>>,
    ) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            condition: condition.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for AggregateElement<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.terms, ","))?;
        if !self.condition.is_empty() {
            write!(f, ":{}", join(&self.condition, ","))?;
        }
        Ok(())
    }
}

/// An _aggregate atom_ applies a function to a set of element tuples
/// and compares the result against its guards.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Aggregate<T> {
    pub function: AggregateFunction,
    pub elements: Vec<AggregateElement<T>>,
    pub bounds: AggregateBounds<T>,
}

impl<T> Aggregate<T> {
    pub fn new(
        function: AggregateFunction,
        elements: impl IntoIterator<Item = AggregateElement<T>>,
        bounds: AggregateBounds<T>,
    ) -> Self {
        Self {
            function,
            elements: elements.into_iter().collect(),
            bounds,
        }
    }
}

impl<T> fmt::Display for Aggregate<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bounded(
            f,
            &self.bounds,
            format_args!("{}{{{}}}", self.function, join(&self.elements, ";")),
        )
    }
}

/// An atom that may be chosen when its condition holds.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChoiceElement<T> {
    pub atom: Atom<T>,
    pub condition: Vec<Literal<T>>,
}

impl<T> ChoiceElement<T> {
    pub fn new(atom: Atom<T>, condition: impl IntoIterator<Item = Literal<T>>) -> Self {
        Self {
            atom,
            condition: condition.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for ChoiceElement<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.atom.fmt(f)?;
        if !self.condition.is_empty() {
            write!(f, ":{}", join(&self.condition, ","))?;
        }
        Ok(())
    }
}

/// The head of a choice rule like `1 <= {a; b; c} <= 2` denotes all
/// ways of choosing which of the atoms are included in a model,
/// within the cardinality bounds.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Choice<T> {
    pub elements: Vec<ChoiceElement<T>>,
    pub bounds: AggregateBounds<T>,
}

impl<T> Choice<T> {
    pub fn new(
        elements: impl IntoIterator<Item = ChoiceElement<T>>,
        bounds: AggregateBounds<T>,
    ) -> Self {
        Self {
            elements: elements.into_iter().collect(),
            bounds,
        }
    }
}

impl<T> fmt::Display for Choice<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bounded(
            f,
            &self.bounds,
            format_args!("{{{}}}", join(&self.elements, ";")),
        )
    }
}

/// A neural-probabilistic predicate: `#npp(p(t1, ..., tn), [o1, ..., ok])`
/// stands for exactly one of the atoms `p(t1, ..., tn, oi)`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Npp<T> {
    pub predicate: Symbol,
    pub arguments: Vec<T>,
    pub outcomes: Vec<T>,
}

impl<T> Npp<T> {
    pub fn new(
        predicate: Symbol,
        arguments: impl IntoIterator<Item = T>,
        outcomes: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            predicate,
            arguments: arguments.into_iter().collect(),
            outcomes: outcomes.into_iter().collect(),
        }
    }

    /// The signature of the output atoms: inputs plus one outcome.
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.predicate.clone(),
            arity: self.arguments.len() + 1,
            strong: false,
        }
    }
}

impl<T> Npp<T>
where
    T: Clone,
{
    /// The atoms this declaration stands for, one per outcome.
    pub fn atoms(&self) -> Vec<Atom<T>> {
        self.outcomes
            .iter()
            .map(|outcome| {
                let mut arguments = self.arguments.clone();
                arguments.push(outcome.clone());
                Atom::app(self.predicate.clone(), arguments)
            })
            .collect()
    }
}

impl<T> fmt::Display for Npp<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input = Application {
            predicate: self.predicate.clone(),
            arguments: self.arguments.iter().collect::<Vec<_>>(),
        };
        write!(f, "#npp({input},[{}])", join(&self.outcomes, ","))
    }
}

/// Default (as-failure) polarity of a body element.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Polarity {
    Positive,
    Negative,
}

/// A classical atom or its default negation, a boolean arithmetic
/// relation (e.g., `1 < 2`), or an aggregate atom.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Literal<T> {
    Positive(Atom<T>),
    Negative(Atom<T>),
    Relation(Box<T>, RelOp, Box<T>),
    Aggregate(Polarity, Aggregate<T>),
}

impl<T> Literal<T> {
    /// Boxing constructor.
    pub fn relation(x: T, rel: RelOp, y: T) -> Self {
        Self::Relation(Box::new(x), rel, Box::new(y))
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(..))
    }

    /// The classical atom of a (default-negated or not) predicate literal.
    pub fn atom(&self) -> Option<&Atom<T>> {
        match self {
            Self::Positive(atom) | Self::Negative(atom) => Some(atom),
            Self::Relation(..) | Self::Aggregate(..) => None,
        }
    }
}

impl<T> fmt::Display for Literal<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Literal::*;
        match self {
            Positive(atom) => atom.fmt(f),
            Negative(atom) => write!(f, "not {atom}"),
            Relation(x, rel, y) => write!(f, "{x} {rel} {y}"),
            Aggregate(Polarity::Positive, agg) => agg.fmt(f),
            Aggregate(Polarity::Negative, agg) => write!(f, "not {agg}"),
        }
    }
}

fn fmt_rule(f: &mut fmt::Formatter<'_>, head: &str, body: &[impl fmt::Display]) -> fmt::Result {
    match (head.is_empty(), body.is_empty()) {
        (true, true) => f.write_str(":-."),
        (true, false) => write!(f, ":- {}.", join(body, ", ")),
        (false, true) => write!(f, "{head}."),
        (false, false) => write!(f, "{head} :- {}.", join(body, ", ")),
    }
}

/// Rules with a disjunctive head and a conjunctive body. An empty
/// head makes a constraint; an empty body, a fact (if the head is
/// a single atom).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rule<T> {
    pub head: Vec<Atom<T>>,
    pub body: Vec<Literal<T>>,
}

impl<T> Rule<T> {
    pub fn new(
        head: impl IntoIterator<Item = Atom<T>>,
        body: impl IntoIterator<Item = Literal<T>>,
    ) -> Self {
        Self {
            head: head.into_iter().collect(),
            body: body.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for Rule<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_rule(f, &join(&self.head, " | "), &self.body)
    }
}

/// A choice rule has a single choice construct as its head.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChoiceRule<T> {
    pub head: Choice<T>,
    pub body: Vec<Literal<T>>,
}

impl<T> ChoiceRule<T> {
    pub fn new(head: Choice<T>, body: impl IntoIterator<Item = Literal<T>>) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for ChoiceRule<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_rule(f, &self.head.to_string(), &self.body)
    }
}

/// An NPP rule declares its NPP for every instance of its body.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NppRule<T> {
    pub head: Npp<T>,
    pub body: Vec<Literal<T>>,
}

impl<T> NppRule<T> {
    pub fn new(head: Npp<T>, body: impl IntoIterator<Item = Literal<T>>) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for NppRule<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_rule(f, &self.head.to_string(), &self.body)
    }
}

/// Rules come in three flavors, distinguished by their heads.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BaseRule<T> {
    Choice(ChoiceRule<T>),
    Disjunctive(Rule<T>),
    Npp(NppRule<T>),
}

impl<T> BaseRule<T> {
    pub fn body(&self) -> &[Literal<T>] {
        match self {
            Self::Choice(ChoiceRule { body, .. })
            | Self::Disjunctive(Rule { body, .. })
            | Self::Npp(NppRule { body, .. }) => body,
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Disjunctive(Rule { head, .. }) if head.is_empty())
    }

    /// A single head atom and no body.
    pub fn is_fact(&self) -> bool {
        matches!(self, Self::Disjunctive(Rule { head, body }) if head.len() == 1 && body.is_empty())
    }
}

impl<T> fmt::Display for BaseRule<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choice(rule) => rule.fmt(f),
            Self::Disjunctive(rule) => rule.fmt(f),
            Self::Npp(rule) => rule.fmt(f),
        }
    }
}

/// A top-level element of a source program.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Statement<T> {
    Rule(BaseRule<T>),
    Query(Atom<T>),
}

impl<T> fmt::Display for Statement<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(rule) => rule.fmt(f),
            Self::Query(atom) => write!(f, "{atom}?"),
        }
    }
}

/// Things that may go wrong turning text into statements.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SyntaxError {
    #[error("lexing failed near `{0}`")]
    Lex(String),
    #[error("parsing failed near `{0}`")]
    Parse(String),
    #[error(transparent)]
    UnknownAggregateFunction(#[from] UnknownAggregateFunction),
}

/// Lex and parse a whole program.
pub fn parse_program(input: &str) -> Result<Vec<Statement<Term>>, SyntaxError> {
    let (rest, tokens) = AspCore2Lexer::lex(input).map_err(|e| SyntaxError::Lex(e.to_string()))?;
    if !rest.trim().is_empty() {
        return Err(SyntaxError::Lex(snippet(rest)));
    }
    if let Some(name) = asp_core2::unknown_directive(&tokens) {
        return Err(UnknownAggregateFunction(name).into());
    }
    match AspCore2Parser::parse(Tokens::new(&tokens)) {
        Ok((_, statements)) => Ok(statements),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(SyntaxError::Parse(
            e.input
                .first()
                .map(|t| snippet(t.source))
                .unwrap_or_default(),
        )),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::Parse(String::new())),
    }
}

fn snippet(s: &str) -> String {
    s.chars().take(24).collect()
}

/// These constructor macros can make tests involving syntactic elements
/// (most of them) much more readable. They are *not* intended as a public
/// interface, and *should* be behind `#[cfg(test)]`, but [cargo can't
/// currently export test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(any(test, feature = "macros"))]
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            $crate::Symbol::from(stringify!($name))
        };
    }

    #[macro_export]
    macro_rules! var {
        ($name: ident) => {
            $crate::Term::Variable($crate::sym!($name))
        };
    }

    #[macro_export]
    macro_rules! constant {
        ($c: literal) => {
            $crate::Term::Constant($c.into())
        };
        ($c: ident) => {
            $crate::Term::Constant($crate::Constant::Name($crate::sym!($c)))
        };
    }

    #[macro_export]
    macro_rules! func {
        ($name: ident($($arg: expr),* $(,)?)) => {
            $crate::Term::Function($crate::Application::new($crate::sym!($name), [$($arg.into()),*]))
        };
    }

    #[macro_export]
    macro_rules! atom {
        (- $pred: ident $(($($arg: expr),* $(,)?))?) => {
            $crate::Atom::strong($crate::sym!($pred), [$($($arg.into()),*)?])
        };
        ($pred: ident $(($($arg: expr),* $(,)?))?) => {
            $crate::Atom::app($crate::sym!($pred), [$($($arg.into()),*)?])
        };
    }

    #[macro_export]
    macro_rules! pos {
        ($($atom: tt)*) => {
            $crate::Literal::Positive($crate::atom!($($atom)*))
        };
    }

    #[macro_export]
    macro_rules! neg {
        ($($atom: tt)*) => {
            $crate::Literal::Negative($crate::atom!($($atom)*))
        };
    }

    #[macro_export]
    macro_rules! rel {
        ($l: expr, $op: ident, $r: expr) => {
            $crate::Literal::relation($l.into(), $crate::RelOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! binary {
        ($l: expr, $op: ident, $r: expr) => {
            $crate::Term::binary_operation($l.into(), $crate::BinOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! rule {
        ([$($head: expr),* $(,)?]) => {
            $crate::BaseRule::<$crate::Term>::Disjunctive($crate::Rule::new([$($head),*], []))
        };
        ([$($head: expr),* $(,)?], [$($body: expr),* $(,)?]) => {
            $crate::BaseRule::<$crate::Term>::Disjunctive($crate::Rule::new([$($head),*], [$($body),*]))
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn first_rule(input: &str) -> BaseRule<Term> {
        match parse_program(input).expect("parse failed").remove(0) {
            Statement::Rule(rule) => rule,
            Statement::Query(q) => panic!("unexpected query {q}"),
        }
    }

    #[test]
    fn display_terms() {
        let t = Term::binary_operation(
            Term::binary_operation(Term::variable("X"), BinOp::Add, 1.into()),
            BinOp::Mul,
            Term::neg(Term::variable("Y")),
        );
        assert_eq!(t.to_string(), "(X+1)*-Y");
        assert_eq!(Term::from(Constant::String("a\"b".into())).to_string(), r#""a\"b""#);
    }

    #[test]
    fn display_rules() {
        for source in [
            "p(a).",
            "p(X) | -q(X) :- r(X), not s(X), X != 2.",
            ":- p(X), q(X).",
            "1 <= {p(X):q(X);r} <= 2 :- s.",
            "#npp(digit(X),[0,1,2]) :- img(X).",
            "ok :- #sum{X,Y:p(X,Y);1:q} <= 0.",
            "ok :- not 1 < #count{X:p(X)}.",
        ] {
            assert_eq!(first_rule(source).to_string(), source);
        }
    }

    #[test]
    fn aggregate_function_names() {
        assert_eq!("#count".parse(), Ok(AggregateFunction::Count));
        assert_eq!("max".parse(), Ok(AggregateFunction::Max));
        assert_eq!(
            "#avg".parse::<AggregateFunction>(),
            Err(UnknownAggregateFunction(Symbol::from("avg")))
        );
    }

    #[test]
    fn npp_atoms() {
        let npp = Npp::new(Symbol::from("digit"), [Term::variable("X")], [0.into(), 1.into()]);
        assert_eq!(
            npp.atoms(),
            [
                Atom::app(Symbol::from("digit"), [Term::variable("X"), 0.into()]),
                Atom::app(Symbol::from("digit"), [Term::variable("X"), 1.into()]),
            ]
        );
        assert_eq!(npp.signature().to_string(), "digit/2");
    }
}
