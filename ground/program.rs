//! Programs before and after grounding.

use std::fmt;
use std::ops::Index;

use slash_syntax::*;

use crate::{AtomTable, GroundTerm};

/// A collection of rules (or statements), in source order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program<R>(Vec<R>);

impl<R> Program<R> {
    pub fn new(rules: impl IntoIterator<Item = R>) -> Self {
        Self(rules.into_iter().collect())
    }

    pub fn as_slice(&self) -> &[R] {
        self.0.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<R> Index<usize> for Program<R> {
    type Output = R;

    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl<R> IntoIterator for Program<R> {
    type Item = R;
    type IntoIter = <Vec<R> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Program<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<R> fmt::Display for Program<R>
where
    R: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in self.iter() {
            r.fmt(f)?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// A parsed program: rules and queries, as written.
pub type SourceProgram = Program<Statement<Term>>;

impl SourceProgram {
    pub fn rules(&self) -> impl Iterator<Item = &BaseRule<Term>> {
        self.iter().filter_map(|s| match s {
            Statement::Rule(rule) => Some(rule),
            Statement::Query(_) => None,
        })
    }

    /// The program's query. If there are several, the last one wins.
    pub fn query(&self) -> Option<&Atom<Term>> {
        self.iter()
            .filter_map(|s| match s {
                Statement::Query(atom) => Some(atom),
                Statement::Rule(_) => None,
            })
            .last()
    }
}

/// The result of grounding: variable-free statements, deduplicated and
/// grouped by the source rule they came from, together with the atoms
/// that grounding found to be possibly and certainly true.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroundProgram {
    statements: Program<BaseRule<GroundTerm>>,
    possible: AtomTable,
    certain: AtomTable,
    query: Option<Atom<Term>>,
    answers: Vec<Atom<GroundTerm>>,
    stratified: bool,
}

impl GroundProgram {
    pub(crate) fn new(
        statements: Vec<BaseRule<GroundTerm>>,
        possible: AtomTable,
        certain: AtomTable,
        query: Option<Atom<Term>>,
        answers: Vec<Atom<GroundTerm>>,
        stratified: bool,
    ) -> Self {
        Self {
            statements: Program::new(statements),
            possible,
            certain,
            query,
            answers,
            stratified,
        }
    }

    pub fn statements(&self) -> &Program<BaseRule<GroundTerm>> {
        &self.statements
    }

    /// Every atom in the head of some statement.
    pub fn possible(&self) -> &AtomTable {
        &self.possible
    }

    /// Atoms true in every answer set, as far as grounding can tell.
    pub fn certain(&self) -> &AtomTable {
        &self.certain
    }

    pub fn query(&self) -> Option<&Atom<Term>> {
        self.query.as_ref()
    }

    /// The possible atoms matching the query, in ground-term order.
    pub fn answers(&self) -> &[Atom<GroundTerm>] {
        &self.answers
    }

    /// False if some cycle goes through default negation. Instances
    /// negating an atom of such a cycle are kept, so the program may
    /// then contain instances no answer set uses.
    pub fn is_stratified(&self) -> bool {
        self.stratified
    }

    pub fn iter(&self) -> impl Iterator<Item = &BaseRule<GroundTerm>> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl<'a> IntoIterator for &'a GroundProgram {
    type Item = &'a BaseRule<GroundTerm>;
    type IntoIter = std::slice::Iter<'a, BaseRule<GroundTerm>>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.as_slice().iter()
    }
}

/// One statement per line.
impl fmt::Display for GroundProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.statements.fmt(f)
    }
}
