//! Ground version of [`slash_syntax::Term`].

use std::cmp::Ordering;
use std::fmt;

use slash_syntax::*;

/// Ground (variable-free, arithmetic-free) element: a constant or a
/// symbolic function of ground terms.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GroundTerm {
    Constant(Constant),
    Function(Application<GroundTerm>),
}

impl GroundTerm {
    pub fn number(i: i64) -> Self {
        Self::Constant(Constant::Number(i))
    }

    pub fn name(s: &str) -> Self {
        Self::Constant(Constant::from(s))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Constant(Constant::Number(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.as_integer().is_some()
    }
}

impl From<Constant> for GroundTerm {
    fn from(c: Constant) -> Self {
        Self::Constant(c)
    }
}

impl From<i64> for GroundTerm {
    fn from(i: i64) -> Self {
        Self::number(i)
    }
}

impl From<&str> for GroundTerm {
    fn from(s: &str) -> Self {
        Self::name(s)
    }
}

/// Lift back into the non-ground term language.
impl From<GroundTerm> for Term {
    fn from(t: GroundTerm) -> Self {
        match t {
            GroundTerm::Constant(c) => Term::Constant(c),
            GroundTerm::Function(Application {
                predicate,
                arguments,
            }) => Term::Function(Application::new(
                predicate,
                arguments.into_iter().map(Term::from),
            )),
        }
    }
}

/// Numbers < strings < symbolic constants < functions; functions are
/// ordered by arity, then name, then arguments.
impl Ord for GroundTerm {
    fn cmp(&self, other: &Self) -> Ordering {
        use GroundTerm::*;
        match (self, other) {
            (Constant(a), Constant(b)) => a.cmp(b),
            (Constant(_), Function(_)) => Ordering::Less,
            (Function(_), Constant(_)) => Ordering::Greater,
            (Function(f), Function(g)) => f
                .arity()
                .cmp(&g.arity())
                .then_with(|| f.predicate.cmp(&g.predicate))
                .then_with(|| f.arguments.cmp(&g.arguments)),
        }
    }
}

impl PartialOrd for GroundTerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroundTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => c.fmt(f),
            Self::Function(app) => app.fmt(f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn f(args: impl IntoIterator<Item = GroundTerm>) -> GroundTerm {
        GroundTerm::Function(Application::new(Symbol::from("f"), args))
    }

    #[test]
    fn order() {
        let mut terms = vec![
            f([1.into(), 2.into()]),
            GroundTerm::Function(Application::new(Symbol::from("a"), [1.into(), 2.into()])),
            f([1.into()]),
            GroundTerm::name("b"),
            GroundTerm::Constant(Constant::String("s".into())),
            GroundTerm::number(10),
            GroundTerm::number(-3),
        ];
        terms.sort();
        assert_eq!(
            terms.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
            ["-3", "10", "\"s\"", "b", "f(1)", "a(1,2)", "f(1,2)"]
        );
    }

    #[test]
    fn lift() {
        assert_eq!(
            Term::from(f([GroundTerm::name("a")])),
            Term::Function(Application::new(Symbol::from("f"), [Term::from("a")]))
        );
    }
}
