//! Replace terms that can contain variables with _ground_
//! (variable-free) terms.
//!
//! The entry point is [`ground`]: check every rule for safety, order
//! the predicates by dependency, instantiate each component to a
//! fixpoint, expand aggregates, choices, and NPP declarations, and
//! assemble the result into a [`GroundProgram`].

mod arithmetic;
mod atoms;
mod collectors;
mod domain;
mod elements;
mod groundable;
mod grounder;
mod iterative;
mod matcher;
mod program;
mod safety;
mod stratify;
mod substitution;
mod term;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use slash_syntax::*;
use slash_tracer::Trace;

// Re-exports.
pub use arithmetic::{reduce, ArithmeticFault};
pub use atoms::AtomTable;
pub use collectors::{ContainsVariable, IsGround, Variables};
pub use elements::contribution;
pub use groundable::Groundable;
pub use grounder::Grounder;
pub use iterative::IterativeGrounder;
pub use matcher::{Deferred, Matcher};
pub use program::{GroundProgram, Program, SourceProgram};
pub use safety::Safety;
pub use stratify::{Component, Stratification};
pub use substitution::{compose, Bindings, Substitute};
pub use term::GroundTerm;

/// A set of variable names.
pub type Names = BTreeSet<Symbol>;

/// Things that may go wrong during grounding. Any of them aborts the
/// whole run; variants that concern a rule carry its rendering.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GroundingError {
    #[error("unsafe variable `{variable}` in rule `{rule}`")]
    UnsafeVariable { variable: Symbol, rule: String },
    #[error("undefined arithmetic `{term}` ({reason}) in rule `{rule}`")]
    UndefinedArithmetic {
        term: String,
        reason: ArithmeticFault,
        rule: String,
    },
    #[error("bound `{bound}` of `{aggregate}` is not an integer in rule `{rule}`")]
    AggregateBoundType {
        bound: String,
        aggregate: String,
        rule: String,
    },
    #[error(transparent)]
    UnknownAggregateFunction(#[from] UnknownAggregateFunction),
    #[error("NPP predicate `{predicate}` has arity {expected}, but found arity {found} in rule `{rule}`")]
    NppArityMismatch {
        predicate: Symbol,
        expected: usize,
        found: usize,
        rule: String,
    },
    #[error("grounding did not terminate within {passes} passes ({elapsed:?})")]
    NonTermination { passes: usize, elapsed: Duration },
}

impl GroundingError {
    pub(crate) fn unsafe_variable(variable: Symbol) -> Self {
        Self::UnsafeVariable {
            variable,
            rule: String::new(),
        }
    }

    /// Fill in the offending rule, unless one is already recorded.
    pub(crate) fn with_rule(self, rule: &impl fmt::Display) -> Self {
        use GroundingError::*;
        match self {
            UnsafeVariable { variable, rule: r } if r.is_empty() => UnsafeVariable {
                variable,
                rule: rule.to_string(),
            },
            UndefinedArithmetic {
                term,
                reason,
                rule: r,
            } if r.is_empty() => UndefinedArithmetic {
                term,
                reason,
                rule: rule.to_string(),
            },
            AggregateBoundType {
                bound,
                aggregate,
                rule: r,
            } if r.is_empty() => AggregateBoundType {
                bound,
                aggregate,
                rule: rule.to_string(),
            },
            NppArityMismatch {
                predicate,
                expected,
                found,
                rule: r,
            } if r.is_empty() => NppArityMismatch {
                predicate,
                expected,
                found,
                rule: rule.to_string(),
            },
            e => e,
        }
    }
}

/// Knobs for one grounding run. The engine itself never reads the
/// environment; callers fill these in.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundingOptions {
    /// Total fixpoint passes allowed across all components.
    pub max_iterations: Option<usize>,
    /// Wall-clock budget for the whole run.
    pub time_limit: Option<Duration>,
    pub trace: Trace,
}

impl GroundingOptions {
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }
}

impl Default for GroundingOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            time_limit: None,
            trace: Trace::none(),
        }
    }
}

/// Ground a program with the default options.
pub fn ground(
    program: impl IntoIterator<Item = Statement<Term>>,
) -> Result<GroundProgram, GroundingError> {
    ground_with_options(program, GroundingOptions::default())
}

/// Ground a program under the given limits and trace levels.
pub fn ground_with_options(
    program: impl IntoIterator<Item = Statement<Term>>,
    options: GroundingOptions,
) -> Result<GroundProgram, GroundingError> {
    IterativeGrounder::new(Program::new(program), options).ground(&Bindings::new())
}

/// Test helper macros.
///
/// This should be behind `#[cfg(test)]`, but [cargo can't
/// currently export test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(any(test, feature = "macros"))]
mod macros {
    /// Ground an element or die trying.
    #[macro_export]
    macro_rules! ground {
        ($e: expr) => {
            $crate::Groundable::ground(&$e).expect("can't ground test element")
        };
    }
}
