//! Integer arithmetic over terms.
//!
//! Ground expressions are evaluated eagerly with checked `i64`
//! arithmetic; expressions that still contain variables are left
//! as they are, to be reduced once a substitution completes them.

use std::fmt;

use thiserror::Error;

use slash_syntax::*;

use crate::{GroundTerm, GroundingError, IsGround as _};

/// Why an arithmetic expression has no value.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ArithmeticFault {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("non-integer operand")]
    NonInteger,
}

fn undefined(term: &impl fmt::Display, reason: ArithmeticFault) -> GroundingError {
    GroundingError::UndefinedArithmetic {
        term: term.to_string(),
        reason,
        rule: String::new(),
    }
}

/// Evaluate `-x`.
pub(crate) fn negate(x: &GroundTerm) -> Result<GroundTerm, GroundingError> {
    let expr = || Term::neg(Term::from(x.clone()));
    let i = x
        .as_integer()
        .ok_or_else(|| undefined(&expr(), ArithmeticFault::NonInteger))?;
    i.checked_neg()
        .map(GroundTerm::number)
        .ok_or_else(|| undefined(&expr(), ArithmeticFault::Overflow))
}

/// Evaluate `x op y`. Division rounds toward negative infinity.
pub(crate) fn apply(
    x: &GroundTerm,
    op: BinOp,
    y: &GroundTerm,
) -> Result<GroundTerm, GroundingError> {
    let expr = || Term::binary_operation(Term::from(x.clone()), op, Term::from(y.clone()));
    let (Some(i), Some(j)) = (x.as_integer(), y.as_integer()) else {
        return Err(undefined(&expr(), ArithmeticFault::NonInteger));
    };
    let value = match op {
        BinOp::Add => i.checked_add(j),
        BinOp::Sub => i.checked_sub(j),
        BinOp::Mul => i.checked_mul(j),
        BinOp::Div if j == 0 => return Err(undefined(&expr(), ArithmeticFault::DivisionByZero)),
        BinOp::Div => floor_div(i, j),
    };
    value
        .map(GroundTerm::number)
        .ok_or_else(|| undefined(&expr(), ArithmeticFault::Overflow))
}

fn floor_div(i: i64, j: i64) -> Option<i64> {
    let q = i.checked_div(j)?;
    if (i % j != 0) && ((i < 0) != (j < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Reduce every ground arithmetic subterm of `term` to a number.
/// Subterms with variables are returned unchanged, so reduction
/// is idempotent. Function terms are structural and only have
/// their arguments reduced.
pub fn reduce(term: &Term) -> Result<Term, GroundingError> {
    use Term::*;
    match term {
        Constant(_) | Variable(_) | Anonymous => Ok(term.clone()),
        Function(app) => Ok(Function(Application::new(
            app.predicate.clone(),
            app.arguments.iter().map(reduce).collect::<Result<Vec<_>, _>>()?,
        ))),
        Neg(x) => {
            let x = reduce(x)?;
            match ground_value(&x) {
                Some(value) => negate(&value).map(Term::from),
                None => Ok(Term::neg(x)),
            }
        }
        BinaryOperation(x, op, y) => {
            let (x, y) = (reduce(x)?, reduce(y)?);
            match (ground_value(&x), ground_value(&y)) {
                (Some(a), Some(b)) => apply(&a, *op, &b).map(Term::from),
                _ => Ok(Term::binary_operation(x, *op, y)),
            }
        }
    }
}

/// The value of a reduced, variable-free term.
fn ground_value(term: &Term) -> Option<GroundTerm> {
    match term {
        Term::Constant(c) => Some(GroundTerm::Constant(c.clone())),
        Term::Function(app) if term.is_ground() => Some(GroundTerm::Function(Application::new(
            app.predicate.clone(),
            app.arguments
                .iter()
                .map(ground_value)
                .collect::<Option<Vec<_>>>()?,
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn fault(term: Term) -> Option<ArithmeticFault> {
        match reduce(&term) {
            Err(GroundingError::UndefinedArithmetic { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn reduce_ground() {
        assert_eq!(reduce(&binary!(2, Add, binary!(3, Mul, 4))), Ok(Term::from(14)));
        assert_eq!(reduce(&Term::neg(binary!(1, Sub, 3))), Ok(Term::from(2)));
        assert_eq!(
            reduce(&func!(f(binary!(1, Add, 1), constant!(a)))),
            Ok(func!(f(2, constant!(a))))
        );
    }

    #[test]
    fn reduce_partial() {
        let t = binary!(var!(X), Add, binary!(1, Add, 2));
        assert_eq!(reduce(&t), Ok(binary!(var!(X), Add, 3)));
    }

    #[test]
    fn floor_division() {
        assert_eq!(reduce(&binary!(7, Div, 2)), Ok(Term::from(3)));
        assert_eq!(reduce(&binary!(-7, Div, 2)), Ok(Term::from(-4)));
        assert_eq!(reduce(&binary!(7, Div, -2)), Ok(Term::from(-4)));
        assert_eq!(reduce(&binary!(-8, Div, 2)), Ok(Term::from(-4)));
    }

    #[test]
    fn undefined() {
        assert_eq!(fault(binary!(1, Div, 0)), Some(ArithmeticFault::DivisionByZero));
        assert_eq!(fault(binary!(i64::MAX, Add, 1)), Some(ArithmeticFault::Overflow));
        assert_eq!(fault(Term::neg(i64::MIN.into())), Some(ArithmeticFault::Overflow));
        assert_eq!(fault(binary!(constant!(a), Mul, 2)), Some(ArithmeticFault::NonInteger));
        assert_eq!(fault(binary!(var!(X), Div, 0)), None);
    }

    fn arith() -> impl Strategy<Value = Term> {
        let leaf = prop_oneof![
            (-20i64..20).prop_map(Term::from),
            Just(Term::variable("X")),
            Just(Term::from("a")),
        ];
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(Term::neg),
                (inner.clone(), inner.clone()).prop_map(|(x, y)| binary!(x, Add, y)),
                (inner.clone(), inner.clone()).prop_map(|(x, y)| binary!(x, Mul, y)),
                (inner.clone(), inner).prop_map(|(x, y)| binary!(x, Div, y)),
            ]
        })
    }

    proptest! {
        #[test]
        fn reduce_is_idempotent(t in arith()) {
            if let Ok(once) = reduce(&t) {
                prop_assert_eq!(reduce(&once), Ok(once.clone()));
            }
        }
    }
}
