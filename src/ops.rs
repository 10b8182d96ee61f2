use std::convert::Infallible;

use num::Float;

/// Operator combining the propositions of one antecedent group in a fuzzy
/// rule premise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Combinator {
    /// Fuzzy AND, the minimum of the degrees
    AllOf,
    /// Fuzzy OR, the maximum of the degrees
    AnyOf,
}

impl Combinator {
    /// The neutral element of the operator: one for `min`, zero for `max`.
    pub fn identity<F: Float>(self) -> F {
        match self {
            Self::AllOf => F::one(),
            Self::AnyOf => F::zero(),
        }
    }

    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::AllOf => F::min(u, v),
            Self::AnyOf => F::max(u, v),
        }
    }

    pub fn fold<F: Float>(self, degrees: impl IntoIterator<Item = F>) -> F {
        match self.try_fold(degrees.into_iter().map(Ok::<F, Infallible>)) {
            Ok(degree) => degree,
            Err(never) => match never {},
        }
    }

    /// [`Combinator::fold`] over fallible degrees, stopping at the first error.
    pub fn try_fold<F: Float, E>(self, degrees: impl IntoIterator<Item = Result<F, E>>) -> Result<F, E> {
        degrees
            .into_iter()
            .try_fold(self.identity(), |acc, degree| Ok(self.call(acc, degree?)))
    }
}

/// Fuzzy NOT
pub fn complement<F: Float>(degree: F) -> F {
    F::one() - degree
}

#[test]
fn test_combinators() {
    let degrees = [0.2, 0.8, 0.5];

    assert_eq!(Combinator::AllOf.fold(degrees), 0.2);
    assert_eq!(Combinator::AnyOf.fold(degrees), 0.8);
    assert_eq!(Combinator::AllOf.fold(std::iter::empty::<f64>()), 1.);
    assert_eq!(Combinator::AnyOf.fold(std::iter::empty::<f64>()), 0.);
}

#[test]
fn test_try_fold() {
    let degrees: [Result<f64, &str>; 3] = [Ok(0.4), Ok(0.9), Ok(0.6)];

    assert_eq!(Combinator::AllOf.try_fold(degrees), Ok(0.4));
    assert_eq!(Combinator::AnyOf.try_fold(degrees), Ok(0.9));

    let mut visited = 0;
    let failing = [Ok(0.4), Err("unknown"), Ok(0.6)].into_iter().inspect(|_| visited += 1);

    assert_eq!(Combinator::AnyOf.try_fold(failing), Err("unknown"));
    assert_eq!(visited, 2);
}

#[test]
fn test_complement() {
    assert_eq!(complement(0.3), 0.7);
    assert_eq!(complement(1.0f32), 0.);
}
