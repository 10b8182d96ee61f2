use std::ops::Not;

use num::Float;

use crate::error::Result;
use crate::ops::{complement, Combinator};
use crate::terms::Term;
use crate::variable::{Variable, VariableKey, Variables};

#[cfg(test)]
use crate::membership::MembershipShape;

/// One proposition of a rule, "`variable` is `term`", optionally negated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VariableRef {
    pub(crate) key: VariableKey,
    pub(crate) index: usize,
    pub(crate) negated: bool,
}

impl VariableRef {
    pub fn key(&self) -> VariableKey {
        self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The degree this proposition contributes, complemented when negated.
    pub fn degree<F: Float>(&self, vars: &Variables<F>) -> Result<F> {
        let set = vars.by_key(self.key)?;

        set.check_index(self.index)?;

        let degree = set.degrees()[self.index];

        Ok(if self.negated { complement(degree) } else { degree })
    }
}

impl Not for VariableRef {
    type Output = Self;

    fn not(self) -> Self {
        Self {
            negated: !self.negated,
            ..self
        }
    }
}

impl<I: Term> Variable<I> {
    pub fn is(self, term: I) -> VariableRef {
        VariableRef {
            key: self.0,
            index: term.index(),
            negated: false,
        }
    }

    pub fn is_not(self, term: I) -> VariableRef {
        !self.is(term)
    }
}

/// A group of propositions joined by one combinator. A rule holds the
/// conjunction of all its groups.
#[derive(Clone, Debug, PartialEq)]
pub struct Antecedent {
    pub(crate) combinator: Combinator,
    pub(crate) refs: Vec<VariableRef>,
}

impl Antecedent {
    pub fn new(combinator: Combinator, refs: impl IntoIterator<Item = VariableRef>) -> Self {
        Self {
            combinator,
            refs: refs.into_iter().collect(),
        }
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn refs(&self) -> &[VariableRef] {
        &self.refs
    }

    pub fn degree<F: Float>(&self, vars: &Variables<F>) -> Result<F> {
        self.combinator.try_fold(self.refs.iter().map(|var_ref| var_ref.degree(vars)))
    }
}

impl From<VariableRef> for Antecedent {
    fn from(var_ref: VariableRef) -> Self {
        all_of([var_ref])
    }
}

pub fn all_of(refs: impl IntoIterator<Item = VariableRef>) -> Antecedent {
    Antecedent::new(Combinator::AllOf, refs)
}

pub fn any_of(refs: impl IntoIterator<Item = VariableRef>) -> Antecedent {
    Antecedent::new(Combinator::AnyOf, refs)
}

#[cfg(test)]
fn vars_with_degrees(degrees: &[f64]) -> (Variables, Variable) {
    let mut vars = Variables::new();
    let shapes = degrees.iter().map(|_| MembershipShape::rectangular(0., 1.));
    let var = vars.add(shapes).unwrap();

    for (i, degree) in degrees.iter().enumerate() {
        vars.get_mut(var).unwrap().set_degree(i, *degree).unwrap();
    }

    (vars, var)
}

#[test]
fn test_group_degrees() {
    let (vars, var) = vars_with_degrees(&[0.2, 0.8, 0.5]);
    let refs = [var.is(0), var.is(1), var.is(2)];

    assert_eq!(all_of(refs).degree(&vars), Ok(0.2));
    assert_eq!(any_of(refs).degree(&vars), Ok(0.8));
}

#[test]
fn test_negation() {
    let (vars, var) = vars_with_degrees(&[0.3]);

    assert_eq!(var.is_not(0).degree(&vars), Ok(0.7));
    assert_eq!((!var.is(0)).degree(&vars), Ok(0.7));
    assert_eq!((!var.is_not(0)).degree(&vars), Ok(0.3));
    assert!(var.is_not(0).is_negated());
}

#[test]
fn test_single_ref_is_all_of() {
    let (_, var) = vars_with_degrees(&[0.3]);
    let group = Antecedent::from(var.is(0));

    assert_eq!(group.combinator(), Combinator::AllOf);
    assert_eq!(group.refs(), &[var.is(0)]);
}
