use num::Float;

use crate::dsl::{Antecedent, VariableRef};
use crate::error::{Error, Result};
use crate::ops::Combinator;
use crate::variable::Variables;

#[cfg(test)]
use crate::dsl::{all_of, any_of};
#[cfg(test)]
use crate::membership::MembershipShape;
#[cfg(test)]
use crate::variable::Variable;

/// An immutable, validated list of rules.
#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    /// Register "if every antecedent group holds then `consequence`".
    ///
    /// Every proposition is checked against the sets in `vars`, so a rule
    /// naming an unknown variable or a term beyond its set is rejected here
    /// rather than during inference.
    pub fn add<F: Float, A: Into<Antecedent>>(
        &mut self,
        vars: &Variables<F>,
        premise: impl IntoIterator<Item = A>,
        consequence: VariableRef,
    ) -> Result<()> {
        let rule = Rule::new(premise, consequence)?;

        rule.validate(vars)?;
        self.0.push(rule);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }
}

impl<'r> IntoIterator for &'r Rules {
    type IntoIter = std::slice::Iter<'r, Rule>;
    type Item = &'r Rule;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) premise: Vec<Antecedent>,
    pub(crate) consequence: VariableRef,
}

impl Rule {
    fn new<A: Into<Antecedent>>(premise: impl IntoIterator<Item = A>, consequence: VariableRef) -> Result<Self> {
        let premise: Vec<Antecedent> = premise.into_iter().map(Into::into).collect();

        if premise.is_empty() {
            return Err(Error::NoAntecedents);
        }
        if premise.iter().any(|group| group.refs.is_empty()) {
            return Err(Error::EmptyAntecedent);
        }
        if consequence.negated {
            return Err(Error::NegatedConsequent);
        }

        Ok(Self { premise, consequence })
    }

    pub(crate) fn validate<F: Float>(&self, vars: &Variables<F>) -> Result<()> {
        let props = self.premise.iter().flat_map(|group| group.refs.iter());

        for var_ref in props.chain(Some(&self.consequence)) {
            vars.by_key(var_ref.key)?.check_index(var_ref.index)?;
        }

        Ok(())
    }

    pub fn premise(&self) -> &[Antecedent] {
        &self.premise
    }

    pub fn consequence(&self) -> VariableRef {
        self.consequence
    }

    /// Firing strength: the `min` over all antecedent groups.
    pub fn strength<F: Float>(&self, vars: &Variables<F>) -> Result<F> {
        Combinator::AllOf.try_fold(self.premise.iter().map(|group| group.degree(vars)))
    }
}

#[cfg(test)]
fn setup() -> (Variables, Variable, Variable) {
    let mut vars = Variables::new();
    let shapes = [
        MembershipShape::triangular(0., 0., 50.),
        MembershipShape::triangular(0., 50., 100.),
        MembershipShape::triangular(50., 100., 100.),
    ];
    let input = vars.add(shapes).unwrap();
    let output = vars.add(shapes).unwrap();

    (vars, input, output)
}

#[test]
fn test_rule_validation() {
    let (vars, input, output) = setup();
    let mut rules = Rules::new();

    assert_eq!(rules.add(&vars, [input.is(0)], output.is(2)), Ok(()));
    assert_eq!(
        rules.add(&vars, [input.is(3)], output.is(0)),
        Err(Error::IndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        rules.add(&vars, [input.is(0)], output.is(7)),
        Err(Error::IndexOutOfRange { index: 7, len: 3 })
    );
    assert_eq!(
        rules.add(&vars, [input.is(0)], output.is_not(0)),
        Err(Error::NegatedConsequent)
    );
    assert_eq!(
        rules.add(&vars, std::iter::empty::<Antecedent>(), output.is(0)),
        Err(Error::NoAntecedents)
    );
    assert_eq!(
        rules.add(&vars, [all_of([input.is(0)]), any_of([])], output.is(0)),
        Err(Error::EmptyAntecedent)
    );
    assert_eq!(rules.len(), 1);
}

#[test]
fn test_rule_on_removed_variable_is_rejected() {
    let (mut vars, input, output) = setup();
    let mut rules = Rules::new();

    vars.remove(input);

    assert_eq!(
        rules.add(&vars, [input.is(0)], output.is(0)),
        Err(Error::UnknownVariable)
    );
    assert!(rules.is_empty());
}

#[test]
fn test_strength_is_min_of_groups() {
    let (mut vars, input, output) = setup();
    let mut rules = Rules::new();

    // Low = 0.5, Medium = 0.5, High = 0
    vars.classify(input, 25.).unwrap();
    rules
        .add(
            &vars,
            [any_of([input.is(0), input.is(2)]), all_of([!input.is(2)])],
            output.is(1),
        )
        .unwrap();
    rules
        .add(&vars, [all_of([input.is(1), input.is(2)])], output.is(1))
        .unwrap();

    let strengths: Vec<f64> = rules.iter().map(|rule| rule.strength(&vars).unwrap()).collect();

    assert_eq!(strengths, vec![0.5, 0.]);
}
