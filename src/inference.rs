use std::collections::{HashMap, HashSet};

use num::Float;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::rules::Rules;
use crate::variable::{VariableKey, Variables};

#[cfg(test)]
use pretty_assertions::assert_eq;
#[cfg(test)]
use crate::dsl::{all_of, any_of};
#[cfg(test)]
use crate::membership::MembershipShape;
#[cfg(test)]
use crate::terms::Term;
#[cfg(test)]
use crate::variable::Variable;

/// What happens to output sets once every rule has been aggregated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Leave the max-aggregated degrees as they are
    None,
    /// Scale every output set so its degrees sum to one
    #[default]
    SumToOne,
}

/// Mamdani inference with min/max connectives and max aggregation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MamdaniInference {
    #[serde(default)]
    normalization: Normalization,
}

impl MamdaniInference {
    pub fn new(normalization: Normalization) -> Self {
        Self { normalization }
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Evaluate every rule against the current input degrees and write the
    /// aggregated firing strengths into the consequence sets.
    ///
    /// Each consequence slot is reset once before any rule is aggregated, so
    /// degrees never leak from a previous cycle and several rules may share a
    /// slot, the strongest one winning.
    pub fn infer<F: Float>(&self, vars: &mut Variables<F>, rules: &Rules) -> Result<()> {
        reset_consequences(vars, rules)?;

        let strengths = rules
            .iter()
            .map(|rule| rule.strength(vars))
            .collect::<Result<Vec<F>>>()?;

        self.aggregate(vars, rules, &strengths)
    }

    /// [`MamdaniInference::infer`] with the rule strengths computed in parallel.
    #[cfg(feature = "rayon")]
    pub fn infer_par<F: Float + Send + Sync>(&self, vars: &mut Variables<F>, rules: &Rules) -> Result<()> {
        use rayon::prelude::*;

        reset_consequences(vars, rules)?;

        let strengths = {
            let vars = &*vars;

            rules
                .0
                .par_iter()
                .map(|rule| rule.strength(vars))
                .collect::<Result<Vec<F>>>()?
        };

        self.aggregate(vars, rules, &strengths)
    }

    /// Classify `inputs`, infer, and defuzzificate every consequence variable.
    pub fn eval<F: Float>(&self, vars: &mut Variables<F>, rules: &Rules, inputs: &Inputs<F>) -> Result<Outputs<F>> {
        // Nothing is classified unless every input and rule resolves
        for key in inputs.0.keys() {
            vars.by_key(*key)?;
        }
        check_rules(vars, rules)?;

        for (key, input_value) in &inputs.0 {
            vars.by_key_mut(*key)?.classify(*input_value);
        }

        self.infer(vars, rules)?;

        let mut defuzzificated = HashMap::new();

        for key in consequence_keys(rules) {
            defuzzificated.insert(key, vars.by_key(key)?.defuzzify());
        }

        Ok(Outputs::new(defuzzificated))
    }

    fn aggregate<F: Float>(&self, vars: &mut Variables<F>, rules: &Rules, strengths: &[F]) -> Result<()> {
        for (i, (rule, strength)) in rules.iter().zip(strengths).enumerate() {
            let consequence = rule.consequence;

            trace!(rule = i, term = consequence.index, strength = ?strength.to_f64(), "rule fired");

            vars.by_key_mut(consequence.key)?
                .aggregate(consequence.index, *strength);
        }

        if self.normalization == Normalization::SumToOne {
            for key in consequence_keys(rules) {
                vars.by_key_mut(key)?.normalize();
            }
        }

        debug!(rules = rules.len(), normalization = ?self.normalization, "inferred");

        Ok(())
    }
}

/// Every proposition of every rule must still resolve against `vars`.
fn check_rules<F: Float>(vars: &Variables<F>, rules: &Rules) -> Result<()> {
    if rules.is_empty() {
        return Err(Error::NoRules);
    }

    rules.iter().try_for_each(|rule| rule.validate(vars))
}

/// Zero every slot some rule writes to. Checked up front so a rule set that
/// doesn't match `vars` is rejected before any degree is touched.
fn reset_consequences<F: Float>(vars: &mut Variables<F>, rules: &Rules) -> Result<()> {
    check_rules(vars, rules)?;

    for rule in rules {
        let consequence = rule.consequence;

        vars.by_key_mut(consequence.key)?.reset(consequence.index);
    }

    Ok(())
}

fn consequence_keys(rules: &Rules) -> HashSet<VariableKey> {
    rules.iter().map(|rule| rule.consequence.key).collect()
}

#[cfg(test)]
#[derive(Clone, Copy, Debug)]
enum Level {
    Low,
    Medium,
    High,
}

#[cfg(test)]
impl Term for Level {
    fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
struct System {
    vars: Variables,
    input: Variable<Level>,
    output: Variable<Level>,
}

#[cfg(test)]
fn system() -> System {
    let mut vars = Variables::new();
    let input = vars
        .add([
            MembershipShape::trapezoidal(0., 0., 15., 40.),
            MembershipShape::trapezoidal(15., 40., 60., 80.),
            MembershipShape::trapezoidal(60., 80., 100., 100.),
        ])
        .unwrap();
    let output = vars
        .add([
            MembershipShape::trapezoidal(0., 0., 30., 50.),
            MembershipShape::triangular(30., 50., 70.),
            MembershipShape::trapezoidal(50., 70., 100., 100.),
        ])
        .unwrap();

    System { vars, input, output }
}

#[cfg(test)]
fn set_input(sys: &mut System, degrees: [f64; 3]) {
    let set = sys.vars.get_mut(sys.input).unwrap();

    for (i, degree) in degrees.into_iter().enumerate() {
        set.set_degree(i, degree).unwrap();
    }
}

#[test]
fn test_low_input_drives_output_high() {
    let mut sys = system();
    let mut rules = Rules::new();

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();
    rules
        .add(&sys.vars, [sys.input.is_not(Level::Low)], sys.output.is(Level::Low))
        .unwrap();
    set_input(&mut sys, [1., 0., 0.]);

    MamdaniInference::new(Normalization::None)
        .infer(&mut sys.vars, &rules)
        .unwrap();

    assert_eq!(sys.vars[sys.output].degrees(), &[0., 0., 1.]);
    assert_eq!(sys.vars.defuzzify(sys.output), Ok(80.));
}

#[test]
fn test_max_aggregation_is_order_independent() {
    let mut sys = system();

    // Medium = 0.4, High = 0.7
    set_input(&mut sys, [0., 0.4, 0.7]);

    let orders = [[Level::Medium, Level::High], [Level::High, Level::Medium]];

    for order in orders {
        let mut rules = Rules::new();

        for term in order {
            rules
                .add(&sys.vars, [sys.input.is(term)], sys.output.is(Level::Medium))
                .unwrap();
        }

        MamdaniInference::new(Normalization::None)
            .infer(&mut sys.vars, &rules)
            .unwrap();

        assert_eq!(sys.vars.degree(sys.output, Level::Medium), Some(0.7));
    }
}

#[test]
fn test_stale_degrees_do_not_leak() {
    let mut sys = system();
    let mut rules = Rules::new();
    let engine = MamdaniInference::new(Normalization::None);

    rules
        .add(&sys.vars, [sys.input.is(Level::High)], sys.output.is(Level::High))
        .unwrap();
    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();

    set_input(&mut sys, [0., 0., 0.9]);
    engine.infer(&mut sys.vars, &rules).unwrap();

    assert_eq!(sys.vars.degree(sys.output, Level::High), Some(0.9));

    // The second rule fires into the slot the first one aggregated into
    // and must not wipe it, while the 0.9 of the last cycle is gone
    set_input(&mut sys, [0.2, 0., 0.3]);
    engine.infer(&mut sys.vars, &rules).unwrap();

    assert_eq!(sys.vars.degree(sys.output, Level::High), Some(0.3));
}

#[test]
fn test_normalization_keeps_crisp_output() {
    let mut rules = Rules::new();
    let mut sys = system();

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();
    rules
        .add(&sys.vars, [sys.input.is(Level::Medium)], sys.output.is(Level::Medium))
        .unwrap();
    rules
        .add(
            &sys.vars,
            [any_of([sys.input.is(Level::Medium), sys.input.is(Level::High)])],
            sys.output.is(Level::Low),
        )
        .unwrap();
    set_input(&mut sys, [0.5, 0.5, 0.]);

    MamdaniInference::new(Normalization::None)
        .infer(&mut sys.vars, &rules)
        .unwrap();

    let raw = sys.vars.defuzzify(sys.output).unwrap();

    MamdaniInference::new(Normalization::SumToOne)
        .infer(&mut sys.vars, &rules)
        .unwrap();

    let normalized = sys.vars.defuzzify(sys.output).unwrap();

    assert_eq!(sys.vars[sys.output].degrees(), &[1. / 3., 1. / 3., 1. / 3.]);
    assert!((raw - normalized).abs() < 1e-12);
    assert!((raw - 50.).abs() < 1e-12);
}

#[test]
fn test_normalization_of_silent_rules() {
    let mut sys = system();
    let mut rules = Rules::new();

    rules
        .add(&sys.vars, [all_of([sys.input.is(Level::High)])], sys.output.is(Level::High))
        .unwrap();

    MamdaniInference::default().infer(&mut sys.vars, &rules).unwrap();

    assert_eq!(sys.vars[sys.output].degrees(), &[0., 0., 0.]);
    assert_eq!(sys.vars.defuzzify(sys.output), Ok(0.));
}

#[test]
fn test_invalid_rule_sets() {
    let mut sys = system();
    let mut rules = Rules::new();
    let engine = MamdaniInference::default();

    assert_eq!(engine.infer(&mut sys.vars, &rules), Err(Error::NoRules));

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();
    sys.vars.remove(sys.output);

    assert_eq!(engine.infer(&mut sys.vars, &rules), Err(Error::UnknownVariable));
}

#[test]
fn test_failed_inference_keeps_previous_degrees() {
    let mut sys = system();
    let mut rules = Rules::new();
    let engine = MamdaniInference::new(Normalization::None);
    let other: Variable<Level> = sys.vars.add([MembershipShape::rectangular(0., 10.)]).unwrap();

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::Medium))
        .unwrap();
    set_input(&mut sys, [1., 0., 0.]);
    engine.infer(&mut sys.vars, &rules).unwrap();

    assert_eq!(sys.vars[sys.output].degrees(), &[0., 1., 0.]);

    rules
        .add(&sys.vars, [other.is(Level::Low)], sys.output.is(Level::Low))
        .unwrap();
    sys.vars.remove(other);

    assert_eq!(engine.infer(&mut sys.vars, &rules), Err(Error::UnknownVariable));
    assert_eq!(sys.vars[sys.output].degrees(), &[0., 1., 0.]);
}

#[test]
fn test_failed_eval_keeps_input_degrees() {
    let mut sys = system();
    let mut rules = Rules::new();
    let mut inputs = Inputs::new();
    let engine = MamdaniInference::default();
    let other: Variable<Level> = sys.vars.add([MembershipShape::rectangular(0., 10.)]).unwrap();

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();
    set_input(&mut sys, [0., 0., 1.]);
    inputs.add(sys.input, 0.);
    inputs.add(other, 5.);
    sys.vars.remove(other);

    assert_eq!(engine.eval(&mut sys.vars, &rules, &inputs).err(), Some(Error::UnknownVariable));
    assert_eq!(sys.vars[sys.input].degrees(), &[0., 0., 1.]);

    // Valid inputs are not classified either when a rule no longer resolves
    let mut inputs = Inputs::new();
    let spare: Variable<Level> = sys.vars.add([MembershipShape::rectangular(0., 10.)]).unwrap();

    inputs.add(sys.input, 0.);
    rules
        .add(&sys.vars, [spare.is(Level::Low)], sys.output.is(Level::Low))
        .unwrap();
    sys.vars.remove(spare);

    assert_eq!(engine.eval(&mut sys.vars, &rules, &inputs).err(), Some(Error::UnknownVariable));
    assert_eq!(sys.vars[sys.input].degrees(), &[0., 0., 1.]);
}

#[test]
fn test_eval() {
    let mut sys = system();
    let mut rules = Rules::new();
    let mut inputs = Inputs::new();

    rules
        .add(&sys.vars, [sys.input.is(Level::Low)], sys.output.is(Level::High))
        .unwrap();
    rules
        .add(&sys.vars, [!sys.input.is(Level::Low)], sys.output.is(Level::Low))
        .unwrap();
    inputs.add(sys.input, 0.);

    let outputs = MamdaniInference::default()
        .eval(&mut sys.vars, &rules, &inputs)
        .unwrap();

    assert_eq!(outputs.get(sys.output), Some(80.));
    assert_eq!(outputs.get(sys.input), None);
    assert_eq!(outputs.len(), 1);

    inputs.add(sys.input, 100.);

    let outputs = MamdaniInference::default()
        .eval(&mut sys.vars, &rules, &inputs)
        .unwrap();

    assert_eq!(outputs.get(sys.output), Some(20.));
}

#[test]
fn test_config_from_json() {
    let engine: MamdaniInference = serde_json::from_str(r#"{"normalization": "none"}"#).unwrap();

    assert_eq!(engine.normalization(), Normalization::None);

    let engine: MamdaniInference = serde_json::from_str("{}").unwrap();

    assert_eq!(engine, MamdaniInference::default());
    assert_eq!(engine.normalization(), Normalization::SumToOne);
}

#[cfg(feature = "rayon")]
#[test]
fn test_parallel_matches_sequential() {
    let mut sys = system();
    let mut rules = Rules::new();

    for term in [Level::Low, Level::Medium, Level::High] {
        rules
            .add(&sys.vars, [sys.input.is(term)], sys.output.is(Level::Medium))
            .unwrap();
        rules
            .add(&sys.vars, [!sys.input.is(term)], sys.output.is(term))
            .unwrap();
    }
    set_input(&mut sys, [0.1, 0.6, 0.3]);

    let engine = MamdaniInference::new(Normalization::None);

    engine.infer(&mut sys.vars, &rules).unwrap();

    let sequential = sys.vars[sys.output].degrees().to_vec();

    engine.infer_par(&mut sys.vars, &rules).unwrap();

    assert_eq!(sys.vars[sys.output].degrees(), &sequential[..]);
}
