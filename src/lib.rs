//! Mamdani fuzzy inference for control loops.
//!
//! Crisp measurements are fuzzificated into the degrees of a [`FuzzySet`],
//! [`Rules`] combine those degrees with fuzzy AND / OR / NOT and
//! max-aggregate them into output sets, and each output set is defuzzificated
//! back into a crisp value with the centroid of its terms.
//!
//! ```
//! use fuzzy_control::{MamdaniInference, MembershipShape, Normalization, Rules, Variable, Variables};
//!
//! # fn main() -> Result<(), fuzzy_control::Error> {
//! let mut vars: Variables = Variables::new();
//! let input: Variable = vars.add([
//!     MembershipShape::trapezoidal(0., 0., 15., 40.),
//!     MembershipShape::trapezoidal(15., 40., 60., 80.),
//!     MembershipShape::trapezoidal(60., 80., 100., 100.),
//! ])?;
//! let output: Variable = vars.add([
//!     MembershipShape::trapezoidal(0., 0., 30., 50.),
//!     MembershipShape::triangular(30., 50., 70.),
//!     MembershipShape::trapezoidal(50., 70., 100., 100.),
//! ])?;
//!
//! let (low, high) = (0, 2);
//! let mut rules = Rules::new();
//!
//! rules.add(&vars, [input.is(low)], output.is(high))?;
//! rules.add(&vars, [input.is_not(low)], output.is(low))?;
//!
//! vars.classify(input, 0.)?;
//! MamdaniInference::new(Normalization::None).infer(&mut vars, &rules)?;
//!
//! assert_eq!(vars.defuzzify(output)?, 80.);
//! # Ok(())
//! # }
//! ```

mod defuzz;
mod dsl;
mod error;
mod inference;
mod inputs;
mod math;
mod membership;
mod ops;
mod outputs;
mod rules;
mod terms;
mod variable;

pub use dsl::{all_of, any_of, Antecedent, VariableRef};
pub use error::{Error, Result};
pub use inference::{MamdaniInference, Normalization};
pub use inputs::Inputs;
pub use membership::{MembershipShape, ShapeKind};
pub use ops::{complement, Combinator};
pub use outputs::Outputs;
pub use rules::{Rule, Rules};
pub use terms::Term;
pub use variable::{FuzzySet, Variable, VariableKey, Variables};

#[test]
fn test_tec_fan_control() {
    #[derive(Clone, Copy, Debug)]
    enum Level {
        Low,
        Medium,
        High,
    }

    #[derive(Clone, Copy, Debug)]
    enum Change {
        Decreasing,
        Stable,
        Increasing,
    }

    #[derive(Clone, Copy, Debug)]
    enum FanState {
        Off,
        On,
    }

    #[derive(Clone, Copy, Debug)]
    enum FanSpeed {
        Off,
        Slow,
        Medium,
        Fast,
    }

    macro_rules! impl_term {
        ($($ty:ty),*) => {
            $(impl Term for $ty {
                fn index(self) -> usize {
                    self as usize
                }
            })*
        };
    }

    impl_term!(Level, Change, FanState, FanSpeed);

    let mut vars: Variables = Variables::new();
    // degrees celsius
    let temperature: Variable<Level> = vars
        .add([
            (-20., -20., 18., 25., ShapeKind::Trapezoidal),
            (18., 23., 35., 0., ShapeKind::Triangular),
            (23., 35., 100., 100., ShapeKind::Trapezoidal),
        ])
        .unwrap();
    // degrees celsius per second
    let temp_change: Variable<Change> = vars
        .add([
            (-20., -20., -2., 0., ShapeKind::Trapezoidal),
            (-2., 0., 2., 0., ShapeKind::Triangular),
            (0., 2., 20., 20., ShapeKind::Trapezoidal),
        ])
        .unwrap();
    // watts
    let tec_power: Variable<Level> = vars
        .add([
            (-5., -5., 3., 15., ShapeKind::Trapezoidal),
            (3., 10., 25., 25., ShapeKind::Triangular),
            (15., 25., 100., 100., ShapeKind::Trapezoidal),
        ])
        .unwrap();
    // PWM duty cycle percent
    let fan_state: Variable<FanState> = vars
        .add([MembershipShape::rectangular(0., 20.), MembershipShape::rectangular(20., 101.)])
        .unwrap();
    let fan_speed: Variable<FanSpeed> = vars
        .add([
            MembershipShape::rectangular(-20., 20.),
            MembershipShape::trapezoidal(20., 20., 40., 60.),
            MembershipShape::trapezoidal(30., 60., 60., 65.),
            MembershipShape::trapezoidal(60., 65., 100., 100.),
        ])
        .unwrap();

    let cooling_down = || any_of([temp_change.is(Change::Stable), temp_change.is(Change::Decreasing)]);
    let mut rules = Rules::with_capacity(8);

    rules
        .add(
            &vars,
            [
                all_of([fan_state.is(FanState::Off)]),
                any_of([
                    temperature.is(Level::Medium),
                    temperature.is(Level::High),
                    tec_power.is(Level::High),
                ]),
            ],
            fan_speed.is(FanSpeed::Fast),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [
                all_of([fan_state.is(FanState::Off), temperature.is(Level::Low)]),
                cooling_down(),
            ],
            fan_speed.is(FanSpeed::Off),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [all_of([fan_state.is(FanState::On), tec_power.is(Level::Low)]), cooling_down()],
            fan_speed.is(FanSpeed::Off),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [all_of([
                fan_state.is(FanState::On),
                temperature.is(Level::Medium),
                tec_power.is_not(Level::High),
            ])],
            fan_speed.is(FanSpeed::Medium),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [
                all_of([fan_state.is(FanState::On), temperature.is(Level::High)]),
                any_of([tec_power.is(Level::Medium), tec_power.is(Level::Low)]),
            ],
            fan_speed.is(FanSpeed::Fast),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [all_of([
                fan_state.is(FanState::On),
                tec_power.is(Level::Low),
                temperature.is(Level::Low),
            ])],
            fan_speed.is(FanSpeed::Off),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [all_of([fan_state.is(FanState::On), tec_power.is(Level::Medium)])],
            fan_speed.is(FanSpeed::Medium),
        )
        .unwrap();
    rules
        .add(
            &vars,
            [all_of([fan_state.is(FanState::On), tec_power.is(Level::High)])],
            fan_speed.is(FanSpeed::Fast),
        )
        .unwrap();

    let model = MamdaniInference::new(Normalization::SumToOne);
    let mut eval = |temp: f64, change: f64, power: f64, fan: f64| {
        let mut inputs = Inputs::new();

        inputs.add(temperature, temp);
        inputs.add(temp_change, change);
        inputs.add(tec_power, power);
        inputs.add(fan_state, fan);

        model.eval(&mut vars, &rules, &inputs).unwrap().get(fan_speed).unwrap()
    };

    // Hot, heavily loaded and the fan is off: full speed
    assert_eq!(eval(40., 3., 30., 0.), 81.25);
    // Cold and idle: the fan stays off
    assert_eq!(eval(15., -1., 2., 10.), 0.);

    let speed = eval(30., 1., 12., 50.);

    assert!((speed - 55.281862745098046).abs() < 1e-9, "{speed}");
    assert_eq!(vars.degree(fan_speed, FanSpeed::Slow), Some(0.));
}
