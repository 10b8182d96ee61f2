use std::fmt;
use std::str::FromStr;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[cfg(test)]
use test_case::test_case;

/// The shape family of a membership function.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Triangular,
    Trapezoidal,
    Rectangular,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triangular => "triangular",
            Self::Trapezoidal => "trapezoidal",
            Self::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangular" => Ok(Self::Triangular),
            "trapezoidal" => Ok(Self::Trapezoidal),
            "rectangular" => Ok(Self::Rectangular),
            _ => Err(Error::UnknownShapeKind(s.to_owned())),
        }
    }
}

/// A membership function: four breakpoints interpreted according to `kind`.
///
/// Triangular shapes only read `a, b, c` and rectangular shapes only `a, b`;
/// the remaining parameters are carried along but ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembershipShape<F = f64> {
    pub a: F,
    pub b: F,
    pub c: F,
    pub d: F,
    pub kind: ShapeKind,
}

impl<F: Float> MembershipShape<F> {
    pub fn new(a: F, b: F, c: F, d: F, kind: ShapeKind) -> Self {
        Self { a, b, c, d, kind }
    }

    /// Rises from `a` to a peak at `b`, falls back to zero at `c`.
    pub fn triangular(a: F, b: F, c: F) -> Self {
        Self::new(a, b, c, F::zero(), ShapeKind::Triangular)
    }

    /// Rises from `a` to `b`, stays at one until `c`, falls to zero at `d`.
    pub fn trapezoidal(a: F, b: F, c: F, d: F) -> Self {
        Self::new(a, b, c, d, ShapeKind::Trapezoidal)
    }

    /// One on `[a, b)` and zero everywhere else.
    pub fn rectangular(a: F, b: F) -> Self {
        Self::new(a, b, F::zero(), F::zero(), ShapeKind::Rectangular)
    }

    /// The parameters this shape's kind actually reads.
    fn breakpoints(&self) -> ([F; 4], usize) {
        let n = match self.kind {
            ShapeKind::Triangular => 3,
            ShapeKind::Trapezoidal => 4,
            ShapeKind::Rectangular => 2,
        };

        ([self.a, self.b, self.c, self.d], n)
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        let (all, n) = self.breakpoints();
        let points = &all[..n];

        if points.iter().any(|p| !p.is_finite()) {
            return Err("breakpoints must be finite");
        }
        if points.windows(2).any(|w| w[0] > w[1]) {
            return Err("breakpoints must be non-decreasing");
        }

        Ok(())
    }

    /// Degree of membership of `x`, always within `[0, 1]` for a valid shape.
    pub fn evaluate(&self, x: F) -> F {
        if x.is_nan() {
            return F::zero();
        }

        match self.kind {
            ShapeKind::Triangular => triangular(x, self.a, self.b, self.c),
            ShapeKind::Trapezoidal => trapezoidal(x, self.a, self.b, self.c, self.d),
            ShapeKind::Rectangular => rectangular(x, self.a, self.b),
        }
    }
}

impl<F: Float> From<(F, F, F, F, ShapeKind)> for MembershipShape<F> {
    fn from((a, b, c, d, kind): (F, F, F, F, ShapeKind)) -> Self {
        Self::new(a, b, c, d, kind)
    }
}

fn triangular<F: Float>(x: F, a: F, b: F, c: F) -> F {
    if x < a || x > c {
        F::zero()
    } else if x <= b {
        // Vertical left edge
        if a == b {
            F::one()
        } else {
            (x - a) / (b - a)
        }
    } else {
        // x > b and x <= c, so c > b here and a right edge with b == c never divides
        (c - x) / (c - b)
    }
}

fn trapezoidal<F: Float>(x: F, a: F, b: F, c: F, d: F) -> F {
    // The plateau is tested first so vertical edges belong to it
    if b <= x && x <= c {
        F::one()
    } else if x <= a || x >= d {
        F::zero()
    } else if x < b {
        (x - a) / (b - a)
    } else {
        (d - x) / (d - c)
    }
}

fn rectangular<F: Float>(x: F, a: F, b: F) -> F {
    if a <= x && x < b {
        F::one()
    } else {
        F::zero()
    }
}

#[cfg(test)]
#[test_case(-10., 0. ; "left of support")]
#[test_case(10., 0. ; "left foot")]
#[test_case(15., 0.25)]
#[test_case(30., 1. ; "peak")]
#[test_case(40., 0.5)]
#[test_case(50., 0. ; "right foot")]
#[test_case(80., 0. ; "right of support")]
fn test_triangular(x: f64, expected: f64) {
    assert_eq!(MembershipShape::triangular(10., 30., 50.).evaluate(x), expected);
}

#[test]
fn test_triangular_is_monotone_on_each_side() {
    let shape = MembershipShape::triangular(-3., 1., 7.);
    let rising: Vec<f64> = (0..=40).map(|i| shape.evaluate(-3. + 0.1 * f64::from(i))).collect();
    let falling: Vec<f64> = (0..=60).map(|i| shape.evaluate(1. + 0.1 * f64::from(i))).collect();

    assert!(rising.windows(2).all(|w| w[0] <= w[1]));
    assert!(falling.windows(2).all(|w| w[0] >= w[1]));
    assert!(rising.iter().chain(&falling).all(|d| (0. ..=1.).contains(d)));
}

#[cfg(test)]
#[test_case(20., 1. ; "vertical edge")]
#[test_case(19.9, 0. ; "left of support")]
#[test_case(35., 0.5)]
#[test_case(50., 0.)]
fn test_triangular_vertical_left_edge(x: f64, expected: f64) {
    assert_eq!(MembershipShape::triangular(20., 20., 50.).evaluate(x), expected);
}

#[cfg(test)]
#[test_case(35., 0.5)]
#[test_case(50., 1. ; "vertical edge")]
#[test_case(50.1, 0. ; "right of support")]
fn test_triangular_vertical_right_edge(x: f64, expected: f64) {
    assert_eq!(MembershipShape::triangular(20., 50., 50.).evaluate(x), expected);
}

#[test]
fn test_triangular_spike() {
    let shape = MembershipShape::triangular(5., 5., 5.);

    assert_eq!(shape.evaluate(5.), 1.);
    assert_eq!(shape.evaluate(4.999), 0.);
    assert_eq!(shape.evaluate(5.001), 0.);
}

#[cfg(test)]
#[test_case(15., 0. ; "left foot")]
#[test_case(27.5, 0.5)]
#[test_case(40., 1. ; "plateau start")]
#[test_case(50., 1. ; "plateau")]
#[test_case(60., 1. ; "plateau end")]
#[test_case(70., 0.5)]
#[test_case(80., 0. ; "right foot")]
#[test_case(95., 0. ; "right of support")]
fn test_trapezoidal(x: f64, expected: f64) {
    assert_eq!(MembershipShape::trapezoidal(15., 40., 60., 80.).evaluate(x), expected);
}

#[test]
fn test_trapezoidal_vertical_edges() {
    let low = MembershipShape::trapezoidal(0., 0., 15., 40.);
    let high = MembershipShape::trapezoidal(60., 80., 100., 100.);

    assert_eq!(low.evaluate(0.), 1.);
    assert_eq!(low.evaluate(-0.1), 0.);
    assert_eq!(high.evaluate(100.), 1.);
    assert_eq!(high.evaluate(100.1), 0.);
}

#[cfg(test)]
#[test_case(-20., 1. ; "lower bound")]
#[test_case(0., 1.)]
#[test_case(19.999, 1.)]
#[test_case(20., 0. ; "upper bound is excluded")]
#[test_case(-20.001, 0.)]
fn test_rectangular(x: f64, expected: f64) {
    assert_eq!(MembershipShape::rectangular(-20., 20.).evaluate(x), expected);
}

#[test]
fn test_nan_has_no_membership() {
    assert_eq!(MembershipShape::triangular(0., 1., 2.).evaluate(f64::NAN), 0.);
    assert_eq!(MembershipShape::trapezoidal(0., 1., 2., 3.).evaluate(f64::NAN), 0.);
    assert_eq!(MembershipShape::rectangular(0., 1.).evaluate(f64::NAN), 0.);
}

#[test]
fn test_single_precision() {
    let shape = MembershipShape::<f32>::triangular(0., 2., 4.);

    assert_eq!(shape.evaluate(1.), 0.5);
}

#[test]
fn test_shape_kind_from_str() {
    assert_eq!("Trapezoidal".parse(), Ok(ShapeKind::Trapezoidal));
    assert_eq!("triangular".parse(), Ok(ShapeKind::Triangular));
    assert_eq!(ShapeKind::Rectangular.to_string().parse(), Ok(ShapeKind::Rectangular));
    assert_eq!(
        "gaussian".parse::<ShapeKind>(),
        Err(Error::UnknownShapeKind("gaussian".to_owned()))
    );
}

#[test]
fn test_shapes_from_json() {
    let json = r#"[
        {"a": 0.0, "b": 0.0, "c": 30.0, "d": 50.0, "kind": "trapezoidal"},
        {"a": 30.0, "b": 50.0, "c": 70.0, "d": 0.0, "kind": "triangular"}
    ]"#;
    let shapes: Vec<MembershipShape> = serde_json::from_str(json).unwrap();

    assert_eq!(
        shapes,
        vec![
            MembershipShape::trapezoidal(0., 0., 30., 50.),
            MembershipShape::triangular(30., 50., 70.),
        ]
    );
    assert!(serde_json::from_str::<MembershipShape>(r#"{"a": 0.0, "b": 1.0, "c": 0.0, "d": 0.0, "kind": "bell"}"#).is_err());
}
