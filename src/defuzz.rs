//! Centroid defuzzification.
//!
//! Each membership function is reduced to one representative point and the
//! crisp output is the mean of those points weighted by their degrees. This
//! is not the centroid of the clipped, aggregated area; a set with the same
//! degrees always defuzzifies to the same value regardless of how much of
//! each shape is covered.

use num::Float;
use tracing::debug;

use crate::math::weighted_mean;
use crate::membership::{MembershipShape, ShapeKind};
use crate::variable::FuzzySet;

#[cfg(test)]
use test_case::test_case;

impl<F: Float> MembershipShape<F> {
    /// The representative point of this shape used by [`FuzzySet::defuzzify`].
    pub fn centroid(&self) -> F {
        let two = F::one() + F::one();
        let three = two + F::one();
        let four = two + two;
        let Self { a, b, c, d, .. } = *self;

        match self.kind {
            ShapeKind::Triangular => {
                if a == b || b == c {
                    b
                } else {
                    (a + b + c) / three
                }
            },
            ShapeKind::Trapezoidal => {
                if a == b && c == d {
                    (b + c) / two
                } else {
                    (a + b + c + d) / four
                }
            },
            ShapeKind::Rectangular => (a + b) / two,
        }
    }
}

impl<F: Float> FuzzySet<F> {
    /// Crisp value of the set: `Σ(centroid_i * degree_i) / Σ(degree_i)`.
    ///
    /// A set without any membership has no meaningful centroid; zero is
    /// returned in that case.
    pub fn defuzzify(&self) -> F {
        let pairs = self.shapes().iter().zip(self.degrees()).map(|(shape, &degree)| {
            let centroid = if degree == F::zero() {
                F::zero()
            } else {
                shape.centroid()
            };

            (centroid, degree)
        });

        weighted_mean(pairs).unwrap_or_else(|| {
            debug!("defuzzificating a set without membership, falling back to zero");

            F::zero()
        })
    }
}

#[cfg(test)]
#[test_case(MembershipShape::triangular(30., 50., 70.), 50. ; "symmetric triangle")]
#[test_case(MembershipShape::triangular(0., 30., 90.), 40. ; "skewed triangle")]
#[test_case(MembershipShape::triangular(20., 20., 80.), 20. ; "vertical left edge")]
#[test_case(MembershipShape::triangular(20., 80., 80.), 80. ; "vertical right edge")]
#[test_case(MembershipShape::trapezoidal(50., 70., 100., 100.), 80. ; "trapezoid")]
#[test_case(MembershipShape::trapezoidal(0., 0., 30., 50.), 20. ; "trapezoid with one vertical edge")]
#[test_case(MembershipShape::trapezoidal(10., 10., 30., 30.), 20. ; "trapezoid degenerated to rectangle")]
#[test_case(MembershipShape::rectangular(-20., 20.), 0. ; "rectangle")]
fn test_centroid(shape: MembershipShape, expected: f64) {
    assert_eq!(shape.centroid(), expected);
}

#[cfg(test)]
fn output_set() -> FuzzySet {
    FuzzySet::new([
        MembershipShape::trapezoidal(0., 0., 30., 50.),
        MembershipShape::triangular(30., 50., 70.),
        MembershipShape::trapezoidal(50., 70., 100., 100.),
    ])
    .unwrap()
}

#[test]
fn test_single_term_defuzzifies_to_its_centroid() {
    let mut set = output_set();

    set.set_degree(2, 1.).unwrap();

    assert_eq!(set.defuzzify(), 80.);

    // Only the relative degree matters
    set.set_degree(2, 0.25).unwrap();

    assert_eq!(set.defuzzify(), 80.);
}

#[test]
fn test_weighted_centroid() {
    let mut set = output_set();

    set.set_degree(0, 0.5).unwrap();
    set.set_degree(1, 0.5).unwrap();

    // (20 * 0.5 + 50 * 0.5) / 1
    assert_eq!(set.defuzzify(), 35.);
}

#[test]
fn test_no_membership_defuzzifies_to_zero() {
    assert_eq!(output_set().defuzzify(), 0.);
}

#[test]
fn test_normalization_does_not_move_the_centroid() {
    let mut set = output_set();

    set.set_degree(0, 1.).unwrap();
    set.set_degree(1, 0.5).unwrap();
    set.set_degree(2, 0.5).unwrap();

    let raw = set.defuzzify();

    set.normalize();

    assert_eq!(set.degrees(), &[0.5, 0.25, 0.25]);
    assert_eq!(set.defuzzify().to_bits(), raw.to_bits());

    // Sums that don't scale exactly still agree up to rounding
    let mut set = output_set();

    set.set_degree(0, 0.3).unwrap();
    set.set_degree(1, 0.7).unwrap();
    set.set_degree(2, 0.6).unwrap();

    let raw = set.defuzzify();

    set.normalize();

    assert!((set.defuzzify() - raw).abs() < 1e-12);
}
