use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use num::Float;
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::error::{Error, Result};
use crate::math::normalize;
use crate::membership::MembershipShape;
use crate::terms::Term;

#[cfg(test)]
use pretty_assertions::assert_eq;
#[cfg(test)]
use crate::membership::ShapeKind;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// A handle to a fuzzy set registered in [`Variables`], addressed by terms of type `I`.
pub struct Variable<I = usize>(pub(crate) VariableKey, PhantomData<I>);

impl<I> Variable<I> {
    pub fn key(self) -> VariableKey {
        self.0
    }
}

impl<I> Clone for Variable<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for Variable<I> {}

impl<I> PartialEq for Variable<I> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<I> Eq for Variable<I> {}

impl<I> fmt::Debug for Variable<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0).finish()
    }
}

/// A fixed-length list of membership functions together with the degree
/// each one currently holds.
///
/// Input sets get their degrees from [`FuzzySet::classify`], output sets from
/// inference. Only the degrees ever change after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzySet<F = f64> {
    shapes: Box<[MembershipShape<F>]>,
    degrees: Box<[F]>,
}

impl<F: Float> FuzzySet<F> {
    pub fn new<S: Into<MembershipShape<F>>>(shapes: impl IntoIterator<Item = S>) -> Result<Self> {
        let shapes: Box<[MembershipShape<F>]> = shapes.into_iter().map(Into::into).collect();

        if shapes.is_empty() {
            return Err(Error::EmptySet);
        }

        for (index, shape) in shapes.iter().enumerate() {
            shape
                .validate()
                .map_err(|reason| Error::InvalidShape { index, reason })?;
        }

        let degrees = vec![F::zero(); shapes.len()].into_boxed_slice();

        Ok(Self { shapes, degrees })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false, a set is rejected at construction without shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[MembershipShape<F>] {
        &self.shapes
    }

    pub fn degrees(&self) -> &[F] {
        &self.degrees
    }

    pub fn degree(&self, index: usize) -> Option<F> {
        self.degrees.get(index).copied()
    }

    /// Write a degree directly, e.g. to feed an already fuzzy measurement.
    pub fn set_degree(&mut self, index: usize, degree: F) -> Result<()> {
        if !(F::zero()..=F::one()).contains(&degree) {
            return Err(Error::DegreeOutOfRange(degree.to_f64().unwrap_or(f64::NAN)));
        }

        let len = self.len();
        let slot = self
            .degrees
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;

        *slot = degree;

        Ok(())
    }

    /// Fuzzificate a crisp value: every shape is evaluated at `x` and its raw
    /// degree stored at the same index. Degrees are not normalized.
    pub fn classify(&mut self, x: F) {
        for (degree, shape) in self.degrees.iter_mut().zip(self.shapes.iter()) {
            *degree = shape.evaluate(x);
        }

        trace!(x = ?x.to_f64(), degrees = ?self.degrees_f64(), "classified");
    }

    /// Scale the degrees so they sum to one; an all-zero set stays all zero.
    pub fn normalize(&mut self) {
        normalize(&mut self.degrees);
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index, len: self.len() })
        }
    }

    pub(crate) fn reset(&mut self, index: usize) {
        self.degrees[index] = F::zero();
    }

    pub(crate) fn aggregate(&mut self, index: usize, strength: F) {
        let slot = &mut self.degrees[index];

        *slot = F::max(*slot, strength);
    }

    pub(crate) fn degrees_f64(&self) -> Vec<Option<f64>> {
        self.degrees.iter().map(|d| d.to_f64()).collect()
    }
}

/// The arena owning every fuzzy set of a system.
///
/// Sets are created with [`Variables::add`] and released with
/// [`Variables::remove`] (or by dropping the arena). Removed handles never
/// alias a later set.
pub struct Variables<F = f64>(pub(crate) SlotMap<VariableKey, FuzzySet<F>>);

impl<F> Default for Variables<F> {
    fn default() -> Self {
        Self(SlotMap::with_key())
    }
}

impl<F: Float> Variables<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(SlotMap::with_capacity_and_key(capacity))
    }

    /// Build a set from an ordered list of shapes. The position of each shape
    /// is the index of the term it describes.
    pub fn add<I: Term, S: Into<MembershipShape<F>>>(
        &mut self,
        shapes: impl IntoIterator<Item = S>,
    ) -> Result<Variable<I>> {
        let set = FuzzySet::new(shapes)?;
        let key = self.0.insert(set);

        Ok(Variable(key, PhantomData))
    }

    pub fn remove<I>(&mut self, var: Variable<I>) -> Option<FuzzySet<F>> {
        self.0.remove(var.0)
    }

    pub fn contains<I>(&self, var: Variable<I>) -> bool {
        self.0.contains_key(var.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get<I>(&self, var: Variable<I>) -> Option<&FuzzySet<F>> {
        self.0.get(var.0)
    }

    pub fn get_mut<I>(&mut self, var: Variable<I>) -> Option<&mut FuzzySet<F>> {
        self.0.get_mut(var.0)
    }

    /// Current degree of `term` in `var`.
    pub fn degree<I: Term>(&self, var: Variable<I>, term: I) -> Option<F> {
        self.get(var)?.degree(term.index())
    }

    pub fn classify<I>(&mut self, var: Variable<I>, x: F) -> Result<()> {
        self.get_mut(var).ok_or(Error::UnknownVariable)?.classify(x);

        Ok(())
    }

    pub fn normalize<I>(&mut self, var: Variable<I>) -> Result<()> {
        self.get_mut(var).ok_or(Error::UnknownVariable)?.normalize();

        Ok(())
    }

    pub fn defuzzify<I>(&self, var: Variable<I>) -> Result<F> {
        Ok(self.get(var).ok_or(Error::UnknownVariable)?.defuzzify())
    }

    pub(crate) fn by_key(&self, key: VariableKey) -> Result<&FuzzySet<F>> {
        self.0.get(key).ok_or(Error::UnknownVariable)
    }

    pub(crate) fn by_key_mut(&mut self, key: VariableKey) -> Result<&mut FuzzySet<F>> {
        self.0.get_mut(key).ok_or(Error::UnknownVariable)
    }
}

impl<F, I> Index<Variable<I>> for Variables<F> {
    type Output = FuzzySet<F>;

    /// Panics if `var` was removed.
    fn index(&self, var: Variable<I>) -> &Self::Output {
        &self.0[var.0]
    }
}

#[cfg(test)]
fn input_shapes() -> [MembershipShape; 3] {
    [
        MembershipShape::trapezoidal(0., 0., 15., 40.),
        MembershipShape::trapezoidal(15., 40., 60., 80.),
        MembershipShape::trapezoidal(60., 80., 100., 100.),
    ]
}

#[test]
fn test_new_set_is_zeroed() {
    let set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    assert_eq!(set.len(), 3);
    assert!(!set.is_empty());
    assert_eq!(set.degrees(), &[0., 0., 0.]);
}

#[test]
fn test_empty_set_is_rejected() {
    let shapes: [MembershipShape; 0] = [];

    assert_eq!(FuzzySet::<f64>::new(shapes), Err(Error::EmptySet));
}

#[test]
fn test_invalid_shapes_are_rejected() {
    let shapes = [
        MembershipShape::triangular(0., 5., 10.),
        MembershipShape::trapezoidal(0., 20., 10., 30.),
    ];

    assert_eq!(
        FuzzySet::<f64>::new(shapes),
        Err(Error::InvalidShape {
            index: 1,
            reason: "breakpoints must be non-decreasing"
        })
    );

    let shapes = [MembershipShape::rectangular(f64::NAN, 1.)];

    assert_eq!(
        FuzzySet::<f64>::new(shapes),
        Err(Error::InvalidShape {
            index: 0,
            reason: "breakpoints must be finite"
        })
    );
}

#[test]
fn test_ignored_parameters_are_not_validated() {
    // Triangles and rectangles leave their trailing parameters unused
    let shapes = [
        (18., 23., 35., 0., ShapeKind::Triangular),
        (0., 20., 0., 0., ShapeKind::Rectangular),
    ];

    assert!(FuzzySet::<f64>::new(shapes).is_ok());
}

#[test]
fn test_classify_low_edge() {
    let mut set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    set.classify(0.);

    assert_eq!(set.degrees(), &[1., 0., 0.]);
}

#[test]
fn test_classify_overlap() {
    let mut set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    set.classify(70.);

    assert_eq!(set.degrees(), &[0., 0.5, 0.5]);

    set.classify(27.5);

    assert_eq!(set.degrees(), &[0.5, 0.5, 0.]);
}

#[test]
fn test_classify_outside_every_shape() {
    let mut set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    set.classify(50.);
    set.classify(-10.);

    assert_eq!(set.degrees(), &[0., 0., 0.]);

    set.classify(250.);

    assert_eq!(set.degrees(), &[0., 0., 0.]);
}

#[test]
fn test_set_degree() {
    let mut set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    set.set_degree(2, 0.25).unwrap();

    assert_eq!(set.degree(2), Some(0.25));
    assert_eq!(set.set_degree(3, 0.5), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    assert_eq!(set.set_degree(0, 1.5), Err(Error::DegreeOutOfRange(1.5)));
    assert!(matches!(set.set_degree(0, f64::NAN), Err(Error::DegreeOutOfRange(_))));
}

#[test]
fn test_normalize() {
    let mut set: FuzzySet = FuzzySet::new(input_shapes()).unwrap();

    set.set_degree(0, 0.5).unwrap();
    set.set_degree(1, 1.).unwrap();
    set.set_degree(2, 0.5).unwrap();
    set.normalize();

    assert_eq!(set.degrees(), &[0.25, 0.5, 0.25]);

    set.classify(-50.);
    set.normalize();

    assert_eq!(set.degrees(), &[0., 0., 0.]);
}

#[test]
fn test_variables_lifecycle() {
    let mut vars: Variables = Variables::new();
    let input = vars.add::<usize, _>(input_shapes()).unwrap();

    vars.classify(input, 0.).unwrap();

    assert_eq!(vars[input].degrees(), &[1., 0., 0.]);
    assert_eq!(vars.degree(input, 0), Some(1.));

    let released = vars.remove(input).unwrap();

    assert_eq!(released.degrees(), &[1., 0., 0.]);
    assert!(!vars.contains(input));
    assert!(vars.is_empty());
    assert_eq!(vars.classify(input, 0.), Err(Error::UnknownVariable));
    assert_eq!(vars.defuzzify(input), Err(Error::UnknownVariable));

    // A fresh set never reuses a released handle
    let other = vars.add::<usize, _>(input_shapes()).unwrap();

    assert_ne!(input, other);
    assert_eq!(vars.get(input), None);
}
