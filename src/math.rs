use num::Float;

/// Scale `values` in place so they sum to one. An all-zero slice stays zero.
pub(crate) fn normalize<F: Float>(values: &mut [F]) {
    let sum = values.iter().fold(F::zero(), |acc, v| acc + *v);

    if sum == F::zero() {
        values.iter_mut().for_each(|v| *v = F::zero());
    } else {
        values.iter_mut().for_each(|v| *v = *v / sum);
    }
}

/// Weighted mean of `(point, weight)` pairs. Zero total weight yields `None`.
pub(crate) fn weighted_mean<F: Float>(pairs: impl IntoIterator<Item = (F, F)>) -> Option<F> {
    let (num, den) = pairs
        .into_iter()
        .fold((F::zero(), F::zero()), |(num, den), (point, weight)| {
            (num + point * weight, den + weight)
        });

    if den == F::zero() {
        None
    } else {
        Some(num / den)
    }
}

#[test]
fn test_normalize() {
    let mut values = [0.5, 1., 0.5];

    normalize(&mut values);

    assert_eq!(values, [0.25, 0.5, 0.25]);

    let mut zeros = [0.0f32; 4];

    normalize(&mut zeros);

    assert_eq!(zeros, [0.; 4]);
}

#[test]
fn test_weighted_mean() {
    assert_eq!(weighted_mean([(10., 1.), (20., 3.)]), Some(17.5));
    assert_eq!(weighted_mean([(10., 0.), (20., 0.)]), None);
    assert_eq!(weighted_mean(std::iter::empty::<(f64, f64)>()), None);
}
