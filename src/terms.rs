/// A linguistic value of a variable, such as `Temperature::High`.
///
/// Each term names one slot of the variable's fuzzy set. Fieldless enums map
/// naturally onto this with `self as usize`:
///
/// ```
/// use fuzzy_control::Term;
///
/// #[derive(Clone, Copy)]
/// enum Level {
///     Low,
///     Medium,
///     High,
/// }
///
/// impl Term for Level {
///     fn index(self) -> usize {
///         self as usize
///     }
/// }
///
/// assert_eq!(Level::High.index(), 2);
/// ```
pub trait Term: Copy {
    fn index(self) -> usize;
}

impl Term for usize {
    fn index(self) -> usize {
        self
    }
}
