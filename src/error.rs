use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration errors surfaced while building sets and rules, or when an
/// inference cycle is handed state that doesn't match its rules.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("a fuzzy set needs at least one membership function")]
    EmptySet,
    #[error("membership function {index} is invalid: {reason}")]
    InvalidShape { index: usize, reason: &'static str },
    #[error("unknown membership function kind `{0}`")]
    UnknownShapeKind(String),
    #[error("variable is not registered")]
    UnknownVariable,
    #[error("term index {index} is out of range for a set of {len} terms")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("membership degree {0} is outside [0, 1]")]
    DegreeOutOfRange(f64),
    #[error("rule has an antecedent group without any variables")]
    EmptyAntecedent,
    #[error("rule has no antecedents")]
    NoAntecedents,
    #[error("a rule consequent cannot be negated")]
    NegatedConsequent,
    #[error("no rules to evaluate")]
    NoRules,
}
