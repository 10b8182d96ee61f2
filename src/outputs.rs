use std::collections::HashMap;

use crate::variable::{Variable, VariableKey};

/// Defuzzificated result of one inference cycle, one crisp value per
/// variable written by a rule consequence.
#[derive(Clone, Debug)]
pub struct Outputs<F = f64> {
    defuzzificated: HashMap<VariableKey, F>,
}

impl<F: Copy> Outputs<F> {
    pub(crate) fn new(defuzzificated: HashMap<VariableKey, F>) -> Self {
        Self { defuzzificated }
    }

    pub fn get<I>(&self, var: Variable<I>) -> Option<F> {
        self.defuzzificated.get(&var.0).copied()
    }

    pub fn len(&self) -> usize {
        self.defuzzificated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defuzzificated.is_empty()
    }
}
