use std::collections::HashMap;

use crate::variable::{Variable, VariableKey};

/// Crisp measurements to fuzzificate, one per input variable.
#[derive(Clone, Debug)]
pub struct Inputs<F = f64>(pub(crate) HashMap<VariableKey, F>);

impl<F> Default for Inputs<F> {
    fn default() -> Self {
        Inputs(HashMap::new())
    }
}

impl<F: Copy> Inputs<F> {
    pub fn new() -> Self {
        Self::default()
    }

    // TODO: Accept fuzzy facts (a degree per term) next to crisp values
    pub fn add<I>(&mut self, var: Variable<I>, val: F) {
        self.0.insert(var.0, val);
    }

    pub fn get<I>(&self, var: Variable<I>) -> Option<F> {
        self.0.get(&var.0).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
