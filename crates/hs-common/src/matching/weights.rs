use serde::{Deserialize, Serialize};

/// Default factor weights. Expected to sum to 1.0; not enforced at runtime.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skills: 0.5,
    salary: 0.3,
    location: 0.2,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub salary: f64,
    pub location: f64,
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skills + self.salary + self.location
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-6
    }
}
