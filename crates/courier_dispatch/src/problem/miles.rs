use std::{
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::mph::Mph;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Miles(f64);

impl Miles {
    pub const ZERO: Miles = Miles(0.0);

    pub fn new(value: f64) -> Self {
        Miles(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Time needed to drive this distance at a constant `speed`.
    pub fn travel_time(self, speed: Mph) -> Result<SignedDuration, jiff::Error> {
        SignedDuration::try_from_secs_f64(self.0 / speed.value() * 3600.0)
    }
}

impl Eq for Miles {}

impl PartialOrd for Miles {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Miles {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Miles {
    fn from(value: f64) -> Self {
        Miles::new(value)
    }
}

impl std::fmt::Display for Miles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} mi", self.0)
    }
}

impl Add for Miles {
    type Output = Miles;

    fn add(self, other: Miles) -> Miles {
        Miles(self.0 + other.0)
    }
}

impl AddAssign for Miles {
    fn add_assign(&mut self, other: Miles) {
        self.0 += other.0;
    }
}

impl Sub for Miles {
    type Output = Miles;

    fn sub(self, other: Miles) -> Miles {
        Miles(self.0 - other.0)
    }
}

impl Sum for Miles {
    fn sum<I: Iterator<Item = Miles>>(iter: I) -> Miles {
        iter.fold(Miles::ZERO, |acc, x| acc + x)
    }
}
