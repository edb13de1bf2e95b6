//! Animation speed factor and the bounded range the controls expose.

use anyhow::Result;
use serde::Serialize;

/// Multiplier applied to the base step delay. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct SpeedFactor(f64);

impl Default for SpeedFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

impl SpeedFactor {
    /// Rejects anything outside `range`. This is the only way a speed enters
    /// the engine, so the engine never sees zero or negative factors.
    pub fn new(value: f64, range: &SpeedRange) -> Result<Self> {
        if !value.is_finite() || !range.contains(value) {
            anyhow::bail!(
                "speed {} outside allowed range {}..={}",
                value,
                range.min,
                range.max
            );
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.5,
        }
    }
}

impl SpeedRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn faster(&self, speed: SpeedFactor) -> SpeedFactor {
        SpeedFactor((speed.0 + self.step).min(self.max))
    }

    pub fn slower(&self, speed: SpeedFactor) -> SpeedFactor {
        SpeedFactor((speed.0 - self.step).max(self.min))
    }
}
