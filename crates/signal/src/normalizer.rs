//! Reading normalizer
//!
//! Converts a raw 3-axis accelerometer measurement into a scalar vibration
//! magnitude: the deviation of the measured acceleration from rest gravity.

use bridgewatch_core::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Gravitational reference in m/s²
pub const GRAVITY: f64 = 9.81;

/// Raw accelerometer axes in m/s²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    /// X axis acceleration
    pub x: f64,
    /// Y axis acceleration
    pub y: f64,
    /// Z axis acceleration
    pub z: f64,
}

impl Axes {
    /// Build axes, rejecting NaN and infinite components as well as
    /// vectors whose magnitude does not fit in an `f64`.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        for (name, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(CoreError::InvalidReading(format!(
                    "axis {name} is not a finite number: {value}"
                )));
            }
        }
        let axes = Self { x, y, z };
        axes.checked_vibration()?;
        Ok(axes)
    }

    /// Euclidean norm of the acceleration vector.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    /// Vibration, failing with `InvalidReading` if it is not finite.
    pub fn checked_vibration(&self) -> Result<f64> {
        let vibration = self.vibration();
        if vibration.is_finite() {
            Ok(vibration)
        } else {
            Err(CoreError::InvalidReading(format!(
                "vibration magnitude overflows: ({}, {}, {})",
                self.x, self.y, self.z
            )))
        }
    }

    /// Vibration magnitude, `|magnitude - g|`.
    pub fn vibration(&self) -> f64 {
        (self.magnitude() - GRAVITY).abs()
    }
}
