//! Parameter descriptors published by render stages.
//!
//! A descriptor is immutable once a stage publishes it. The value itself
//! lives in a [`ParameterBridge`](crate::ParameterBridge).
//!
//! # Example
//!
//! ```
//! use plughost_core::{ParameterDescriptor, ParameterUnit};
//!
//! let gain = ParameterDescriptor::new(0, "gain", "Gain", 0.0, 2.0, 1.0)
//!     .unit(ParameterUnit::LinearGain);
//!
//! assert_eq!(gain.clamp(3.0), 2.0);
//! assert_eq!(gain.normalize(1.0), 0.5);
//! ```

use serde::{Deserialize, Serialize};

/// Unit tag describing how a value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterUnit {
    #[default]
    Generic,
    LinearGain,
    Decibels,
    /// Off below the midpoint of the range, on at or above it.
    Boolean,
    Hertz,
    Milliseconds,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterFlags {
    pub readable: bool,
    pub writable: bool,
    pub automatable: bool,
}

impl Default for ParameterFlags {
    fn default() -> Self {
        Self {
            readable: true,
            writable: true,
            automatable: true,
        }
    }
}

impl ParameterFlags {
    pub fn read_only() -> Self {
        Self {
            readable: true,
            writable: false,
            automatable: false,
        }
    }
}

/// Immutable description of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Stable numeric address, unique within one stage.
    pub address: u64,
    pub identifier: String,
    pub name: String,
    pub min: f32,
    pub max: f32,
    /// Clamped into `[min, max]` on construction.
    pub default: f32,
    pub unit: ParameterUnit,
    pub flags: ParameterFlags,
}

impl ParameterDescriptor {
    pub fn new(
        address: u64,
        identifier: impl Into<String>,
        name: impl Into<String>,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        debug_assert!(max >= min, "max must not be below min");

        Self {
            address,
            identifier: identifier.into(),
            name: name.into(),
            min,
            max,
            default: default.clamp(min, max),
            unit: ParameterUnit::Generic,
            flags: ParameterFlags::default(),
        }
    }

    /// On/off parameter over `[0, 1]`.
    pub fn toggle(
        address: u64,
        identifier: impl Into<String>,
        name: impl Into<String>,
        default_on: bool,
    ) -> Self {
        Self::new(
            address,
            identifier,
            name,
            0.0,
            1.0,
            if default_on { 1.0 } else { 0.0 },
        )
        .unit(ParameterUnit::Boolean)
    }

    pub fn unit(mut self, unit: ParameterUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn flags(mut self, flags: ParameterFlags) -> Self {
        self.flags = flags;
        self
    }

    /// NaN maps to the default value.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Real value to `0.0..=1.0`.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }

        match self.unit {
            ParameterUnit::Boolean => {
                if value >= self.min + span / 2.0 {
                    1.0
                } else {
                    0.0
                }
            }
            _ => (value - self.min) / span,
        }
    }

    /// `0.0..=1.0` to real value.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);

        match self.unit {
            ParameterUnit::Boolean => {
                if normalized >= 0.5 {
                    self.max
                } else {
                    self.min
                }
            }
            _ => self.min + normalized * self.span(),
        }
    }

    /// Interprets a value of a [`ParameterUnit::Boolean`] parameter.
    #[inline]
    pub fn is_on(&self, value: f32) -> bool {
        value >= self.min + self.span() / 2.0
    }
}
