//! Linear ramp for click-free parameter changes on the render path.
//!
//! # Example
//!
//! ```
//! use plughost_core::SmoothedValue;
//! use std::time::Duration;
//!
//! let mut gain = SmoothedValue::new(1.0, Duration::from_millis(10), 48000.0);
//! gain.set_target(0.5);
//!
//! # let mut block = [1.0f32; 256];
//! for sample in block.iter_mut() {
//!     *sample *= gain.next_sample();
//! }
//! ```

use std::time::Duration;

/// Linear ramp towards a target. Every method is allocation-free.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    /// A zero ramp jumps straight to each new target.
    pub fn new(initial: f32, ramp: Duration, sample_rate: f64) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples: Self::samples_for(ramp, sample_rate),
        }
    }

    pub fn immediate(initial: f32) -> Self {
        Self::new(initial, Duration::ZERO, 1.0)
    }

    fn samples_for(ramp: Duration, sample_rate: f64) -> u32 {
        (ramp.as_secs_f64() * sample_rate).round().max(0.0) as u32
    }

    /// Takes effect on the next `set_target` call.
    pub fn set_ramp(&mut self, ramp: Duration, sample_rate: f64) {
        self.ramp_samples = Self::samples_for(ramp, sample_rate);
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;

        if self.ramp_samples == 0 {
            self.current = target;
            self.step = 0.0;
            self.remaining = 0;
        } else {
            self.remaining = self.ramp_samples;
            self.step = (target - self.current) / self.ramp_samples as f32;
        }
    }

    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}
