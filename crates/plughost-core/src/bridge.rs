//! Lock-free parameter cells between the control and render context.
//!
//! Each published address owns one [`ParameterBridge`] holding two shadow
//! values: the control side writes `requested`, the render side reads it and
//! writes back `effective` once it has applied the value. Both transfers are
//! single atomic words, so neither side ever blocks the other.

use crate::lockfree::AtomicFloat;
use crate::parameter::ParameterDescriptor;
use std::sync::Arc;

/// One parameter's requested/effective pair.
#[derive(Debug)]
pub struct ParameterBridge {
    descriptor: ParameterDescriptor,
    requested: AtomicFloat,
    effective: AtomicFloat,
}

impl ParameterBridge {
    pub fn new(descriptor: ParameterDescriptor) -> Self {
        let initial = descriptor.default;
        Self {
            descriptor,
            requested: AtomicFloat::new(initial),
            effective: AtomicFloat::new(initial),
        }
    }

    pub fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn address(&self) -> u64 {
        self.descriptor.address
    }

    /// Control side. Clamps and publishes; returns the stored value.
    #[inline]
    pub fn set(&self, value: f32) -> f32 {
        let clamped = self.descriptor.clamp(value);
        self.requested.set(clamped);
        clamped
    }

    /// Render side (also safe from the control side). Latest requested value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.requested.get()
    }

    /// Render side. Reports the value actually applied this block.
    #[inline]
    pub fn publish_effective(&self, value: f32) {
        self.effective.set(value);
    }

    /// Control side. Last value the render side reported.
    #[inline]
    pub fn effective(&self) -> f32 {
        self.effective.get()
    }
}

/// Sampled values of one parameter, for control-side polling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub address: u64,
    pub requested: f32,
    pub effective: f32,
}

/// The parameter tree of one stage.
///
/// Built once when the stage is created and shared (behind an `Arc`) with
/// whoever controls it. The set of addresses never changes afterwards, so
/// lookups need no synchronisation.
#[derive(Debug, Default)]
pub struct ParameterBank {
    bridges: Vec<Arc<ParameterBridge>>,
}

impl ParameterBank {
    /// Later descriptors with an address already present are dropped.
    pub fn new(descriptors: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        let mut bridges: Vec<Arc<ParameterBridge>> = Vec::new();
        for descriptor in descriptors {
            if bridges.iter().any(|b| b.address() == descriptor.address) {
                tracing::warn!(
                    address = descriptor.address,
                    name = %descriptor.name,
                    "duplicate parameter address ignored"
                );
                continue;
            }
            bridges.push(Arc::new(ParameterBridge::new(descriptor)));
        }
        Self { bridges }
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    pub fn bridge(&self, address: u64) -> Option<&Arc<ParameterBridge>> {
        self.bridges.iter().find(|b| b.address() == address)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.bridges.iter().map(|b| b.descriptor())
    }

    /// Returns the clamped value stored, or `None` for an unknown or
    /// non-writable address.
    pub fn set(&self, address: u64, value: f32) -> Option<f32> {
        let bridge = self.bridge(address)?;
        if !bridge.descriptor().flags.writable {
            return None;
        }
        Some(bridge.set(value))
    }

    pub fn get(&self, address: u64) -> Option<f32> {
        self.bridge(address).map(|b| b.get())
    }

    pub fn effective(&self, address: u64) -> Option<f32> {
        self.bridge(address).map(|b| b.effective())
    }

    /// Samples every parameter. Allocates; control context only.
    pub fn snapshot(&self) -> Vec<ParameterSnapshot> {
        self.bridges
            .iter()
            .map(|b| ParameterSnapshot {
                address: b.address(),
                requested: b.get(),
                effective: b.effective(),
            })
            .collect()
    }
}
