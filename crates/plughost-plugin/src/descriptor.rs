//! Plugin identity as reported by discovery.

use plughost_core::PluginCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Four ASCII bytes identifying a component type, subtype or manufacturer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FourCharCode(pub [u8; 4]);

impl FourCharCode {
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }

    /// Takes the first four bytes of `s`, padding with spaces.
    pub fn from_str_padded(s: &str) -> Self {
        let mut code = *b"    ";
        for (dst, src) in code.iter_mut().zip(s.bytes()) {
            *dst = src;
        }
        Self(code)
    }

    /// Big-endian packed form used by the platform registry.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{self}'")
    }
}

/// Registry key of a component: type / subtype / manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentSignature {
    pub kind: FourCharCode,
    pub subtype: FourCharCode,
    pub manufacturer: FourCharCode,
}

impl ComponentSignature {
    pub fn new(kind: FourCharCode, subtype: FourCharCode, manufacturer: FourCharCode) -> Self {
        Self {
            kind,
            subtype,
            manufacturer,
        }
    }

    /// The category implied by the component type, if it is a known one.
    pub fn category(&self) -> Option<PluginCategory> {
        PluginCategory::from_type_code(self.kind.0)
    }
}

impl fmt::Display for ComponentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.subtype, self.manufacturer)
    }
}

/// Immutable description of an installed plugin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub manufacturer: String,
    pub category: PluginCategory,
    pub signature: ComponentSignature,
    pub version: u32,
    pub has_custom_view: bool,
}

impl PluginDescriptor {
    /// The component type code is taken from `category`.
    pub fn new(
        name: impl Into<String>,
        category: PluginCategory,
        subtype: &[u8; 4],
        manufacturer_code: &[u8; 4],
    ) -> Self {
        Self {
            name: name.into(),
            manufacturer: String::new(),
            category,
            signature: ComponentSignature::new(
                FourCharCode(category.type_code()),
                FourCharCode::new(subtype),
                FourCharCode::new(manufacturer_code),
            ),
            version: 0,
            has_custom_view: false,
        }
    }

    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn custom_view(mut self, has_custom_view: bool) -> Self {
        self.has_custom_view = has_custom_view;
        self
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.manufacturer.is_empty() {
            write!(f, "{} [{}]", self.name, self.signature)
        } else {
            write!(f, "{} by {} [{}]", self.name, self.manufacturer, self.signature)
        }
    }
}
