use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// Colour given to classes without `editor_color` and without a parent.
pub const DEFAULT_ENTITY_COLOUR: Vector3 = Vector3::new(0.3, 0.3, 1.0);

/// Registry settings.
///
/// Deserialisable so that front ends can embed it in their own config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Colour for classes that neither declare nor inherit one.
    pub default_colour: Vector3,

    /// Colour scheme overrides by exact class name. An override is final: it
    /// beats the class's own `editor_color`.
    pub colour_overrides: BTreeMap<String, Vector3>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_colour: DEFAULT_ENTITY_COLOUR,
            colour_overrides: BTreeMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Add a colour override for one class.
    pub fn with_colour_override(mut self, class_name: impl Into<String>, colour: Vector3) -> Self {
        self.colour_overrides.insert(class_name.into(), colour);
        self
    }
}
