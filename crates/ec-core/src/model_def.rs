use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity_class::standard_path;
use crate::source::{ModelDefBlock, SourceInfo};

/// An animated mesh template from a `model` block.
///
/// Model defs form their own single-inheritance hierarchy, separate from
/// entity classes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelDef {
    name: String,
    #[serde(rename = "inherit", skip_serializing_if = "Option::is_none")]
    parent_name: Option<String>,
    mesh: String,
    skin: String,
    anims: BTreeMap<String, String>,
    #[serde(skip)]
    resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<SourceInfo>,
    #[serde(skip)]
    parse_stamp: u32,
}

impl ModelDef {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The model name, exactly as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parent model, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Mesh path, inherited when not set locally.
    pub fn mesh(&self) -> &str {
        &self.mesh
    }

    /// Skin name, inherited when not set locally.
    pub fn skin(&self) -> &str {
        &self.skin
    }

    /// Animation name to file, including inherited animations.
    pub fn anims(&self) -> &BTreeMap<String, String> {
        &self.anims
    }

    /// File of one animation.
    pub fn anim(&self, name: &str) -> Option<&str> {
        self.anims.get(name).map(String::as_str)
    }

    /// Where the model was last parsed from.
    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    /// Returns `true` once inheritance has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn parse_stamp(&self) -> u32 {
        self.parse_stamp
    }

    pub(crate) fn set_parse_stamp(&mut self, stamp: u32) {
        self.parse_stamp = stamp;
    }

    pub(crate) fn set_resolved(&mut self) {
        self.resolved = true;
    }

    /// Take the parent's mesh, skin and animations where this def has none.
    pub(crate) fn inherit_from(&mut self, parent: &ModelDef) {
        if self.mesh.is_empty() {
            self.mesh.clone_from(&parent.mesh);
        }
        if self.skin.is_empty() {
            self.skin.clone_from(&parent.skin);
        }
        for (name, file) in &parent.anims {
            self.anims
                .entry(name.clone())
                .or_insert_with(|| file.clone());
        }
    }

    pub(crate) fn clear(&mut self) {
        let name = std::mem::take(&mut self.name);
        *self = Self::new(name);
    }

    /// Refill from a parsed block, discarding earlier content.
    pub(crate) fn populate(&mut self, block: &ModelDefBlock) {
        self.clear();
        self.parent_name = block
            .inherit
            .clone()
            .filter(|parent| !parent.is_empty() && *parent != self.name);
        self.mesh = block.mesh.as_deref().map(standard_path).unwrap_or_default();
        self.skin = block.skin.clone().unwrap_or_default();
        for (name, file) in &block.anims {
            // First declaration of an animation wins
            self.anims
                .entry(name.clone())
                .or_insert_with(|| standard_path(file));
        }
        self.source = Some(block.source.clone());
    }
}
