//! Inheritance resolution for entity classes and model defs.
//!
//! Parents are looked up by name in the registry's index at resolution time.
//! Neither hierarchy stores references to its parents.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::diagnostic::Diagnostic;
use crate::entity_class::EntityClass;
use crate::math::{Vector3, Vector4};
use crate::model_def::ModelDef;
use crate::registry::{EntityClassId, ModelDefId};

/// Alpha given to classes with `editor_transparent 1`.
const TRANSPARENT_ALPHA: f64 = 0.5;

fn source_file(source: Option<&crate::source::SourceInfo>) -> Option<String> {
    source.map(|s| s.file.clone())
}

/// Resolves entity class inheritance over the registry's class arena.
pub(crate) struct ClassResolver<'a> {
    classes: &'a mut SlotMap<EntityClassId, EntityClass>,
    names: &'a BTreeMap<String, EntityClassId>,
    config: &'a RegistryConfig,
    diagnostics: &'a mut Vec<Diagnostic>,
    /// Classes whose resolution is in progress, outermost first.
    visiting: Vec<EntityClassId>,
}

impl<'a> ClassResolver<'a> {
    pub(crate) fn new(
        classes: &'a mut SlotMap<EntityClassId, EntityClass>,
        names: &'a BTreeMap<String, EntityClassId>,
        config: &'a RegistryConfig,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            classes,
            names,
            config,
            diagnostics,
            visiting: Vec::new(),
        }
    }

    /// Resolve one class, resolving its ancestors first. Does nothing if the
    /// class is already resolved.
    pub(crate) fn resolve(&mut self, id: EntityClassId) {
        let Some(class) = self.classes.get(id) else {
            return;
        };
        if class.is_resolved() {
            return;
        }

        let name = class.name().to_string();
        let file = source_file(class.source());
        let parent_name = class
            .parent_name()
            .filter(|parent| *parent != name)
            .map(str::to_string);

        self.visiting.push(id);
        let parent = parent_name
            .and_then(|parent_name| self.resolve_parent(&name, &parent_name, file));
        self.visiting.pop();

        let chain = self.inheritance_chain(id);
        let Some(class) = self.classes.get_mut(id) else {
            return;
        };

        let parent_colour = match &parent {
            Some(parent) => {
                for attr in &parent.attributes {
                    class.inherit_attribute(attr);
                }
                Some(parent.colour)
            }
            None => None,
        };
        class.set_inheritance_chain(chain);
        class.set_resolved();

        let model = class.attribute_value("model", true).to_string();
        if !model.is_empty() {
            class.set_model_path(&model);
        }

        let is_light = parent.as_ref().is_some_and(|p| p.is_light)
            || class.attribute_value("editor_light", true) == "1"
            || class.attribute_value("spawnclass", true) == "idLight";
        if is_light {
            class.set_is_light(true);
        }

        let colour = resolve_colour(class, parent_colour, self.config);
        class.set_colour(colour);
    }

    /// Resolve the parent of `name` and snapshot what the child inherits.
    fn resolve_parent(
        &mut self,
        name: &str,
        parent_name: &str,
        file: Option<String>,
    ) -> Option<ParentSnapshot> {
        let Some(&parent_id) = self.names.get(parent_name) else {
            warn!("entity class {} specifies unknown parent class {}", name, parent_name);
            let mut diagnostic = Diagnostic::warning(format!(
                "entity class \"{name}\" specifies unknown parent class \"{parent_name}\""
            ));
            if let Some(file) = file {
                diagnostic = diagnostic.in_file(file);
            }
            self.diagnostics.push(diagnostic);
            return None;
        };

        if self.visiting.contains(&parent_id) {
            warn!("entity class {} has cyclic inheritance through {}", name, parent_name);
            let mut diagnostic = Diagnostic::warning(format!(
                "entity class \"{name}\" has cyclic inheritance through \"{parent_name}\""
            ));
            if let Some(file) = file {
                diagnostic = diagnostic.in_file(file);
            }
            self.diagnostics.push(diagnostic);
            return None;
        }

        self.resolve(parent_id);

        let parent = self.classes.get(parent_id)?;
        Some(ParentSnapshot {
            attributes: parent.attributes().iter().cloned().collect(),
            is_light: parent.is_light(),
            colour: parent.colour(),
        })
    }

    /// Walk `inherit` names from `id` up to the root, stopping at the first
    /// repeated or unknown name. Returned root first.
    fn inheritance_chain(&self, id: EntityClassId) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.classes.get(id);

        while let Some(class) = current {
            if chain.iter().any(|seen| seen == class.name()) {
                break;
            }
            chain.push(class.name().to_string());
            current = class
                .parent_name()
                .and_then(|parent| self.names.get(parent))
                .and_then(|parent_id| self.classes.get(*parent_id));
        }

        chain.reverse();
        chain
    }
}

/// What a child takes over from its resolved parent.
struct ParentSnapshot {
    attributes: Vec<crate::attribute::Attribute>,
    is_light: bool,
    colour: Vector4,
}

/// Pick the display colour of a freshly resolved class.
fn resolve_colour(
    class: &EntityClass,
    parent: Option<Vector4>,
    config: &RegistryConfig,
) -> Vector4 {
    if let Some(colour) = config.colour_overrides.get(class.name()) {
        return Vector4::from_rgb(*colour, 1.0);
    }

    let local = class.attribute_value("editor_color", false);
    if !local.is_empty() {
        match Vector3::parse(local) {
            Ok(rgb) => {
                let transparent = class.attribute_value("editor_transparent", true) == "1";
                let alpha = if transparent { TRANSPARENT_ALPHA } else { 1.0 };
                return Vector4::from_rgb(rgb, alpha);
            }
            Err(err) => debug!("ignoring editor_color on {}: {}", class.name(), err),
        }
    }

    parent.unwrap_or_else(|| Vector4::from_rgb(config.default_colour, 1.0))
}

/// Resolves model def inheritance: mesh and skin fall back to the parent,
/// animation tables are merged with the child's entries winning.
pub(crate) struct ModelResolver<'a> {
    pub(crate) models: &'a mut SlotMap<ModelDefId, ModelDef>,
    pub(crate) names: &'a BTreeMap<String, ModelDefId>,
    pub(crate) diagnostics: &'a mut Vec<Diagnostic>,
}

impl ModelResolver<'_> {
    pub(crate) fn resolve(&mut self, id: ModelDefId) {
        let Some(model) = self.models.get_mut(id) else {
            return;
        };
        if model.is_resolved() {
            return;
        }

        // Marked first: a cycle back to this model stops here
        model.set_resolved();

        let Some(parent_name) = model.parent_name().map(str::to_string) else {
            return;
        };
        let name = model.name().to_string();
        let file = source_file(model.source());

        let Some(&parent_id) = self.names.get(&parent_name) else {
            warn!("model {} inherits unknown model {}", name, parent_name);
            let mut diagnostic = Diagnostic::warning(format!(
                "model \"{name}\" inherits unknown model \"{parent_name}\""
            ));
            if let Some(file) = file {
                diagnostic = diagnostic.in_file(file);
            }
            self.diagnostics.push(diagnostic);
            return;
        };

        self.resolve(parent_id);

        let Some(parent) = self.models.get(parent_id).cloned() else {
            return;
        };
        if let Some(model) = self.models.get_mut(id) {
            model.inherit_from(&parent);
        }
    }
}
