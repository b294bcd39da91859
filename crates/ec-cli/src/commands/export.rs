use std::path::Path;

use ec_core::attachments::Attachments;
use ec_core::{
    Aabb, AttributeTable, ClassType, DeclarationRegistry, EntityClass, SourceInfo, Vector4,
    Visibility,
};
use serde::Serialize;

use crate::config::CliConfig;

pub fn run(dir: &Path, config: &CliConfig, output: Option<&Path>) -> Result<(), String> {
    let registry = super::load_registry(dir, config)?;
    let content = export_json(&registry)?;

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}

/// Resolved view of one entity class.
#[derive(Serialize)]
struct ClassExport<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    class_type: ClassType,
    visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    inherit: Option<&'a str>,
    inheritance_chain: &'a [String],
    light: bool,
    fixed_size: bool,
    colour: Vector4,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<Aabb>,
    #[serde(skip_serializing_if = "is_empty_str")]
    model: &'a str,
    #[serde(skip_serializing_if = "is_empty_str")]
    skin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a SourceInfo>,
    attributes: &'a AttributeTable,
    #[serde(skip_serializing_if = "has_no_attachments")]
    attachments: &'a Attachments,
}

impl<'a> From<&'a EntityClass> for ClassExport<'a> {
    fn from(class: &'a EntityClass) -> Self {
        Self {
            name: class.name(),
            class_type: class.class_type(),
            visibility: class.visibility(),
            inherit: class.parent_name(),
            inheritance_chain: class.inheritance_chain(),
            light: class.is_light(),
            fixed_size: class.is_fixed_size(),
            colour: class.colour(),
            bounds: class.bounds(),
            model: class.model_path(),
            skin: class.skin(),
            source: class.source(),
            attributes: class.attributes(),
            attachments: class.attachments(),
        }
    }
}

fn is_empty_str(value: &&str) -> bool {
    value.is_empty()
}

fn has_no_attachments(attachments: &&Attachments) -> bool {
    attachments.is_empty()
}

fn export_json(registry: &DeclarationRegistry) -> Result<String, String> {
    let classes: Vec<ClassExport<'_>> = registry
        .classes()
        .map(|(_, class)| ClassExport::from(class))
        .collect();
    let models: Vec<_> = registry.models().map(|(_, model)| model).collect();

    let export = serde_json::json!({
        "classes": classes,
        "models": models,
    });

    serde_json::to_string_pretty(&export).map_err(|e| format!("JSON serialization error: {e}"))
}
