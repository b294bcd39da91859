use std::path::Path;

use colored::Colorize;

use crate::config::CliConfig;

pub fn run(dir: &Path, config: &CliConfig, name: &str) -> Result<(), String> {
    let registry = super::load_registry(dir, config)?;
    let model = registry.require_model(name).map_err(|e| e.to_string())?;

    println!("  {} [{}]", model.name().bold(), "model".dimmed());
    println!();
    if let Some(parent) = model.parent_name() {
        println!("  inherit: {parent}");
    }
    if let Some(source) = model.source() {
        println!("  source:  {} ({})", source.file, source.mod_name);
    }
    println!("  mesh:    {}", super::or_dash(model.mesh()));
    println!("  skin:    {}", super::or_dash(model.skin()));

    println!();
    if model.anims().is_empty() {
        println!("  {} (none)", "Anims:".dimmed());
    } else {
        println!("  {}", "Anims:".dimmed());
        for (anim, file) in model.anims() {
            println!("    {anim:<12} {file}");
        }
    }

    // Classes that render with this model
    let users: Vec<&str> = registry
        .classes()
        .map(|(_, class)| class)
        .filter(|class| class.attribute_value("model", true) == model.name())
        .map(|class| class.name())
        .collect();
    if !users.is_empty() {
        println!();
        println!("  {} {}", "Used by:".dimmed(), users.join(", "));
    }

    Ok(())
}
