use std::path::Path;

use colored::Colorize;
use ec_core::Visibility;

use crate::config::CliConfig;

pub fn run(dir: &Path, config: &CliConfig, name: &str, local_only: bool) -> Result<(), String> {
    let registry = super::load_registry(dir, config)?;
    let class = registry.require_class(name).map_err(|e| e.to_string())?;

    // Header
    println!("  {} [{}]", class.name().bold(), class.class_type().to_string().dimmed());
    if class.visibility() == Visibility::Hidden {
        println!("  {}", "hidden".dimmed());
    }
    println!();

    println!("  chain:      {}", class.inheritance_chain().join(" -> "));
    if let Some(source) = class.source() {
        println!("  source:     {} ({})", source.file, source.mod_name);
    }
    println!("  light:      {}", class.is_light());
    println!("  fixed size: {}", class.is_fixed_size());
    println!("  colour:     {}", class.colour());
    if let Some(bounds) = class.bounds() {
        println!("  bounds:     ({}) - ({})", bounds.mins, bounds.maxs);
    }
    if !class.model_path().is_empty() {
        println!("  model:      {}", class.model_path());
    }
    if !class.skin().is_empty() {
        println!("  skin:       {}", class.skin());
    }

    let usage = class.usage();
    if !usage.is_empty() {
        println!();
        for line in usage.lines() {
            println!("  {}", line.trim());
        }
    }

    // Attributes
    let attributes: Vec<_> = class
        .attributes()
        .iter()
        .filter(|attr| !(local_only && attr.inherited))
        .collect();
    println!();
    if attributes.is_empty() {
        println!("  {} (none)", "Attributes:".dimmed());
    } else {
        println!("  {}", "Attributes:".dimmed());
        for attr in attributes {
            let marker = if attr.inherited {
                " (inherited)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("    {} [{}] = \"{}\"{marker}", attr.name, attr.kind, attr.value);
            if !attr.description.is_empty() {
                println!("      {}", attr.description.dimmed());
            }
        }
    }

    if !class.attachments().is_empty() {
        println!();
        println!("  {}", "Attachments:".dimmed());
        for attachment in class.attachments().objects() {
            println!(
                "    {} ({}) at {}",
                attachment.name, attachment.class_name, attachment.position
            );
        }
    }

    Ok(())
}
