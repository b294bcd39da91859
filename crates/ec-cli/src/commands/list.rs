use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use ec_core::{ClassType, Visibility};

use crate::config::CliConfig;

pub fn run(
    dir: &Path,
    config: &CliConfig,
    class_type: Option<&str>,
    include_hidden: bool,
) -> Result<(), String> {
    let filter = class_type
        .map(|s| ClassType::parse(s).ok_or_else(|| format!("unknown class type: \"{s}\"")))
        .transpose()?;

    let registry = super::load_registry(dir, config)?;

    let classes: Vec<_> = registry
        .classes()
        .map(|(_, class)| class)
        .filter(|class| include_hidden || class.visibility() == Visibility::Normal)
        .filter(|class| filter.is_none_or(|t| class.class_type() == t))
        .collect();

    if classes.is_empty() {
        println!("  No entity classes found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["Name", "Type", "Parent"];
    if include_hidden {
        header.push("Visibility");
    }
    table.set_header(header);

    for class in &classes {
        let mut row = vec![
            class.name().to_string(),
            class.class_type().to_string(),
            super::or_dash(class.parent_name().unwrap_or_default()).to_string(),
        ];
        if include_hidden {
            row.push(class.visibility().to_string());
        }
        table.add_row(row);
    }

    println!("{table}");
    println!();
    println!("  {} entity classes", classes.len());

    Ok(())
}
