use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use crate::config::CliConfig;

pub fn run(dir: &Path, config: &CliConfig) -> Result<(), String> {
    let registry = super::load_registry(dir, config)?;

    if registry.model_count() == 0 {
        println!("  No models found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Parent", "Mesh", "Anims"]);

    registry.for_each_model(|model| {
        table.add_row(vec![
            model.name().to_string(),
            super::or_dash(model.parent_name().unwrap_or_default()).to_string(),
            super::or_dash(model.mesh()).to_string(),
            model.anims().len().to_string(),
        ]);
    });

    println!("{table}");
    println!();
    println!("  {} models", registry.model_count());

    Ok(())
}
