use std::collections::BTreeMap;
use std::path::Path;

use ec_core::{ClassType, Visibility};

use crate::config::CliConfig;

pub fn run(dir: &Path, config: &CliConfig) -> Result<(), String> {
    let registry = super::load_registry(dir, config)?;

    let mut per_type: BTreeMap<ClassType, usize> = BTreeMap::new();
    let mut hidden = 0;
    registry.for_each_class(|class| {
        *per_type.entry(class.class_type()).or_default() += 1;
        if class.visibility() == Visibility::Hidden {
            hidden += 1;
        }
    });

    println!("  All checks passed for '{}'.", dir.display());
    println!(
        "  {} entity classes ({} hidden), {} models",
        registry.class_count(),
        hidden,
        registry.model_count()
    );
    for class_type in ClassType::ALL {
        let count = per_type.get(&class_type).copied().unwrap_or(0);
        if count > 0 {
            let name = class_type.to_string();
            println!("    {name:<8} {count}");
        }
    }

    Ok(())
}
