use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE, DATA_DIR};

const CONFIG_TEMPLATE: &str = include_str!("../../templates/config.toml");

/// Create `.habits/` under `base` with a commented config.toml. The store file
/// is created lazily on the first write.
pub fn cmd_init(args: InitArgs, base: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = base.join(DATA_DIR);
    let config_path = data_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err(format!(
            "already initialized: {} (use --force to reset the config)",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = base.parent()
        && let Ok(outer) = config_io::discover_data_dir(parent)
    {
        eprintln!("Note: habits found further up at {}/", outer.display());
        eprintln!("Creating a separate {}/ here", DATA_DIR);
    }

    fs::create_dir_all(&data_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    log::debug!("wrote {}", config_path.display());

    println!("Initialized {}", data_dir.display());
    Ok(())
}
