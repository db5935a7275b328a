use clap::Subcommand;
use pomonote_core::Config;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.pomo", "logging.enabled")
        key: String,
        /// Config file to use instead of the default
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
        /// Config file to use instead of the default
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List all config values
    List {
        /// Config file to use instead of the default
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Reset config to defaults
    Reset {
        /// Config file to use instead of the default
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the config file location
    Path,
}

/// Load from `file`, or from the default location.
pub fn load(file: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let cfg = match file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(cfg)
}

fn save(config: &Config, file: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match file {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key, file } => {
            let config = load(file.as_ref())?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value, file } => {
            let mut config = load(file.as_ref())?;
            config.set(&key, &value)?;
            save(&config, file.as_ref())?;
            println!("ok");
        }
        ConfigAction::List { file } => {
            let config = load(file.as_ref())?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset { file } => {
            save(&Config::default(), file.as_ref())?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
