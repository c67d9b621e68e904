use crate::config::AnalysisConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open config file '{}'", config_path.display()))?;

    // An empty file parses as null; treat it as all defaults
    let value: serde_yaml::Value = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse YAML in '{}'", config_path.display()))?;
    let config: AnalysisConfig = if value.is_null() {
        AnalysisConfig::default()
    } else {
        serde_yaml::from_value(value)
            .wrap_err_with(|| format!("Invalid configuration in '{}'", config_path.display()))?
    };

    config.validate()?;

    Ok(config)
}

/// Load the file when one is given, otherwise fall back to defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<AnalysisConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given; using defaults");
            Ok(AnalysisConfig::default())
        }
    }
}
