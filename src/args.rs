//! Command-line options shared by both binaries.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Args;
use sheetwise_core::{Config, Group};

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// TOML file mapping dataset groups to files
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding sales.csv, employees.csv, ... and their *_resolved copies
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Only load this group (sales, employees, bonus, orders); can be repeated
    #[arg(long = "group", value_name = "NAME", value_parser = parse_group)]
    pub groups: Vec<Group>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl DataArgs {
    /// Pick the dataset configuration: `--config`, then `--data-dir`, then
    /// the user config file when it exists, then `./data`.
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, &self.data_dir) {
            (Some(path), _) => load(path)?,
            (None, Some(dir)) => Config::from_data_dir(dir),
            (None, None) => match Config::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::info!(path = %path.display(), "using user config");
                    load(&path)?
                }
                None => Config::from_data_dir(Path::new(DEFAULT_DATA_DIR)),
            },
        };
        config.retain_groups(&self.groups);
        Ok(config)
    }
}

fn load(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("loading {}", path.display()))
}

fn parse_group(s: &str) -> Result<Group, String> {
    Group::from_str(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_and_group_filter() {
        let args = DataArgs {
            data_dir: Some(PathBuf::from("somewhere")),
            groups: vec![Group::Orders],
            ..DataArgs::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.groups().collect::<Vec<_>>(), vec![Group::Orders]);
        assert_eq!(
            config.paths(Group::Orders).unwrap().raw,
            Path::new("somewhere/orders.csv")
        );
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = DataArgs {
            config: Some(std::env::temp_dir().join("sheetwise_no_such_config.toml")),
            ..DataArgs::default()
        };
        let err = args.to_config().unwrap_err();
        assert!(format!("{err:#}").contains("File not found"));
    }

    #[test]
    fn test_parse_group_accepts_aliases() {
        assert_eq!(parse_group("employee-bonus"), Ok(Group::Bonus));
        assert!(parse_group("inventory").is_err());
    }
}
