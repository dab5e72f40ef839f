//! Where each dataset lives.
//!
//! The default layout is a single data directory holding `<stem>.csv` and
//! `<stem>_resolved.csv` per group. A TOML file can point groups anywhere:
//!
//! ```toml
//! [datasets.sales]
//! raw = "sales.xlsx"
//! resolved = "sales_resolved.xlsx"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::dataset::Group;
use crate::error::{Result, SheetwiseError};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetPaths {
    pub raw: PathBuf,
    pub resolved: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub datasets: BTreeMap<Group, DatasetPaths>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    datasets: Option<HashMap<String, DatasetFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetFile {
    raw: PathBuf,
    resolved: Option<PathBuf>,
}

impl Config {
    /// Every group, with the standard file names under `dir`.
    pub fn from_data_dir(dir: &Path) -> Config {
        let datasets = Group::ALL
            .iter()
            .map(|&group| {
                let paths = DatasetPaths {
                    raw: dir.join(group.raw_file_name()),
                    resolved: Some(dir.join(group.resolved_file_name())),
                };
                (group, paths)
            })
            .collect();
        Config { datasets }
    }

    /// Read a TOML config file. Relative paths are taken from the file's
    /// own directory.
    pub fn load(path: &Path) -> Result<Config> {
        let meta = std::fs::metadata(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SheetwiseError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SheetwiseError::Io(err)
            }
        })?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(SheetwiseError::Config(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Config::parse(&content, base)
            .map_err(|e| SheetwiseError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(content: &str, base: &Path) -> std::result::Result<Config, String> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| e.to_string())?;
        let data_dir = file.data_dir.map(|d| resolve(base, &d));

        // An explicit data_dir fills in every group, then [datasets] overrides.
        let mut config = match &data_dir {
            Some(dir) => Config::from_data_dir(dir),
            None => Config::default(),
        };
        for (name, entry) in file.datasets.unwrap_or_default() {
            let group = Group::from_str(&name).map_err(|e| e.to_string())?;
            config.datasets.insert(
                group,
                DatasetPaths {
                    raw: resolve(base, &entry.raw),
                    resolved: entry.resolved.map(|r| resolve(base, &r)),
                },
            );
        }
        if config.datasets.is_empty() {
            return Err("no datasets configured".to_string());
        }
        Ok(config)
    }

    /// `<config dir>/sheetwise/config.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("", "", "sheetwise")?;
        let mut path = proj.config_dir().to_path_buf();
        path.push("config.toml");
        Some(path)
    }

    pub fn paths(&self, group: Group) -> Option<&DatasetPaths> {
        self.datasets.get(&group)
    }

    /// Keep only the listed groups. An empty list keeps everything.
    pub fn retain_groups(&mut self, groups: &[Group]) {
        if groups.is_empty() {
            return;
        }
        self.datasets.retain(|g, _| groups.contains(g));
    }

    pub fn groups(&self) -> impl Iterator<Item = Group> + '_ {
        self.datasets.keys().copied()
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cleanup(PathBuf);

    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn temp_config(name: &str, content: &str) -> Cleanup {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).expect("write temp config");
        Cleanup(path)
    }

    #[test]
    fn test_from_data_dir_covers_every_group() {
        let config = Config::from_data_dir(Path::new("data"));
        assert_eq!(config.datasets.len(), 4);
        let bonus = config.paths(Group::Bonus).unwrap();
        assert_eq!(bonus.raw, Path::new("data/employee_bonus.csv"));
        assert_eq!(
            bonus.resolved.as_deref(),
            Some(Path::new("data/employee_bonus_resolved.csv"))
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let content = r#"
[datasets.sales]
raw = "in/sales.xlsx"

[datasets.orders]
raw = "/abs/orders.csv"
resolved = "orders_resolved.csv"
"#;
        let config = Config::parse(content, Path::new("/etc/sheetwise")).unwrap();
        assert_eq!(config.datasets.len(), 2);
        let sales = config.paths(Group::Sales).unwrap();
        assert_eq!(sales.raw, Path::new("/etc/sheetwise/in/sales.xlsx"));
        assert_eq!(sales.resolved, None);
        let orders = config.paths(Group::Orders).unwrap();
        assert_eq!(orders.raw, Path::new("/abs/orders.csv"));
        assert_eq!(
            orders.resolved.as_deref(),
            Some(Path::new("/etc/sheetwise/orders_resolved.csv"))
        );
    }

    #[test]
    fn test_data_dir_then_override() {
        let content = r#"
data_dir = "shared"

[datasets.bonus]
raw = "bonus_v2.csv"
"#;
        let config = Config::parse(content, Path::new("/cfg")).unwrap();
        assert_eq!(config.datasets.len(), 4);
        assert_eq!(
            config.paths(Group::Sales).unwrap().raw,
            Path::new("/cfg/shared/sales.csv")
        );
        assert_eq!(
            config.paths(Group::Bonus).unwrap().raw,
            Path::new("/cfg/bonus_v2.csv")
        );
    }

    #[test]
    fn test_rejects_unknown_fields_and_groups() {
        let err = Config::parse("[datasets.sales]\nraw = \"a\"\ncolour = 1\n", Path::new("."))
            .unwrap_err();
        assert!(err.contains("colour"), "{err}");
        let err = Config::parse("[datasets.inventory]\nraw = \"a\"\n", Path::new(".")).unwrap_err();
        assert!(err.contains("inventory"), "{err}");
        assert!(Config::parse("", Path::new(".")).is_err());
    }

    #[test]
    fn test_load_rejects_oversized_file() {
        let oversized = "#".repeat(MAX_CONFIG_FILE_BYTES as usize + 1);
        let file = temp_config("sheetwise_config_large.toml", &oversized);
        let err = Config::load(&file.0).unwrap_err();
        assert!(err.to_string().contains("file too large"));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("sheetwise_config_missing.toml");
        assert!(matches!(
            Config::load(&path),
            Err(SheetwiseError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_reads_file() {
        let file = temp_config(
            "sheetwise_config_ok.toml",
            "[datasets.employees]\nraw = \"employees.csv\"\n",
        );
        let config = Config::load(&file.0).unwrap();
        let expected = std::env::temp_dir().join("employees.csv");
        assert_eq!(config.paths(Group::Employees).unwrap().raw, expected);
    }

    #[test]
    fn test_retain_groups() {
        let mut config = Config::from_data_dir(Path::new("d"));
        config.retain_groups(&[Group::Orders, Group::Sales]);
        assert_eq!(
            config.groups().collect::<Vec<_>>(),
            vec![Group::Sales, Group::Orders]
        );
        config.retain_groups(&[]);
        assert_eq!(config.datasets.len(), 2);
    }
}
