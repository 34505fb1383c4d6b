use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::CONFIG_FILENAME;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section for debind.
    pub debind: DebindConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for debind.
pub struct DebindConfig {
    /// List of folders to exclude from the source walk.
    pub exclude_folders: Option<Vec<String>>,
    /// Fully qualified replacement listener class. When set, the
    /// project-wide search is skipped entirely.
    pub listener_class: Option<String>,
    /// Whether to print per-file diagnostics by default.
    pub verbose: Option<bool>,
}

impl Config {
    /// Loads configuration from the default location (.debind.toml in the
    /// current directory or any parent).
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let debind_toml = current.join(CONFIG_FILENAME);
            if debind_toml.exists() {
                if let Ok(content) = fs::read_to_string(&debind_toml) {
                    if let Ok(mut config) = toml::from_str::<Config>(&content) {
                        config.config_file_path = Some(debind_toml);
                        return config;
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_path_no_config() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_path(dir.path());
        assert!(config.debind.exclude_folders.is_none());
        assert!(config.debind.listener_class.is_none());
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_from_path_debind_toml() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(".debind.toml")).unwrap();
        writeln!(
            file,
            r#"[debind]
exclude_folders = ["build"]
listener_class = "com.example.ui.DebouncingOnClickListener"
"#
        )
        .unwrap();

        let config = Config::load_from_path(dir.path());
        assert_eq!(
            config.debind.exclude_folders,
            Some(vec!["build".to_owned()])
        );
        assert_eq!(
            config.debind.listener_class.as_deref(),
            Some("com.example.ui.DebouncingOnClickListener")
        );
        assert!(config.config_file_path.is_some());
    }

    #[test]
    fn test_load_from_path_traverses_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("app").join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let mut file = std::fs::File::create(dir.path().join(".debind.toml")).unwrap();
        writeln!(
            file,
            r"[debind]
verbose = true
"
        )
        .unwrap();

        let config = Config::load_from_path(&nested);
        assert_eq!(config.debind.verbose, Some(true));
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(".debind.toml")).unwrap();
        writeln!(
            file,
            r#"[debind]
exclude_folders = ["generated"]
"#
        )
        .unwrap();

        let java_file = dir.path().join("Main.java");
        std::fs::write(&java_file, "public class Main {}").unwrap();

        let config = Config::load_from_path(&java_file);
        assert_eq!(
            config.debind.exclude_folders,
            Some(vec!["generated".to_owned()])
        );
    }
}
