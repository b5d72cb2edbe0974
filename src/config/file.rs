use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::input::ButtonFilter;

const FILE_NAME: &str = "pijast.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub pen_device: Option<String>,
    pub touch_device: Option<String>,
    pub interval: Option<f64>,
    pub command: Option<String>,
    pub button: Option<ButtonFilter>,
    pub command_timeout: Option<f64>,
}

pub fn load_from_path(path: &Path) -> Option<FileConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&content) {
        Ok(config) => {
            log::debug!("Loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

pub fn load_from_default_paths() -> Option<FileConfig> {
    for path in default_config_paths() {
        if path.exists() {
            if let Some(config) = load_from_path(&path) {
                return Some(config);
            }
        }
    }
    None
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from(FILE_NAME));

    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config").join(FILE_NAME));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
pen_device = "Surface Pen"
touch_device = "ELAN Touchscreen"
interval = 0.4
command = "notify-send hi"
button = "stylus2"
command_timeout = 3
"#,
        );
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.pen_device.as_deref(), Some("Surface Pen"));
        assert_eq!(config.touch_device.as_deref(), Some("ELAN Touchscreen"));
        assert_eq!(config.interval, Some(0.4));
        assert_eq!(config.command.as_deref(), Some("notify-send hi"));
        assert_eq!(config.button, Some(ButtonFilter::Code(0x14c)));
        assert_eq!(config.command_timeout, Some(3.0));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let file = write_config("pen = \"Surface Pen\"\n");
        assert!(load_from_path(file.path()).is_none());
    }

    #[test]
    fn test_bad_button_is_rejected() {
        let file = write_config("button = \"pencil\"\n");
        assert!(load_from_path(file.path()).is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_from_path(Path::new("/nonexistent/pijast.toml")).is_none());
    }
}
