//! Config file discovery.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Where the loaded config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ConfigSource {
    Explicit(PathBuf),
    Local(PathBuf),
    Global(PathBuf),
    BuiltInDefaults,
}

impl ConfigSource {
    /// File a later `save` should write to.
    pub(super) fn save_path<FRoot>(&self, config_root: &FRoot) -> PathBuf
    where
        FRoot: Fn() -> Option<PathBuf>,
    {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::Global(path) => path.clone(),
            Self::BuiltInDefaults => global_config_path(config_root)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        }
    }
}

/// Read config text by precedence: explicit path, `./aide.toml`, global file.
///
/// A missing explicit path is not an error; the store starts empty and the
/// first save creates the file there.
pub(super) fn read_config_text_with_sources<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        return match read_file(&path) {
            Ok(text) => Ok((text, ConfigSource::Explicit(path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok((String::new(), ConfigSource::Explicit(path)))
            }
            Err(e) => Err(e.into()),
        };
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if let Ok(text) = read_file(&local) {
        return Ok((text, ConfigSource::Local(local)));
    }
    if let Some(global) = global_config_path(config_root) {
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

fn global_config_path<FRoot>(config_root: &FRoot) -> Option<PathBuf>
where
    FRoot: Fn() -> Option<PathBuf>,
{
    config_root().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Platform config root, honoring `$XDG_CONFIG_HOME`.
pub(super) fn config_root_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}
