//! Persisted `docpub.yaml` config.
//!
//! # Storage layout
//!
//! ```text
//! <project>/
//!   docpub.yaml          (config + tracked metadata, mode 0600, holds credentials)
//!   docs/**/*.md         (sources, relative to the config directory)
//!   target/docpub/       (converted artifacts, `output`)
//! ```
//!
//! # API pattern
//!
//! Functions take the config *file* path explicitly; relative paths inside the
//! config (`roots`, `output`, `sourcePath`) resolve against its parent
//! directory via [`base_dir`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ConfigError};
use crate::types::{Config, RemoteConfig};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "docpub.yaml";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<dir>/docpub.yaml`: pure, no I/O.
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Directory relative config paths resolve against.
pub fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Structural checks that do not depend on the adapter.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.remote.adapter.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "remote.adapter".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if config.remote.timeout == Some(0) {
        return Err(ConfigError::Invalid {
            field: "remote.timeout".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    if let Some(doc) = config.metadata.iter().find(|m| m.source_path.is_absolute()) {
        return Err(ConfigError::Invalid {
            field: "metadata.sourcePath".to_string(),
            reason: format!("{} must be relative", doc.source_path.display()),
        });
    }
    let mut seen = HashSet::new();
    if let Some(doc) = config.metadata.iter().find(|m| !seen.insert(m.key())) {
        return Err(ConfigError::Invalid {
            field: "metadata".to_string(),
            reason: format!("{} is tracked more than once", doc.key()),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem, no EXDEV).
pub fn save_at(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = base_dir(path);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }
    let tmp_path = tmp_path_for(path);

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// `<path>.tmp` sibling used by [`save_at`].
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    path.with_file_name(format!("{name}.tmp"))
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Scaffold a config at `path` for the given remote settings.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(path: &Path, remote: RemoteConfig) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_at(path);
    }
    let config = Config {
        remote,
        ..Config::default()
    };
    save_at(path, &config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
