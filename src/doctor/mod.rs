//! Claude Desktop configuration discovery and repair.
//!
//! The desktop application reads `claude_desktop_config.json` from a
//! platform-specific location and launches every server listed under its
//! `mcpServers` mapping. This module enumerates the candidate locations,
//! inspects whatever is found there, and can write a fresh config that
//! registers this server.
//!
//! Unknown fields in the desktop config belong to the application, not to
//! us, so parsing preserves them instead of rejecting them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DoctorError;

/// File name of the desktop application's configuration file.
pub const DESKTOP_CONFIG_FILE: &str = "claude_desktop_config.json";

/// One entry under `mcpServers`: how the desktop app launches a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Command to execute.
    pub command: String,

    /// Arguments passed to the command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Fields we don't interpret (env, cwd, ...), passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The desktop application's configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesktopConfig {
    /// Registered MCP servers, by name.
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, ServerEntry>,

    /// Fields we don't interpret, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What was found at one candidate config path.
#[derive(Debug)]
pub enum ConfigStatus {
    /// No file at this path.
    Missing,
    /// The file exists but could not be read.
    Unreadable(std::io::Error),
    /// The file exists but is not valid JSON.
    InvalidJson(serde_json::Error),
    /// The file parsed; servers may still be absent.
    Parsed(DesktopConfig),
}

/// Inspection result for one candidate path.
#[derive(Debug)]
pub struct ConfigReport {
    /// The candidate path.
    pub path: PathBuf,
    /// What was found there.
    pub status: ConfigStatus,
}

impl ConfigReport {
    /// Returns `true` if a parseable config file exists at this path.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.status, ConfigStatus::Parsed(_))
    }
}

/// Returns the ordered candidate paths for the desktop config file on the
/// current platform.
///
/// - **Windows:** `%APPDATA%\Claude\`, `%LOCALAPPDATA%\Claude\`,
///   `%APPDATA%\Anthropic\Claude\`
/// - **macOS:** `~/Library/Application Support/Claude/`,
///   `~/Library/Application Support/Anthropic/Claude/`
/// - **Linux:** `~/.config/claude/`, `~/.config/anthropic/claude/`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined on a
/// Unix-like platform.
pub fn candidate_config_paths() -> Result<Vec<PathBuf>, DoctorError> {
    candidate_paths_for(std::env::consts::OS)
}

/// Candidate paths for a given platform identifier (`std::env::consts::OS`
/// values). Split out from [`candidate_config_paths`] so every branch is
/// testable on any host.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined on a
/// Unix-like platform.
pub fn candidate_paths_for(os: &str) -> Result<Vec<PathBuf>, DoctorError> {
    let mut paths = Vec::new();

    if os == "windows" {
        let appdata = std::env::var_os("APPDATA").map(PathBuf::from);
        let localappdata = std::env::var_os("LOCALAPPDATA").map(PathBuf::from);

        if let Some(appdata) = &appdata {
            paths.push(appdata.join("Claude").join(DESKTOP_CONFIG_FILE));
        }
        if let Some(localappdata) = &localappdata {
            paths.push(localappdata.join("Claude").join(DESKTOP_CONFIG_FILE));
        }
        if let Some(appdata) = &appdata {
            paths.push(
                appdata
                    .join("Anthropic")
                    .join("Claude")
                    .join(DESKTOP_CONFIG_FILE),
            );
        }
        return Ok(paths);
    }

    let home = dirs::home_dir().ok_or(DoctorError::NoHomeDir)?;

    if os == "macos" {
        let app_support = home.join("Library").join("Application Support");
        paths.push(app_support.join("Claude").join(DESKTOP_CONFIG_FILE));
        paths.push(
            app_support
                .join("Anthropic")
                .join("Claude")
                .join(DESKTOP_CONFIG_FILE),
        );
    } else {
        let config = home.join(".config");
        paths.push(config.join("claude").join(DESKTOP_CONFIG_FILE));
        paths.push(
            config
                .join("anthropic")
                .join("claude")
                .join(DESKTOP_CONFIG_FILE),
        );
    }

    Ok(paths)
}

/// Inspects one candidate path. Read and parse failures are folded into
/// the report rather than returned as errors, so a scan over all
/// candidates always completes.
#[must_use]
pub fn inspect(path: &Path) -> ConfigReport {
    let status = if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<DesktopConfig>(&contents) {
                Ok(config) => ConfigStatus::Parsed(config),
                Err(e) => ConfigStatus::InvalidJson(e),
            },
            Err(e) => ConfigStatus::Unreadable(e),
        }
    } else {
        ConfigStatus::Missing
    };

    ConfigReport {
        path: path.to_path_buf(),
        status,
    }
}

/// Inspects every candidate path on the current platform.
///
/// # Errors
///
/// Returns an error if the candidate paths cannot be determined.
pub fn scan() -> Result<Vec<ConfigReport>, DoctorError> {
    let paths = candidate_config_paths()?;
    Ok(paths.iter().map(|p| inspect(p)).collect())
}

/// Writes a fresh desktop config at `path` registering a single server.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the directories cannot be created or the file
/// cannot be written.
pub fn write_default(
    path: &Path,
    entry_name: &str,
    command: &str,
    args: &[String],
) -> Result<DesktopConfig, DoctorError> {
    let mut config = DesktopConfig::default();
    config.mcp_servers.insert(
        entry_name.to_string(),
        ServerEntry {
            command: command.to_string(),
            args: args.to_vec(),
            extra: Map::new(),
        },
    );

    let io_err = |source| DoctorError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(&config).map_err(|e| DoctorError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(io_err)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_candidates() {
        let paths = candidate_paths_for("linux").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with(".config/claude/claude_desktop_config.json"));
        assert!(paths[1].ends_with(".config/anthropic/claude/claude_desktop_config.json"));
    }

    #[test]
    fn macos_candidates() {
        let paths = candidate_paths_for("macos").unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("Library/Application Support/Claude/claude_desktop_config.json"));
    }

    #[test]
    fn current_platform_has_candidates() {
        // Windows without APPDATA set is the only empty case.
        let paths = candidate_config_paths().unwrap();
        if std::env::consts::OS != "windows" {
            assert!(!paths.is_empty());
        }
        for path in paths {
            assert!(path.ends_with(DESKTOP_CONFIG_FILE));
        }
    }

    #[test]
    fn inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = inspect(&dir.path().join(DESKTOP_CONFIG_FILE));
        assert!(matches!(report.status, ConfigStatus::Missing));
        assert!(!report.is_valid());
    }

    #[test]
    fn inspect_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESKTOP_CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let report = inspect(&path);
        assert!(matches!(report.status, ConfigStatus::InvalidJson(_)));
    }

    #[test]
    fn inspect_parses_servers_and_preserves_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DESKTOP_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "mcpServers": {
                    "my-time-server": {
                        "command": "python",
                        "args": ["/home/me/server.py"],
                        "env": {"PYTHONUNBUFFERED": "1"}
                    }
                },
                "theme": "dark"
            }"#,
        )
        .unwrap();

        let report = inspect(&path);
        let ConfigStatus::Parsed(config) = report.status else {
            panic!("expected parsed config");
        };
        let entry = &config.mcp_servers["my-time-server"];
        assert_eq!(entry.command, "python");
        assert_eq!(entry.args, vec!["/home/me/server.py".to_string()]);
        assert!(entry.extra.contains_key("env"));
        assert!(config.extra.contains_key("theme"));
    }

    #[test]
    fn write_default_round_trips_through_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DESKTOP_CONFIG_FILE);

        write_default(&path, "toolbox-mcp", "/usr/local/bin/toolbox-mcp", &[]).unwrap();

        let report = inspect(&path);
        let ConfigStatus::Parsed(config) = report.status else {
            panic!("expected parsed config");
        };
        assert_eq!(config.mcp_servers.len(), 1);
        assert_eq!(
            config.mcp_servers["toolbox-mcp"].command,
            "/usr/local/bin/toolbox-mcp"
        );
    }
}
