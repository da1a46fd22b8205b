//! Platform-specific location of the configuration file
//!
//! Follows the XDG Base Directory specification on Unix-like systems.
use std::path::PathBuf;

/// Directory name used under the platform config directory
const APP_DIR: &str = "org-crawler";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        Self::config_dir_from(|key| std::env::var(key).ok())
    }

    fn config_dir_from<F>(lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = || lookup("HOME").map(PathBuf::from);

        let dir = if cfg!(target_os = "windows") {
            lookup("APPDATA").map(PathBuf::from)
        } else if cfg!(target_os = "macos") {
            home().map(|h| h.join("Library/Application Support"))
        } else {
            lookup("XDG_CONFIG_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .or_else(|| home().map(|h| h.join(".config")))
        };

        dir.unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get default config file path
    ///
    /// Returns: {config_dir}/org-crawler/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join(APP_DIR).join("config.toml")
    }
}
