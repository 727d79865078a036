//! Configuration for the fir command-line tool
//!
//! Centralizes tool-level settings and provides validation.

use crate::{error::FirError, utils::env::EnvUtils};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program name shown in usage lines
    pub program: String,
    /// Tool version reported by `fir version`
    pub version: String,
    /// Environment variable that switches on debug mode
    pub debug_env: String,
    /// Command line run by `fir upgrade`
    pub upgrade_command: Vec<String>,
    /// Xcode build tool
    pub xcodebuild: String,
    /// Xcode helper used to package `.app` bundles
    pub xcrun: String,
    /// Gradle executable used when the project has no wrapper
    pub gradle: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: "fir".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug_env: "DEBUG".to_string(),
            upgrade_command: vec![
                "cargo".to_string(),
                "install".to_string(),
                "fir-cli".to_string(),
            ],
            xcodebuild: "xcodebuild".to_string(),
            xcrun: "xcrun".to_string(),
            gradle: "gradle".to_string(),
        }
    }
}

impl Config {
    /// Create configuration from defaults and `FIR_*` environment overrides
    pub fn from_env() -> Result<Self, FirError> {
        let mut config = Self::default();

        if let Some(xcodebuild) = EnvUtils::get_var("FIR_XCODEBUILD") {
            config.xcodebuild = xcodebuild;
        }
        if let Some(gradle) = EnvUtils::get_var("FIR_GRADLE") {
            config.gradle = gradle;
        }
        if let Some(upgrade) = EnvUtils::get_var("FIR_UPGRADE_COMMAND") {
            config.upgrade_command = upgrade.split_whitespace().map(str::to_string).collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), FirError> {
        if self.upgrade_command.is_empty() {
            return Err(FirError::validation("Upgrade command must not be empty"));
        }

        for (name, value) in [
            ("xcodebuild", &self.xcodebuild),
            ("xcrun", &self.xcrun),
            ("gradle", &self.gradle),
        ] {
            if value.trim().is_empty() {
                return Err(FirError::validation(format!(
                    "Executable for {name} must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Split the upgrade command into program and arguments
    pub fn get_upgrade_cmd(&self) -> (&str, Vec<&str>) {
        let mut parts = self.upgrade_command.iter().map(String::as_str);
        let program = parts.next().unwrap_or_default();
        (program, parts.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.program, "fir");
        assert_eq!(config.debug_env, "DEBUG");
    }

    #[test]
    fn test_empty_upgrade_command_rejected() {
        let config = Config {
            upgrade_command: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(FirError::Validation { .. })));
    }

    #[test]
    fn test_get_upgrade_cmd() {
        let config = Config::default();
        let (program, args) = config.get_upgrade_cmd();
        assert_eq!(program, "cargo");
        assert_eq!(args, vec!["install", "fir-cli"]);
    }
}
