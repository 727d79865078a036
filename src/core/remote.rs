//! The seam to the remote distribution service
//!
//! Publishing, login, identity lookup, mapping upload and package inspection
//! are performed by a [`DistributionService`]. This module assembles the
//! requests from resolved options; the service does the network work.

use crate::{
    cli::args::{ResolvedOptions, TOKEN},
    error::FirError,
};
use std::path::{Path, PathBuf};

/// Upload of a built package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub file: PathBuf,
    pub token: Option<String>,
    pub short: Option<String>,
    pub changelog: Option<String>,
    pub mapping_file: Option<PathBuf>,
    pub project: Option<String>,
}

impl PublishRequest {
    /// Build a request for `file` from `short`, `changelog`, `mappingfile`,
    /// `proj` and the global token
    pub fn from_options(file: impl Into<PathBuf>, options: &ResolvedOptions) -> Self {
        Self {
            file: file.into(),
            token: owned(options, TOKEN),
            short: owned(options, "short"),
            changelog: owned(options, "changelog"),
            mapping_file: options.string("mappingfile").map(PathBuf::from),
            project: owned(options, "proj"),
        }
    }
}

/// Upload of a symbol/mapping file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRequest {
    pub file: PathBuf,
    pub token: Option<String>,
    pub project: Option<String>,
    pub version: Option<String>,
    pub build: Option<String>,
}

impl MappingRequest {
    pub fn from_options(file: impl Into<PathBuf>, options: &ResolvedOptions) -> Self {
        Self {
            file: file.into(),
            token: owned(options, TOKEN),
            project: owned(options, "proj"),
            version: owned(options, "version"),
            build: owned(options, "build"),
        }
    }
}

fn owned(options: &ResolvedOptions, key: &str) -> Option<String> {
    options.string(key).map(str::to_string)
}

/// Operations served by the remote distribution service
pub trait DistributionService {
    fn publish(&self, request: &PublishRequest) -> anyhow::Result<()>;

    fn login(&self, token: &str) -> anyhow::Result<()>;

    /// Show the identity behind `token` (or the stored credential)
    fn me(&self, token: Option<&str>) -> anyhow::Result<()>;

    fn upload_mapping(&self, request: &MappingRequest) -> anyhow::Result<()>;

    /// Describe a package file; `all` asks for every field
    fn inspect(&self, file: &Path, all: bool) -> anyhow::Result<()>;
}

/// Service used when no client is linked in; every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineService;

impl DistributionService for OfflineService {
    fn publish(&self, request: &PublishRequest) -> anyhow::Result<()> {
        Err(FirError::unavailable(format!("publish {}", request.file.display())).into())
    }

    fn login(&self, _token: &str) -> anyhow::Result<()> {
        Err(FirError::unavailable("login").into())
    }

    fn me(&self, _token: Option<&str>) -> anyhow::Result<()> {
        Err(FirError::unavailable("me").into())
    }

    fn upload_mapping(&self, request: &MappingRequest) -> anyhow::Result<()> {
        Err(FirError::unavailable(format!("mapping {}", request.file.display())).into())
    }

    fn inspect(&self, file: &Path, _all: bool) -> anyhow::Result<()> {
        Err(FirError::unavailable(format!("info {}", file.display())).into())
    }
}

/// Pick the login token: `--token`, then the first argument, then `prompt`
pub fn resolve_login_token(
    options: &ResolvedOptions,
    positional: &[String],
    prompt: impl FnOnce() -> std::io::Result<String>,
) -> anyhow::Result<String> {
    let token = match options.string(TOKEN).or(positional.first().map(String::as_str)) {
        Some(token) => token.to_string(),
        None => prompt()?,
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(FirError::validation("API token must not be empty").into());
    }
    Ok(token.to_string())
}
