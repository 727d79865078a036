//! Command alias resolution
//!
//! Exact, case-sensitive lookup from a command token to a canonical command
//! name. Each token is bound to at most one command.

use crate::error::{FirError, Result};
use std::collections::HashMap;

/// Canonical name of the built-in help command
pub const HELP_COMMAND: &str = "help";

/// Conventional spellings of a help request, bound to [`HELP_COMMAND`]
pub const HELP_MAPPINGS: &[&str] = &["-h", "-?", "--help", "-D"];

/// Token to canonical command name table
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    bindings: HashMap<&'static str, &'static str>,
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` to `command`.
    ///
    /// Rebinding a token to the same command is a no-op; binding it to a
    /// different command is an error.
    pub fn bind(&mut self, token: &'static str, command: &'static str) -> Result<()> {
        match self.bindings.get(token) {
            Some(existing) if *existing != command => Err(FirError::registry(format!(
                "alias \"{token}\" is already bound to \"{existing}\", cannot bind it to \"{command}\""
            ))),
            _ => {
                self.bindings.insert(token, command);
                Ok(())
            }
        }
    }

    /// Resolve a command token. No token at all means help.
    pub fn resolve(&self, token: Option<&str>) -> Option<&'static str> {
        match token {
            None => Some(HELP_COMMAND),
            Some(token) => self.bindings.get(token).copied(),
        }
    }
}
