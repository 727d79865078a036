//! The pre-execution guard run before every command body

use crate::{
    cli::{args::HELP, args::ResolvedOptions, commands::CommandDescriptor, help::HelpRenderer},
    utils::env::EnvUtils,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Whether debug mode was switched on by the environment
pub fn debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

/// Outcome of [`InvocationGuard::prepare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Run the command body
    Proceed,
    /// Stop successfully without running the command; carries the help text
    Halted { help: String },
}

/// Intercepts help requests and applies the debug toggle
#[derive(Debug, Clone, Copy)]
pub struct InvocationGuard<'a> {
    help: HelpRenderer<'a>,
    debug_env: &'a str,
}

impl<'a> InvocationGuard<'a> {
    pub const fn new(help: HelpRenderer<'a>, debug_env: &'a str) -> Self {
        Self { help, debug_env }
    }

    pub fn prepare(&self, command: &CommandDescriptor, options: &ResolvedOptions) -> GuardDecision {
        if options.flag(HELP) {
            return GuardDecision::Halted {
                help: self.help.render_command(command),
            };
        }

        if EnvUtils::is_set(self.debug_env) {
            DEBUG_MODE.store(true, Ordering::Relaxed);
            debug!("Debug mode enabled by {}", self.debug_env);
        }

        GuardDecision::Proceed
    }
}
