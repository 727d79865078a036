//! Command-line interface module
//!
//! Provides the command table, option resolution, help rendering, the
//! pre-execution guard and the dispatcher that ties them together.

pub mod aliases;
pub mod args;
pub mod commands;
pub mod dispatch;
pub mod guard;
pub mod help;

pub use args::{GlobalOptions, OptionKind, OptionSpec, OptionValue, ResolvedOptions};
pub use commands::{CommandDescriptor, CommandTable};
pub use dispatch::{Collaborator, DispatchOutcome, Dispatcher, InvocationContext};
