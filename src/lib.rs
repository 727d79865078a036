//! # fir-cli
//!
//! Command-line front end for building iOS/Android packages and publishing
//! them to fir.im.
//!
//! ## Features
//!
//! - Command table with aliases and Thor-style help mappings
//! - Global and per-command options resolved from argv
//! - Per-invocation logging to stdout, a logfile, or nowhere
//! - A guard that halts on help requests and toggles debug mode
//! - ipa/apk builds driven by xcodebuild and gradle
//!
//! ## Example
//!
//! ```no_run
//! use fir_cli::{
//!     cli::{CommandTable, Dispatcher},
//!     config::Config,
//!     core::{OfflineService, Operations},
//! };
//!
//! let config = Config::from_env()?;
//! let table = CommandTable::standard()?;
//! let mut operations = Operations::new(&config, OfflineService);
//! let outcome = Dispatcher::new(&table, &config).dispatch(&["version"], &mut operations);
//! assert_eq!(outcome.exit_code(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod utils;
