//! Option schemas and option resolution
//!
//! Every command's flags are declared as [`OptionSpec`] values. At dispatch time
//! the effective schema (global options plus the command's own) is turned into
//! a `clap::Command` and the remaining argv is parsed against it.

use crate::error::InvocationError;
use clap::{
    Arg, ArgAction, ArgMatches,
    error::{ContextKind, ContextValue, ErrorKind},
    parser::ValueSource,
};
use std::collections::BTreeMap;

/// Id of the catch-all positional argument
const POSITIONAL_ID: &str = "args";

pub const TOKEN: &str = "token";
pub const LOGFILE: &str = "logfile";
pub const VERBOSE: &str = "verbose";
pub const QUIET: &str = "quiet";
pub const HELP: &str = "help";

/// Value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Takes a value: `--scheme NAME`
    String,
    /// Presence flag with a `--no-<key>` negation
    Boolean,
}

/// A resolved or default option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Str(String),
    Bool(bool),
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Declaration of a single option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub alias: Option<char>,
    pub kind: OptionKind,
    pub default: Option<OptionValue>,
    pub help: &'static str,
}

impl OptionSpec {
    /// Declare a string option with a single-letter alias
    #[must_use]
    pub const fn string(key: &'static str, alias: char, help: &'static str) -> Self {
        Self {
            key,
            alias: Some(alias),
            kind: OptionKind::String,
            default: None,
            help,
        }
    }

    /// Declare a boolean option with a single-letter alias
    #[must_use]
    pub const fn boolean(key: &'static str, alias: char, help: &'static str) -> Self {
        Self {
            key,
            alias: Some(alias),
            kind: OptionKind::Boolean,
            default: None,
            help,
        }
    }

    /// Set the value used when the option is absent from the command line
    #[must_use]
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Long flag that switches a boolean option off
    pub fn negation(&self) -> Option<String> {
        match self.kind {
            OptionKind::Boolean => Some(format!("no-{}", self.key)),
            OptionKind::String => None,
        }
    }

    fn to_args(&self) -> Vec<Arg> {
        let mut arg = Arg::new(self.key).long(self.key).help(self.help);
        if let Some(alias) = self.alias {
            arg = arg.short(alias);
        }

        match (self.kind, self.negation()) {
            (OptionKind::Boolean, Some(negation)) => vec![
                arg.action(ArgAction::SetTrue).overrides_with(negation.clone()),
                Arg::new(negation.clone())
                    .long(negation)
                    .action(ArgAction::SetTrue)
                    .hide(true)
                    .overrides_with(self.key),
            ],
            _ => vec![
                arg.action(ArgAction::Set)
                    .value_name(self.key.to_uppercase())
                    .value_parser(clap::value_parser!(String)),
            ],
        }
    }

    fn resolve(&self, matches: &ArgMatches) -> Option<OptionValue> {
        match self.kind {
            OptionKind::Boolean => {
                let negated = self
                    .negation()
                    .is_some_and(|negation| matches.get_flag(&negation));
                if negated {
                    Some(OptionValue::Bool(false))
                } else if matches.value_source(self.key) == Some(ValueSource::CommandLine) {
                    Some(OptionValue::Bool(true))
                } else {
                    self.default.clone()
                }
            }
            OptionKind::String => matches
                .get_one::<String>(self.key)
                .map(|value| OptionValue::Str(value.clone()))
                .or_else(|| self.default.clone()),
        }
    }
}

/// Options available to every command
pub fn global_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::string(TOKEN, 'T', "User's API Token at fir.im"),
        OptionSpec::string(LOGFILE, 'L', "Path to writable logfile"),
        OptionSpec::boolean(VERBOSE, 'V', "Show verbose").with_default(true),
        OptionSpec::boolean(QUIET, 'q', "Silence commands"),
        OptionSpec::boolean(HELP, 'h', "Show this help message and quit"),
    ]
}

/// Merge global options with a command's own options.
///
/// Globals come first. A command option with the same key as a global one
/// replaces it.
pub fn effective_schema(command_options: &[OptionSpec]) -> Vec<OptionSpec> {
    let mut schema: Vec<OptionSpec> = global_options()
        .into_iter()
        .filter(|global| !command_options.iter().any(|own| own.key == global.key))
        .collect();
    schema.extend(command_options.iter().cloned());
    schema
}

/// Final option values for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Boolean value of `key`, `false` when absent
    pub fn flag(&self, key: &str) -> bool {
        self.flag_or(key, false)
    }

    /// Boolean value of `key`, `default` when absent
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(OptionValue::Bool(value)) => *value,
            _ => default,
        }
    }

    /// String value of `key`
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Str(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for ResolvedOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

/// Typed view of the global subset of [`ResolvedOptions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub token: Option<String>,
    pub logfile: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
    pub help: bool,
}

impl From<&ResolvedOptions> for GlobalOptions {
    fn from(options: &ResolvedOptions) -> Self {
        Self {
            token: options.string(TOKEN).map(str::to_string),
            logfile: options.string(LOGFILE).map(str::to_string),
            verbose: options.flag_or(VERBOSE, true),
            quiet: options.flag(QUIET),
            help: options.flag(HELP),
        }
    }
}

/// Positional arguments and options parsed from one argv remainder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub options: ResolvedOptions,
}

/// Parse `raw` against `schema` for the command `name`.
///
/// Flags missing from the schema are rejected. A repeated flag keeps its
/// last value.
pub fn parse<S: AsRef<str>>(
    name: &str,
    schema: &[OptionSpec],
    raw: &[S],
) -> Result<ParsedArgs, InvocationError> {
    let matches = parser_for(name, schema)
        .try_get_matches_from(raw.iter().map(|arg| AsRef::<str>::as_ref(arg).to_owned()))
        .map_err(|err| classify(name, &err))?;

    let positional = matches
        .get_many::<String>(POSITIONAL_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let options = schema
        .iter()
        .filter_map(|spec| spec.resolve(&matches).map(|value| (spec.key, value)))
        .collect();

    Ok(ParsedArgs {
        positional,
        options,
    })
}

fn parser_for(name: &str, schema: &[OptionSpec]) -> clap::Command {
    clap::Command::new(name.to_string())
        .no_binary_name(true)
        .args_override_self(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(POSITIONAL_ID)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .args(schema.iter().flat_map(OptionSpec::to_args))
}

fn classify(command: &str, err: &clap::Error) -> InvocationError {
    match err.kind() {
        ErrorKind::UnknownArgument => {
            let option = match err.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(option)) => option.clone(),
                _ => String::from("(unknown)"),
            };
            InvocationError::unknown_option(command, option)
        }
        _ => {
            let rendered = err.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            InvocationError::usage(command, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_apk_schema() -> Vec<OptionSpec> {
        effective_schema(&[
            OptionSpec::string("output", 'o', "APK output path"),
            OptionSpec::boolean("publish", 'p', "true/false if publish to fir.im"),
        ])
    }

    #[test]
    fn test_global_options_declared() {
        let keys: Vec<&str> = global_options().iter().map(|spec| spec.key).collect();
        assert_eq!(keys, vec![TOKEN, LOGFILE, VERBOSE, QUIET, HELP]);

        let verbose = &global_options()[2];
        assert_eq!(verbose.alias, Some('V'));
        assert_eq!(verbose.default, Some(OptionValue::Bool(true)));
    }

    #[test]
    fn test_command_option_replaces_global() {
        let schema = effective_schema(&[OptionSpec::string(TOKEN, 'T', "Project token")]);
        let tokens: Vec<&OptionSpec> = schema.iter().filter(|spec| spec.key == TOKEN).collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].help, "Project token");
        assert_eq!(schema.len(), global_options().len());
    }

    #[test]
    fn test_parse_defaults_only() {
        let parsed = parse::<&str>("build_apk", &build_apk_schema(), &[]).unwrap();

        assert!(parsed.positional.is_empty());
        assert_eq!(parsed.options.len(), 1);
        assert!(parsed.options.flag(VERBOSE));
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let parsed = parse(
            "build_apk",
            &build_apk_schema(),
            &["app", "-p", "-o", "out", "--token", "abc"],
        )
        .unwrap();

        assert_eq!(parsed.positional, vec!["app".to_string()]);
        assert!(parsed.options.flag("publish"));
        assert_eq!(parsed.options.string("output"), Some("out"));
        assert_eq!(parsed.options.string(TOKEN), Some("abc"));
    }

    #[test]
    fn test_negation_switches_default_off() {
        let parsed = parse("build_apk", &build_apk_schema(), &["--no-verbose"]).unwrap();
        assert_eq!(parsed.options.get(VERBOSE), Some(&OptionValue::Bool(false)));

        let parsed =
            parse("build_apk", &build_apk_schema(), &["--no-verbose", "--verbose"]).unwrap();
        assert!(parsed.options.flag(VERBOSE));
    }

    #[test]
    fn test_repeated_option_keeps_last_value() {
        let parsed = parse(
            "build_apk",
            &build_apk_schema(),
            &["-T", "a", "-T", "b", "-p", "-p"],
        )
        .unwrap();
        assert_eq!(parsed.options.string(TOKEN), Some("b"));
        assert!(parsed.options.flag("publish"));

        let parsed = parse("build_apk", &build_apk_schema(), &["-q", "-q"]).unwrap();
        assert!(parsed.options.flag(QUIET));

        let parsed = parse("build_apk", &build_apk_schema(), &["-V", "-V"]).unwrap();
        assert!(parsed.options.flag(VERBOSE));

        let parsed =
            parse("build_apk", &build_apk_schema(), &["--no-verbose", "--no-verbose"]).unwrap();
        assert!(!parsed.options.flag(VERBOSE));
    }

    #[test]
    fn test_empty_string_value_is_kept() {
        let parsed = parse("build_apk", &build_apk_schema(), &["--logfile", ""]).unwrap();
        assert_eq!(parsed.options.string(LOGFILE), Some(""));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = parse("build_apk", &build_apk_schema(), &["-S", "Demo"]).unwrap_err();
        assert_eq!(err, InvocationError::unknown_option("build_apk", "-S"));

        let err = parse("build_apk", &build_apk_schema(), &["--scheme", "Demo"]).unwrap_err();
        assert!(matches!(err, InvocationError::UnknownOption { .. }));
    }

    #[test]
    fn test_missing_value_is_usage_error() {
        let err = parse("build_apk", &build_apk_schema(), &["-o"]).unwrap_err();
        assert!(matches!(err, InvocationError::Usage { .. }));
    }

    #[test]
    fn test_global_options_view() {
        let options: ResolvedOptions = [
            (QUIET, OptionValue::Bool(true)),
            (LOGFILE, OptionValue::from("/tmp/x.log")),
        ]
        .into_iter()
        .collect();
        let globals = GlobalOptions::from(&options);

        assert!(globals.quiet);
        assert!(globals.verbose);
        assert!(!globals.help);
        assert_eq!(globals.logfile.as_deref(), Some("/tmp/x.log"));
        assert_eq!(globals.token, None);
    }
}
