//! Help text rendering

use crate::cli::{
    args::{OptionKind, OptionSpec, OptionValue, global_options},
    commands::{CommandDescriptor, CommandTable},
};
use std::fmt::Write;

/// Renders the command index and per-command help from the command table
#[derive(Debug, Clone, Copy)]
pub struct HelpRenderer<'a> {
    program: &'a str,
    table: &'a CommandTable,
}

impl<'a> HelpRenderer<'a> {
    pub const fn new(program: &'a str, table: &'a CommandTable) -> Self {
        Self { program, table }
    }

    /// Help for `command` (name or alias), or the index when `None`.
    ///
    /// Returns `None` when the command is unknown.
    pub fn render(&self, command: Option<&str>) -> Option<String> {
        match command {
            None => Some(self.render_index()),
            Some(token) => self
                .table
                .resolve(Some(token))
                .map(|descriptor| self.render_command(descriptor)),
        }
    }

    /// Every command with its short description and primary alias
    pub fn render_index(&self) -> String {
        let rows: Vec<(String, String)> = self
            .table
            .iter()
            .map(|command| {
                let usage = format!("{} {}", self.program, command.usage);
                let summary = match command.primary_alias() {
                    Some(alias) => format!("{} (alias: {alias})", command.short_description),
                    None => command.short_description.to_string(),
                };
                (usage, summary)
            })
            .collect();

        let mut out = String::from("Commands:\n");
        write_rows(&mut out, &rows);
        out.push_str("\nOptions:\n");
        write_rows(&mut out, &option_rows(&global_options()));
        out
    }

    /// Usage, descriptions and the full option list of one command
    pub fn render_command(&self, command: &CommandDescriptor) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Usage:\n  {} {}\n", self.program, command.usage);
        let _ = writeln!(out, "{}", command.short_description);

        if !command.options.is_empty() {
            out.push_str("\nOptions:\n");
            write_rows(&mut out, &option_rows(&command.options));
        }

        let globals: Vec<OptionSpec> = global_options()
            .into_iter()
            .filter(|global| command.options.iter().all(|own| own.key != global.key))
            .collect();
        out.push_str("\nGlobal options:\n");
        write_rows(&mut out, &option_rows(&globals));

        if let Some(long) = command.long_description {
            out.push_str("\nDescription:\n");
            for line in long.lines() {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "  {line}");
                }
            }
        }

        out
    }
}

fn option_rows(specs: &[OptionSpec]) -> Vec<(String, String)> {
    specs
        .iter()
        .map(|spec| {
            let long = match spec.kind {
                OptionKind::String => format!("[--{}={}]", spec.key, spec.key.to_uppercase()),
                OptionKind::Boolean => format!("[--{}]", spec.key),
            };
            let flag = match spec.alias {
                Some(alias) => format!("-{alias}, {long}"),
                None => format!("    {long}"),
            };
            let help = match &spec.default {
                Some(OptionValue::Bool(value)) => format!("{} (default: {value})", spec.help),
                Some(OptionValue::Str(value)) => format!("{} (default: {value})", spec.help),
                None => spec.help.to_string(),
            };
            (flag, help)
        })
        .collect()
}

fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        let _ = writeln!(out, "  {left:<width$}  # {right}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{BUILD_APK, BUILD_IPA, ME};

    fn table() -> CommandTable {
        CommandTable::standard().unwrap()
    }

    #[test]
    fn test_index_lists_every_command() {
        let table = table();
        let help = HelpRenderer::new("fir", &table).render(None).unwrap();

        assert!(help.starts_with("Commands:\n"));
        for command in table.iter() {
            assert!(help.contains(&format!("fir {}", command.usage)));
        }
        assert!(help.contains("Build iOS app (alias: bi)"));
        assert!(help.contains("-T, [--token=TOKEN]"));
    }

    #[test]
    fn test_command_help_by_alias() {
        let table = table();
        let renderer = HelpRenderer::new("fir", &table);
        let by_alias = renderer.render(Some("bi")).unwrap();
        let by_name = renderer.render(Some(BUILD_IPA)).unwrap();

        assert_eq!(by_alias, by_name);
        assert!(by_name.contains("Usage:\n  fir build_ipa BUILD_DIR [options] [settings]"));
        assert!(by_name.contains("Build iOS app"));
        assert!(by_name.contains("-S, [--scheme=SCHEME]"));
        assert!(by_name.contains("Internally, it use `xcodebuild`"));
        assert!(by_name.contains("Show verbose (default: true)"));
    }

    #[test]
    fn test_command_without_options_or_long_description() {
        let table = table();
        let help = HelpRenderer::new("fir", &table).render(Some(ME)).unwrap();

        assert!(!help.contains("\nOptions:\n"));
        assert!(help.contains("Global options:"));
        assert!(!help.contains("Description:"));
    }

    #[test]
    fn test_build_apk_help_omits_ipa_options() {
        let table = table();
        let help = HelpRenderer::new("fir", &table).render(Some(BUILD_APK)).unwrap();

        assert!(help.contains("[--output=OUTPUT]"));
        assert!(!help.contains("--scheme"));
    }

    #[test]
    fn test_unknown_command() {
        let table = table();
        assert!(HelpRenderer::new("fir", &table).render(Some("xyz")).is_none());
    }
}
