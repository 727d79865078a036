//! Command descriptors and the command table
//!
//! The table is filled once at start-up and only read afterwards. Lookups by
//! name or alias go through the [`AliasResolver`].

use crate::{
    cli::{
        aliases::{AliasResolver, HELP_COMMAND, HELP_MAPPINGS},
        args::{OptionSpec, effective_schema},
    },
    error::{FirError, Result},
};
use std::collections::HashSet;

pub const BUILD_IPA: &str = "build_ipa";
pub const BUILD_APK: &str = "build_apk";
pub const INFO: &str = "info";
pub const PUBLISH: &str = "publish";
pub const LOGIN: &str = "login";
pub const ME: &str = "me";
pub const MAPPING: &str = "mapping";
pub const UPGRADE: &str = "upgrade";
pub const VERSION: &str = "version";

/// A named command with its option schema and descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: Vec<&'static str>,
    pub usage: &'static str,
    pub short_description: &'static str,
    pub long_description: Option<&'static str>,
    pub options: Vec<OptionSpec>,
    /// Whether at least one positional argument must be given
    pub requires_argument: bool,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, usage: &'static str, short_description: &'static str) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            usage,
            short_description,
            long_description: None,
            options: Vec::new(),
            requires_argument: false,
        }
    }

    #[must_use]
    pub fn aliases(mut self, aliases: &[&'static str]) -> Self {
        self.aliases.extend_from_slice(aliases);
        self
    }

    #[must_use]
    pub fn long_description(mut self, text: &'static str) -> Self {
        self.long_description = Some(text);
        self
    }

    #[must_use]
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    #[must_use]
    pub fn requires_argument(mut self) -> Self {
        self.requires_argument = true;
        self
    }

    /// First declared alias, shown in the command index
    pub fn primary_alias(&self) -> Option<&'static str> {
        self.aliases.first().copied()
    }

    /// Global options merged with this command's options
    pub fn effective_schema(&self) -> Vec<OptionSpec> {
        effective_schema(&self.options)
    }

    fn validate(&self) -> Result<()> {
        let schema = self.effective_schema();
        let mut keys = HashSet::new();
        let mut shorts = HashSet::new();

        for spec in &schema {
            if !keys.insert(spec.key) {
                return Err(FirError::registry(format!(
                    "option --{} is declared twice for \"{}\"",
                    spec.key, self.name
                )));
            }
            if let Some(alias) = spec.alias {
                if !shorts.insert(alias) {
                    return Err(FirError::registry(format!(
                        "option alias -{alias} is declared twice for \"{}\"",
                        self.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Write-once table of every known command
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: Vec<CommandDescriptor>,
    resolver: AliasResolver,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command and bind its name and aliases
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<()> {
        if self.get(descriptor.name).is_some() {
            return Err(FirError::registry(format!(
                "command \"{}\" is registered twice",
                descriptor.name
            )));
        }
        descriptor.validate()?;

        self.resolver.bind(descriptor.name, descriptor.name)?;
        for &alias in &descriptor.aliases {
            if self.get(alias).is_some() {
                return Err(FirError::registry(format!(
                    "alias \"{alias}\" shadows the command of the same name"
                )));
            }
            self.resolver.bind(alias, descriptor.name)?;
        }

        self.commands.push(descriptor);
        Ok(())
    }

    /// Look up a command by canonical name
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Resolve a command token (name or alias); `None` resolves to help
    pub fn resolve(&self, token: Option<&str>) -> Option<&CommandDescriptor> {
        self.resolver
            .resolve(token)
            .and_then(|name| self.get(name))
    }

    /// Commands in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// The fir.im command set
    pub fn standard() -> Result<Self> {
        let mut table = Self::new();
        for descriptor in standard_commands() {
            table.register(descriptor)?;
        }
        Ok(table)
    }
}

fn standard_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new(
            BUILD_IPA,
            "build_ipa BUILD_DIR [options] [settings]",
            "Build iOS app",
        )
        .aliases(&["bi", "b"])
        .long_description(
            "`build_ipa` command will auto build your project/workspace to an ipa package\n\
             and it also can auto publish your built ipa to fir.im if use `-p` option.\n\
             Internally, it use `xcodebuild` to accomplish these things, use `man xcodebuild` to get more information.\n\
             \n\
             Example:\n\
             \n\
             $ fir bi <project dir> [-C <configuration>] [-t <target name>] [-o <ipa output dir>] [settings] [-c <changelog>] [-p -T <your api token>]\n\
             \n\
             $ fir bi <project dir> [-c <changelog> -P <bughd project id> -M -p -T <your api token>]\n\
             \n\
             $ fir bi <workspace dir> -w -S <scheme name> [-C <configuration>] [-t <target name>] [-o <ipa output dir>] [settings] [-c <changelog>] [-p -T <your api token>]",
        )
        .option(OptionSpec::boolean("workspace", 'w', "true/false if build workspace"))
        .option(OptionSpec::string("scheme", 'S', "Set the scheme NAME if build workspace"))
        .option(OptionSpec::string(
            "configuration",
            'C',
            "Use the build configuration NAME for building each target",
        ))
        .option(OptionSpec::string("target", 't', "Build the target specified by targetname"))
        .option(OptionSpec::string(
            "output",
            'o',
            "IPA output path, the default is: BUILD_DIR/fir_build_ipa",
        ))
        .option(OptionSpec::string(
            "name",
            'n',
            "IPA name, the default is: YOUR PROJECT NAME",
        ))
        .option(OptionSpec::boolean("publish", 'p', "true/false if publish to fir.im"))
        .option(OptionSpec::string("short", 's', "Set custom short link if publish to fir.im"))
        .option(OptionSpec::string("changelog", 'c', "Set changelog if publish to fir.im"))
        .option(OptionSpec::boolean(
            "mapping",
            'M',
            "true/false if upload app's mapping file to BugHD.com",
        ))
        .option(OptionSpec::string(
            "proj",
            'P',
            "Project id in BugHD.com if upload app's mapping file",
        )),
        CommandDescriptor::new(BUILD_APK, "build_apk BUILD_DIR", "Build Android app")
            .aliases(&["ba"])
            .long_description(
                "`build_apk` command will auto build your project to an apk package\n\
                 and it also can auto publish your built apk to fir.im if use `-p` option.\n\
                 Internally, it use `gradle` to accomplish these things, use `gradle --help` to get more information.\n\
                 \n\
                 Example:\n\
                 \n\
                 $ fir ba <project dir> [-o <apk output dir> -c <changelog> -p -T <your api token>]",
            )
            .option(OptionSpec::string(
                "output",
                'o',
                "APK output path, the default is: BUILD_DIR/build/outputs/apk",
            ))
            .option(OptionSpec::boolean("publish", 'p', "true/false if publish to fir.im"))
            .option(OptionSpec::string("short", 's', "Set custom short link if publish to fir.im"))
            .option(OptionSpec::string("changelog", 'c', "Set changelog if publish to fir.im")),
        CommandDescriptor::new(
            INFO,
            "info APP_FILE_PATH",
            "Show iOS/Android app's info, support ipa/apk file",
        )
        .aliases(&["i"])
        .requires_argument()
        .option(OptionSpec::boolean("all", 'a', "Show all information in application")),
        CommandDescriptor::new(
            PUBLISH,
            "publish APP_FILE_PATH",
            "Publish iOS/Android app to fir.im, support ipa/apk file",
        )
        .aliases(&["p"])
        .requires_argument()
        .long_description(
            "`publish` command will publish your app file to fir.im, also the command support to publish app's short & changelog.\n\
             \n\
             Example:\n\
             \n\
             $ fir p <app file path> [-c <changelog> -s <custom short link> -T <your api token>]\n\
             \n\
             $ fir p <app file path> [-c <changelog> -s <custom short link> -m <mapping file path> -P <bughd project id> -T <your api token>]",
        )
        .option(OptionSpec::string("short", 's', "Set custom short link"))
        .option(OptionSpec::string("changelog", 'c', "Set changelog"))
        .option(OptionSpec::string("mappingfile", 'm', "App's mapping file"))
        .option(OptionSpec::string(
            "proj",
            'P',
            "Project id in BugHD.com if upload app's mapping file",
        )),
        CommandDescriptor::new(LOGIN, "login", "Login fir.im").aliases(&["l"]),
        CommandDescriptor::new(ME, "me", "Show current user info if user is logined"),
        CommandDescriptor::new(
            MAPPING,
            "mapping MAPPING_FILE_PATH",
            "Upload app's mapping file to BugHD.com",
        )
        .aliases(&["m"])
        .requires_argument()
        .long_description(
            "`mapping` command will upload your app's mapping file to BugHD.com if you have the same app/project in BugHD.com.\n\
             \n\
             Example:\n\
             \n\
             $ fir m <mapping file path> -P <bughd project id> -v <app version> -b <app build> -T <your fir api token>",
        )
        .option(OptionSpec::string("proj", 'P', "Project id in BugHD.com"))
        .option(OptionSpec::string("version", 'v', "App version"))
        .option(OptionSpec::string("build", 'b', "App build")),
        CommandDescriptor::new(UPGRADE, "upgrade", "Upgrade fir-cli and quit").aliases(&["u"]),
        CommandDescriptor::new(VERSION, "version", "Show fir-cli version number and quit")
            .aliases(&["v", "-v", "--version"]),
        CommandDescriptor::new(
            HELP_COMMAND,
            "help [COMMAND]",
            "Describe available commands or one specific command",
        )
        .aliases(HELP_MAPPINGS),
    ]
}
