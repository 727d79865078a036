//! Command dispatch
//!
//! Resolves a raw argv into an [`InvocationContext`], configures logging,
//! runs the guard and only then hands the invocation to a [`Collaborator`].

use crate::{
    cli::{
        aliases::HELP_COMMAND,
        args::{self, GlobalOptions, ResolvedOptions},
        commands::{CommandDescriptor, CommandTable},
        guard::{GuardDecision, InvocationGuard},
        help::HelpRenderer,
    },
    config::Config,
    error::InvocationError,
    logging::{self, LoggingState},
};
use tracing::{debug, error, instrument};

/// Everything a command body needs for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext<'t> {
    pub command: &'t CommandDescriptor,
    pub positional: Vec<String>,
    pub options: ResolvedOptions,
}

/// The operations behind the commands (build, publish, login, ...)
pub trait Collaborator {
    /// Run the command named by `context.command`
    fn invoke(&mut self, context: &InvocationContext<'_>, logging: &LoggingState)
    -> anyhow::Result<()>;
}

/// Final result of one invocation
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The collaborator finished successfully
    Completed,
    /// The help command produced this text
    Help(String),
    /// The guard stopped the command because help was requested
    Halted { help: String },
    /// The invocation was rejected before anything ran
    Invalid(InvocationError),
    /// The collaborator (or the logging setup) failed
    Failed(anyhow::Error),
}

impl DispatchOutcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed | Self::Help(_) | Self::Halted { .. } => 0,
            Self::Failed(_) => 1,
            Self::Invalid(_) => 2,
        }
    }

    /// Text the caller should print on stdout
    pub fn help_text(&self) -> Option<&str> {
        match self {
            Self::Help(text) | Self::Halted { help: text } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Routes argv to commands
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    table: &'a CommandTable,
    config: &'a Config,
}

impl<'a> Dispatcher<'a> {
    pub const fn new(table: &'a CommandTable, config: &'a Config) -> Self {
        Self { table, config }
    }

    fn help_renderer(&self) -> HelpRenderer<'a> {
        HelpRenderer::new(&self.config.program, self.table)
    }

    /// Run one invocation. `argv` excludes the program name.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        argv: &[S],
        collaborator: &mut dyn Collaborator,
    ) -> DispatchOutcome {
        let _default_logging = match LoggingState::default().install() {
            Ok(guard) => guard,
            Err(e) => return DispatchOutcome::Failed(e.into()),
        };

        let context = match self.resolve(argv) {
            Ok(context) => context,
            Err(err) => {
                error!("{err}");
                return DispatchOutcome::Invalid(err);
            }
        };

        let logging = logging::configure(&GlobalOptions::from(&context.options));
        let _logging = match logging.install() {
            Ok(guard) => guard,
            Err(e) => {
                error!("{e}");
                return DispatchOutcome::Failed(e.into());
            }
        };

        let guard = InvocationGuard::new(self.help_renderer(), &self.config.debug_env);
        if let GuardDecision::Halted { help } = guard.prepare(context.command, &context.options) {
            debug!("Help requested for {}, not running it", context.command.name);
            return DispatchOutcome::Halted { help };
        }

        if context.command.name == HELP_COMMAND {
            return self.run_help(&context);
        }

        self.run(&context, &logging, collaborator)
    }

    /// Resolve argv into a context without side effects
    pub fn resolve<S: AsRef<str>>(
        &self,
        argv: &[S],
    ) -> Result<InvocationContext<'a>, InvocationError> {
        let (token, rest) = match argv.split_first() {
            Some((token, rest)) => (Some(token.as_ref()), rest),
            None => (None, argv),
        };

        let command = self
            .table
            .resolve(token)
            .ok_or_else(|| InvocationError::unknown_command(token.unwrap_or_default()))?;

        let parsed = args::parse(command.name, &command.effective_schema(), rest)?;

        if command.requires_argument
            && parsed.positional.is_empty()
            && !parsed.options.flag(args::HELP)
        {
            return Err(InvocationError::missing_argument(
                command.name,
                format!("{} {}", self.config.program, command.usage),
            ));
        }

        Ok(InvocationContext {
            command,
            positional: parsed.positional,
            options: parsed.options,
        })
    }

    fn run_help(&self, context: &InvocationContext<'_>) -> DispatchOutcome {
        let topic = context.positional.first().map(String::as_str);
        match self.help_renderer().render(topic) {
            Some(text) => DispatchOutcome::Help(text),
            None => {
                let err = InvocationError::unknown_command(topic.unwrap_or_default());
                error!("{err}");
                DispatchOutcome::Invalid(err)
            }
        }
    }

    #[instrument(skip_all, fields(command = context.command.name))]
    fn run(
        &self,
        context: &InvocationContext<'_>,
        logging: &LoggingState,
        collaborator: &mut dyn Collaborator,
    ) -> DispatchOutcome {
        debug!(
            "Invoking {} with {} positional argument(s)",
            context.command.name,
            context.positional.len()
        );

        match collaborator.invoke(context, logging) {
            Ok(()) => DispatchOutcome::Completed,
            Err(e) => {
                error!("{e:#}");
                DispatchOutcome::Failed(e)
            }
        }
    }
}
