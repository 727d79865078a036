//! The operations behind each command
//!
//! [`Operations`] is the default [`Collaborator`]: local work (builds,
//! upgrade, version) runs here, remote work goes to a [`DistributionService`].

pub mod artifacts;
pub mod builder;
pub mod remote;

pub use artifacts::ArtifactCollector;
pub use builder::{ApkRequest, IpaRequest, PackageBuilder};
pub use remote::{DistributionService, MappingRequest, OfflineService, PublishRequest};

use crate::{
    cli::{
        args::{ResolvedOptions, TOKEN},
        commands::{BUILD_APK, BUILD_IPA, INFO, LOGIN, MAPPING, ME, PUBLISH, UPGRADE, VERSION},
        dispatch::{Collaborator, InvocationContext},
        guard::debug_enabled,
    },
    config::Config,
    logging::LoggingState,
    utils::process::ProcessRunner,
};
use anyhow::Context;
use std::{
    io::{BufRead, Write},
    path::PathBuf,
};
use tracing::{info, instrument, warn};

/// Default collaborator for the fir command set
pub struct Operations<'a, S> {
    config: &'a Config,
    service: S,
}

impl<'a, S: DistributionService> Operations<'a, S> {
    pub const fn new(config: &'a Config, service: S) -> Self {
        Self { config, service }
    }

    fn builder<'b>(&'b self, logging: &'b LoggingState) -> PackageBuilder<'b> {
        PackageBuilder::new(self.config, ProcessRunner::new(debug_enabled(), logging))
    }

    #[instrument(skip_all)]
    fn build_ipa(&self, context: &InvocationContext<'_>, logging: &LoggingState) -> anyhow::Result<()> {
        let request = IpaRequest::from_invocation(&context.positional, &context.options)?;
        let built = self
            .builder(logging)
            .build_ipa(&request)
            .context("Failed to build ipa")?;

        if context.options.flag("publish") {
            let mut publish = self.publish_request(&built.packages, &context.options)?;
            if context.options.flag("mapping") {
                if built.mapping.is_none() {
                    warn!("No dSYM found next to the build products, skipping mapping upload");
                }
                publish.mapping_file = built.mapping;
            }
            self.service.publish(&publish)?;
        }
        Ok(())
    }

    #[instrument(skip_all)]
    fn build_apk(&self, context: &InvocationContext<'_>, logging: &LoggingState) -> anyhow::Result<()> {
        let request = ApkRequest::from_invocation(&context.positional, &context.options);
        let built = self
            .builder(logging)
            .build_apk(&request)
            .context("Failed to build apk")?;

        if context.options.flag("publish") {
            let publish = self.publish_request(&built.packages, &context.options)?;
            self.service.publish(&publish)?;
        }
        Ok(())
    }

    fn publish_request(
        &self,
        packages: &[PathBuf],
        options: &ResolvedOptions,
    ) -> anyhow::Result<PublishRequest> {
        let package = packages
            .first()
            .context("The build produced no package to publish")?;
        if packages.len() > 1 {
            warn!("Publishing {} only, {} packages were built", package.display(), packages.len());
        }
        Ok(PublishRequest::from_options(package, options))
    }

    fn upgrade(&self, logging: &LoggingState) -> anyhow::Result<()> {
        let (program, args) = self.config.get_upgrade_cmd();
        info!("✈ Upgrade fir-cli (use `{}`)", self.config.upgrade_command.join(" "));

        let result = ProcessRunner::new(debug_enabled(), logging)
            .run_command_with_output(program, &args)
            .context("Failed to upgrade fir-cli")?;
        for line in result.stdout.lines() {
            info!("{line}");
        }
        Ok(())
    }
}

/// The first positional argument, which the command table guarantees for
/// commands that require one
fn first_argument(context: &InvocationContext<'_>) -> anyhow::Result<PathBuf> {
    context
        .positional
        .first()
        .map(PathBuf::from)
        .with_context(|| format!("\"{}\" needs a file argument", context.command.name))
}

fn prompt_token() -> std::io::Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Please enter your fir.im API Token: ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

impl<S: DistributionService> Collaborator for Operations<'_, S> {
    fn invoke(
        &mut self,
        context: &InvocationContext<'_>,
        logging: &LoggingState,
    ) -> anyhow::Result<()> {
        let options = &context.options;

        match context.command.name {
            BUILD_IPA => self.build_ipa(context, logging),
            BUILD_APK => self.build_apk(context, logging),
            INFO => self.service.inspect(&first_argument(context)?, options.flag("all")),
            PUBLISH => self
                .service
                .publish(&PublishRequest::from_options(first_argument(context)?, options)),
            LOGIN => {
                let token = remote::resolve_login_token(options, &context.positional, prompt_token)?;
                self.service.login(&token)
            }
            ME => self.service.me(options.string(TOKEN)),
            MAPPING => self
                .service
                .upload_mapping(&MappingRequest::from_options(first_argument(context)?, options)),
            UPGRADE => self.upgrade(logging),
            VERSION => {
                info!("✈ fir-cli {}", self.config.version);
                Ok(())
            }
            other => anyhow::bail!("No operation is registered for \"{other}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::{CommandTable, Dispatcher, DispatchOutcome},
        error::FirError,
    };
    use std::{cell::RefCell, path::Path};

    /// Remembers the calls it receives
    #[derive(Default)]
    struct RecordingService {
        calls: RefCell<Vec<String>>,
        published: RefCell<Vec<PublishRequest>>,
    }

    impl DistributionService for &RecordingService {
        fn publish(&self, request: &PublishRequest) -> anyhow::Result<()> {
            self.calls.borrow_mut().push("publish".to_string());
            self.published.borrow_mut().push(request.clone());
            Ok(())
        }

        fn login(&self, token: &str) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(format!("login {token}"));
            Ok(())
        }

        fn me(&self, token: Option<&str>) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(format!("me {token:?}"));
            Ok(())
        }

        fn upload_mapping(&self, request: &MappingRequest) -> anyhow::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("mapping {}", request.file.display()));
            Ok(())
        }

        fn inspect(&self, file: &Path, all: bool) -> anyhow::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("info {} {all}", file.display()));
            Ok(())
        }
    }

    fn run(argv: &[&str], service: &RecordingService) -> DispatchOutcome {
        let table = CommandTable::standard().unwrap();
        let config = Config {
            debug_env: "FIR_TEST_OPERATIONS_DEBUG_UNSET".to_string(),
            ..Config::default()
        };
        let mut operations = Operations::new(&config, service);
        Dispatcher::new(&table, &config).dispatch(argv, &mut operations)
    }

    #[test]
    fn test_remote_commands_reach_service() {
        let service = RecordingService::default();

        assert_eq!(run(&["i", "app.ipa", "-a", "-q"], &service).exit_code(), 0);
        assert_eq!(run(&["l", "secret", "-q"], &service).exit_code(), 0);
        assert_eq!(run(&["me", "-T", "abc", "-q"], &service).exit_code(), 0);
        assert_eq!(run(&["m", "mapping.txt", "-v", "1.0", "-q"], &service).exit_code(), 0);

        assert_eq!(
            *service.calls.borrow(),
            vec![
                "info app.ipa true".to_string(),
                "login secret".to_string(),
                "me Some(\"abc\")".to_string(),
                "mapping mapping.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_publish_request_assembled() {
        let service = RecordingService::default();

        let outcome = run(
            &["p", "app.apk", "-c", "notes", "-s", "demo", "-T", "tok", "-q"],
            &service,
        );

        assert_eq!(outcome.exit_code(), 0);
        let published = service.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].file, PathBuf::from("app.apk"));
        assert_eq!(published[0].changelog.as_deref(), Some("notes"));
        assert_eq!(published[0].short.as_deref(), Some("demo"));
        assert_eq!(published[0].token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_version_succeeds() {
        let service = RecordingService::default();
        assert!(matches!(run(&["v", "-q"], &service), DispatchOutcome::Completed));
        assert!(service.calls.borrow().is_empty());
    }

    #[test]
    fn test_offline_service_failure_is_exit_one() {
        let table = CommandTable::standard().unwrap();
        let config = Config::default();
        let mut operations = Operations::new(&config, OfflineService);

        let outcome = Dispatcher::new(&table, &config).dispatch(&["me", "-q"], &mut operations);
        match &outcome {
            DispatchOutcome::Failed(e) => assert!(matches!(
                e.downcast_ref::<FirError>(),
                Some(FirError::Unavailable { .. })
            )),
            other => panic!("Expected Failed, got {other:?}"),
        }
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_build_failure_is_exit_one() {
        let service = RecordingService::default();
        let outcome = run(&["ba", "/nonexistent/fir/project", "-p", "-q"], &service);

        assert_eq!(outcome.exit_code(), 1);
        assert!(service.calls.borrow().is_empty());
    }
}
