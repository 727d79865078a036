//! Package building with the native toolchains
//!
//! iOS packages are built with `xcodebuild` and packaged with `xcrun`;
//! Android packages with Gradle.

use crate::{
    cli::args::ResolvedOptions,
    config::Config,
    core::artifacts::ArtifactCollector,
    error::{FirError, Result},
    utils::process::ProcessRunner,
};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Directory (under the build dir) receiving `xcodebuild` products
const IPA_PRODUCTS_DIR: &str = "build/fir_products";
/// Default ipa output directory, relative to the build dir
const IPA_OUTPUT_DIR: &str = "fir_build_ipa";
/// Where Gradle leaves apks, relative to the build dir
const APK_OUTPUT_DIR: &str = "build/outputs/apk";

/// What `build_ipa` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpaRequest {
    pub build_dir: PathBuf,
    /// `KEY=VALUE` build settings handed to `xcodebuild`
    pub settings: Vec<String>,
    pub workspace: bool,
    pub scheme: Option<String>,
    pub configuration: Option<String>,
    pub target: Option<String>,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
}

impl IpaRequest {
    /// Split positional arguments into the build dir and build settings
    pub fn from_invocation(positional: &[String], options: &ResolvedOptions) -> Result<Self> {
        let setting = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=")
            .map_err(|e| FirError::build(format!("Invalid settings pattern: {e}")))?;

        let (settings, dirs): (Vec<String>, Vec<String>) = positional
            .iter()
            .cloned()
            .partition(|arg| setting.is_match(arg));

        if dirs.len() > 1 {
            warn!("Ignoring extra arguments: {:?}", &dirs[1..]);
        }

        Ok(Self {
            build_dir: dirs.first().map_or_else(|| PathBuf::from("."), PathBuf::from),
            settings,
            workspace: options.flag("workspace"),
            scheme: options.string("scheme").map(str::to_string),
            configuration: options.string("configuration").map(str::to_string),
            target: options.string("target").map(str::to_string),
            output: options.string("output").map(PathBuf::from),
            name: options.string("name").map(str::to_string),
        })
    }
}

/// What `build_apk` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApkRequest {
    pub build_dir: PathBuf,
    pub output: Option<PathBuf>,
}

impl ApkRequest {
    pub fn from_invocation(positional: &[String], options: &ResolvedOptions) -> Self {
        Self {
            build_dir: positional
                .first()
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
            output: options.string("output").map(PathBuf::from),
        }
    }
}

/// Resolved `xcodebuild` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodePlan {
    pub build_dir: PathBuf,
    pub args: Vec<String>,
    pub products_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Packages produced by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPackages {
    pub packages: Vec<PathBuf>,
    /// Debug symbols found next to the build products
    pub mapping: Option<PathBuf>,
}

/// Builds packages by driving the native toolchain
pub struct PackageBuilder<'a> {
    config: &'a Config,
    runner: ProcessRunner<'a>,
    collector: ArtifactCollector,
}

impl<'a> PackageBuilder<'a> {
    pub const fn new(config: &'a Config, runner: ProcessRunner<'a>) -> Self {
        Self {
            config,
            runner,
            collector: ArtifactCollector::new(),
        }
    }

    /// Work out the `xcodebuild` arguments for `request`
    pub fn plan_ipa(&self, request: &IpaRequest) -> Result<XcodePlan> {
        let build_dir = existing_dir(&request.build_dir)?;
        let products_dir = build_dir.join(IPA_PRODUCTS_DIR);
        let output_dir = request
            .output
            .clone()
            .unwrap_or_else(|| build_dir.join(IPA_OUTPUT_DIR));

        let mut args = vec!["-sdk".to_string(), "iphoneos".to_string()];

        if request.workspace {
            let scheme = request.scheme.as_deref().ok_or_else(|| {
                FirError::validation("Building a workspace requires a scheme (-S)")
            })?;
            let workspace = self.find_project(&build_dir, "xcworkspace")?;
            args.extend([
                "-workspace".to_string(),
                workspace.to_string_lossy().to_string(),
                "-scheme".to_string(),
                scheme.to_string(),
            ]);
        } else {
            let project = self.find_project(&build_dir, "xcodeproj")?;
            args.extend(["-project".to_string(), project.to_string_lossy().to_string()]);
        }

        if let Some(configuration) = &request.configuration {
            args.extend(["-configuration".to_string(), configuration.clone()]);
        }
        if let Some(target) = &request.target {
            args.extend(["-target".to_string(), target.clone()]);
        }

        args.extend(request.settings.iter().cloned());
        args.push(format!("CONFIGURATION_BUILD_DIR={}", products_dir.display()));
        args.push("build".to_string());

        Ok(XcodePlan {
            build_dir,
            args,
            products_dir,
            output_dir,
        })
    }

    fn find_project(&self, build_dir: &Path, extension: &str) -> Result<PathBuf> {
        let mut found = self.collector.find(build_dir, extension)?;
        if found.len() > 1 {
            warn!(
                "Found {} .{} entries, using {}",
                found.len(),
                extension,
                found[0].display()
            );
        }
        if found.is_empty() {
            return Err(FirError::build(format!(
                "No .{extension} found in {}",
                build_dir.display()
            )));
        }
        Ok(found.swap_remove(0))
    }

    /// Build, package and collect an ipa
    #[instrument(skip(self))]
    pub fn build_ipa(&self, request: &IpaRequest) -> Result<BuiltPackages> {
        let plan = self.plan_ipa(request)?;
        info!("Building ipa in {}", plan.build_dir.display());

        let args: Vec<&str> = plan.args.iter().map(String::as_str).collect();
        self.runner
            .run_command_in(&plan.build_dir, &self.config.xcodebuild, &args)?;

        let apps = self.collector.find(&plan.products_dir, "app")?;
        if apps.is_empty() {
            return Err(FirError::build(format!(
                "xcodebuild produced no .app in {}",
                plan.products_dir.display()
            )));
        }

        std::fs::create_dir_all(&plan.output_dir)
            .map_err(|e| FirError::file_system("create directory", &plan.output_dir, e))?;

        let mut packages = Vec::new();
        for app in &apps {
            let stem = match (&request.name, apps.len()) {
                (Some(name), 1) => name.clone(),
                _ => app
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_else(|| "app".to_string()),
            };
            let ipa = plan.output_dir.join(format!("{stem}.ipa"));
            let app_str = app.to_string_lossy().to_string();
            let ipa_str = ipa.to_string_lossy().to_string();

            self.runner.run_command(
                &self.config.xcrun,
                &[
                    "-sdk",
                    "iphoneos",
                    "PackageApplication",
                    "-v",
                    app_str.as_str(),
                    "-o",
                    ipa_str.as_str(),
                ],
            )?;
            packages.push(ipa);
        }

        let mapping = self
            .collector
            .find(&plan.products_dir, "dSYM")?
            .into_iter()
            .next();

        info!("Build completed successfully. Generated {} ipa(s)", packages.len());
        Ok(BuiltPackages { packages, mapping })
    }

    /// Build an apk with Gradle and collect it
    #[instrument(skip(self))]
    pub fn build_apk(&self, request: &ApkRequest) -> Result<BuiltPackages> {
        let build_dir = existing_dir(&request.build_dir)?;
        info!("Building apk in {}", build_dir.display());

        let wrapper = build_dir.join("gradlew");
        let gradle = if wrapper.is_file() {
            wrapper.to_string_lossy().to_string()
        } else {
            self.config.gradle.clone()
        };
        self.runner
            .run_command_in(&build_dir, &gradle, &["clean", "assembleRelease"])?;

        let apks = self
            .collector
            .find_recursive(&build_dir.join(APK_OUTPUT_DIR), "apk")?;
        if apks.is_empty() {
            return Err(FirError::build(format!(
                "No apk files were generated under {}",
                build_dir.join(APK_OUTPUT_DIR).display()
            )));
        }

        let packages = match &request.output {
            Some(output) => self
                .collector
                .collect(&apks, output)?
                .into_iter()
                .map(|artifact| artifact.destination)
                .collect(),
            None => apks,
        };

        info!("Build completed successfully. Generated {} apk(s)", packages.len());
        Ok(BuiltPackages {
            packages,
            mapping: None,
        })
    }
}

fn existing_dir(dir: &Path) -> Result<PathBuf> {
    let canonical = dir
        .canonicalize()
        .map_err(|e| FirError::file_system("resolve build directory", dir, e))?;
    if !canonical.is_dir() {
        return Err(FirError::validation(format!(
            "Build directory is not a directory: {}",
            dir.display()
        )));
    }
    Ok(canonical)
}
