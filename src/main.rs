//! rcli CLI entrypoint.
//!
//! This is the main entrypoint for the rcli command-line tool.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use router_cli::cli::{Cli, Commands, OutputFormatter, PromptApprover};
use router_cli::config::{Settings, SettingsParser, SettingsValidator, resolve_user};
use router_cli::device::{DeviceSession, LoadAction, SshNetconfSession};
use router_cli::document::{CommandFormat, ConfigSource};
use router_cli::error::Result;
use router_cli::render::DiffRenderer;
use router_cli::workflow::{ApplyOptions, ApplyWorkflow, Approver, AutoApprove, DeploymentEngine};

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    let formatter = OutputFormatter::new(settings.color);

    let env_user = std::env::var("USER").ok();
    let user = resolve_user(cli.user.as_deref(), &settings, env_user.as_deref())?;
    let target = settings.ssh_target(cli.command.router(), &user);

    let session = SshNetconfSession::connect(&target).await?;
    let engine = DeploymentEngine::new(session);
    debug!("Session with {} is open", engine.session().target());

    let result = match cli.command {
        Commands::Check {
            router,
            local_file,
            diff_file,
            load_action,
        } => cmd_check(&engine, &settings, &formatter, &router, local_file, diff_file, load_action).await,
        Commands::Apply {
            router,
            local_file,
            yes,
            commit,
            load_action,
        } => {
            let approver: &dyn Approver = if yes { &AutoApprove } else { &PromptApprover };
            let options = ApplyOptions::new(router)
                .with_load_action(load_action)
                .with_confirm(settings.confirm_timeout_minutes, settings.confirm_wait())
                .with_skip_wait(commit);
            cmd_apply(&engine, &settings, &formatter, options, local_file, approver).await
        }
        Commands::Exec { output, command, .. } => cmd_exec(&engine, &command.join(" "), output).await,
        Commands::Show { router } => cmd_show(&engine, &formatter, &router).await,
    };

    if let Err(e) = engine.session().close().await {
        warn!("Failed to close session: {e}");
    }

    result
}

/// Loads, layers and validates settings.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let parser = SettingsParser::new();
    parser.load_dotenv()?;

    let mut settings = parser.load_with_env(cli.config.as_deref())?;
    if cli.no_color {
        settings.color = false;
    }
    if !settings.color {
        colored::control::set_override(false);
    }

    let validation = SettingsValidator::new().validate(&settings)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }
    debug!("Settings: {settings:?}");

    Ok(settings)
}

fn renderer_for(settings: &Settings) -> DiffRenderer {
    DiffRenderer::new(settings.suppressed_sections.clone(), settings.render_options())
}

/// Show the diff of a local configuration without committing.
async fn cmd_check(
    engine: &DeploymentEngine<SshNetconfSession>,
    settings: &Settings,
    formatter: &OutputFormatter,
    router: &str,
    local_file: PathBuf,
    diff_file: Option<PathBuf>,
    load_action: LoadAction,
) -> Result<()> {
    let renderer = renderer_for(settings);
    let options = ApplyOptions::new(router)
        .with_load_action(load_action)
        .with_diff_file(diff_file);
    let workflow = ApplyWorkflow::new(engine, &renderer, options);

    let mut stdout = std::io::stdout();
    let diff = workflow
        .check(&ConfigSource::File(local_file), &mut stdout)
        .await?;

    eprintln!("{}", formatter.format_check(router, &diff));
    Ok(())
}

/// Apply a local configuration.
async fn cmd_apply(
    engine: &DeploymentEngine<SshNetconfSession>,
    settings: &Settings,
    formatter: &OutputFormatter,
    options: ApplyOptions,
    local_file: PathBuf,
    approver: &dyn Approver,
) -> Result<()> {
    let renderer = renderer_for(settings);
    let router = options.router.clone();
    let workflow = ApplyWorkflow::new(engine, &renderer, options);

    let mut stdout = std::io::stdout();
    let outcome = workflow
        .apply(&ConfigSource::File(local_file), approver, &mut stdout)
        .await?;

    eprintln!("{}", formatter.format_outcome(&router, &outcome));
    Ok(())
}

/// Run an operational command.
async fn cmd_exec(
    engine: &DeploymentEngine<SshNetconfSession>,
    command: &str,
    format: CommandFormat,
) -> Result<()> {
    let output = engine.execute_ad_hoc(command, format).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output.trim_end())?;
    Ok(())
}

/// Print the running configuration.
async fn cmd_show(
    engine: &DeploymentEngine<SshNetconfSession>,
    formatter: &OutputFormatter,
    router: &str,
) -> Result<()> {
    let version = engine.device_version().await?;
    eprintln!("{}", formatter.format_version(router, &version));

    let configuration = engine.running_configuration().await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", configuration.trim_end())?;
    Ok(())
}
