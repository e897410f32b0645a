// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use adscribe::app_config::{self, Config, default_config_path};
use adscribe::app_controller::Controller;
use adscribe::model::Brief;
use adscribe::providers::mock::MockScriptService;
use adscribe::render::render_session;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an ad script from a product brief
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Refine one line of a previously generated script
    Refine(RefineArgs),

    /// Open a generated script in the interactive refine shell
    Open {
        #[command(flatten)]
        source: DataSource,
    },

    /// Check that the script service is reachable
    Health,

    /// Generate shell completions for adscribe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Product or service niche
    #[arg(short, long)]
    niche: Option<String>,

    /// Key features or keywords
    #[arg(short, long)]
    keywords: Option<String>,

    /// Target audience
    #[arg(short, long)]
    audience: Option<String>,

    /// Enter the refine shell once the script is ready
    #[arg(short, long)]
    interactive: bool,

    /// Print the results location for the generated script
    #[arg(short, long)]
    print_location: bool,
}

#[derive(Args, Debug)]
struct DataSource {
    /// Results location or query string carrying the script data
    #[arg(long, conflicts_with = "data_file", required_unless_present = "data_file")]
    data: Option<String>,

    /// File containing a results location or query string
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,
}

impl DataSource {
    fn read(&self) -> Result<String> {
        match (&self.data, &self.data_file) {
            (Some(data), _) => Ok(data.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(|content| content.trim().to_string())
                .with_context(|| format!("Failed to read script data from: {}", path.display())),
            (None, None) => Err(anyhow!("Either --data or --data-file is required")),
        }
    }
}

#[derive(Args, Debug)]
struct RefineArgs {
    #[command(flatten)]
    source: DataSource,

    /// Line to refine (1-based)
    #[arg(short, long)]
    line: usize,

    /// What to change about the line
    #[arg(short, long)]
    feedback: String,
}

/// adscribe - AI ad script generator client
///
/// Submits a product brief to the script service, shows the generated script with its
/// art direction and lets you rewrite single lines with feedback.
#[derive(Parser, Debug)]
#[command(name = "adscribe")]
#[command(version)]
#[command(about = "AI ad script generator client")]
#[command(long_about = "adscribe sends a product brief to the script service and lets you refine the result line by line.

EXAMPLES:
    adscribe generate -n 'Eco-Friendly Cleaning Products' -k 'natural, biodegradable' -a 'homeowners'
    adscribe generate -n ... -k ... -a ... --print-location > script.loc
    adscribe refine --data-file script.loc --line 1 --feedback 'make it punchier'
    adscribe open --data-file script.loc            # Interactive refine shell
    adscribe --offline generate -n x -k y -a z -i   # Use the built-in sample service
    adscribe completions bash > adscribe.bash

CONFIGURATION:
    Configuration is stored in conf.json under the user config directory by default.
    You can specify a different file with --config. If the file doesn't exist, a
    default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short = 'L', long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Script service base URL, overriding the config file
    #[arg(short, long, global = true, env = "ADSCRIBE_ENDPOINT")]
    endpoint: Option<String>,

    /// Use the built-in sample service instead of the network
    #[arg(long, global = true)]
    offline: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is applied through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "adscribe", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = if cli.offline {
        info!("Offline mode: using the built-in sample script service");
        Controller::with_service(config, Arc::new(MockScriptService::working()))
    } else {
        Controller::with_config(config)?
    };

    match cli.command {
        Commands::Generate(args) => run_generate(&controller, args).await,
        Commands::Refine(args) => run_refine(&controller, args).await,
        Commands::Open { source } => {
            let session = controller.open(&source.read()?);
            run_shell(&controller, &session).await
        }
        Commands::Health => controller.check_health().await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration file and apply CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_create(&config_path)?;

    if let Some(endpoint) = &cli.endpoint {
        config.service.endpoint = endpoint.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_generate(controller: &Controller, args: GenerateArgs) -> Result<()> {
    let brief = Brief::new(
        args.niche.unwrap_or_default(),
        args.keywords.unwrap_or_default(),
        args.audience.unwrap_or_default(),
    );

    let handoff = controller.generate(brief).await?;
    let location = controller.location_for(&handoff)?;
    let session = controller.open_handoff(handoff);

    if args.print_location {
        println!("{}", location);
    }

    if args.interactive {
        run_shell(controller, &session).await
    } else {
        if !args.print_location {
            print!("{}", render_session(&session));
        }
        session.dispose();
        Ok(())
    }
}

async fn run_refine(controller: &Controller, args: RefineArgs) -> Result<()> {
    let session = controller.open(&args.source.read()?);
    if session.document().is_none() {
        let reason = session.last_error().unwrap_or_else(|| "No script data available".to_string());
        return Err(anyhow!(reason));
    }

    let line = controller.refine_line(&session, args.line, &args.feedback).await?;
    info!("Line {} is now: {}", args.line, line.text);

    print!("{}", render_session(&session));
    if let Some(handoff) = session.handoff() {
        println!();
        println!("{}", controller.location_for(&handoff)?);
    }
    session.dispose();
    Ok(())
}

async fn run_shell(controller: &Controller, session: &adscribe::ResultSession) -> Result<()> {
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    controller.run_shell(session, input, &mut out).await
}
