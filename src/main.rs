use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use vitascan::{
    KeyboardCancelHandler, MockMediaDevices, SessionOrchestrator, SessionOutcome,
    SimulatedEngineFactory, VitascanConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vitascan")]
#[command(about = "Camera-based vital-signs measurement session orchestrator")]
#[command(version)]
#[command(long_about = "Guides a user through a live camera capture, binds a vital-signs \
analysis engine session to the frame source, and reconciles the engine's asynchronous \
callbacks into a coherent guidance experience. This binary drives a full session against \
the built-in simulation harness and prints the final results as JSON.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitascan.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without running a session")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override the measurement duration in seconds
    #[arg(long, value_name = "SECONDS", help = "Override session.measurement_seconds")]
    duration: Option<u32>,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Write logs to a file in addition to the terminal
    #[arg(long, value_name = "PATH", help = "Append logs to the given file")]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", vitascan::config::default_config_toml());
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;

    info!("Starting vitascan v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match VitascanConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(seconds) = args.duration {
        config.session.measurement_seconds = seconds;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    // The real capture device and analysis engine are external
    // integrations; the binary exercises the orchestration layer against
    // the built-in simulation harness.
    let devices = Arc::new(MockMediaDevices::builder().build());
    let factory = Arc::new(SimulatedEngineFactory::new());

    let orchestrator = SessionOrchestrator::new(&config, devices, factory)
        .await
        .map_err(|e| {
            error!("Failed to start session: {}", e);
            e
        })?;

    let token = orchestrator.cancellation_token();

    let keyboard = KeyboardCancelHandler::new(token.clone());
    keyboard.start().await?;

    // Ctrl-C cancels the session the same way the keyboard hook does.
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received - cancelling session");
            signal_token.cancel();
        }
    });

    // Narrate guidance and progress transitions while the session runs.
    let mut state_rx = orchestrator.subscribe();
    tokio::spawn(async move {
        let mut last_instruction = None;
        let mut last_percent = -1i32;

        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow().clone();

            if last_instruction != Some(state.instruction) {
                last_instruction = Some(state.instruction);
                info!("{}", state.instruction.text());
            }

            let percent = state.progress_percent.round() as i32;
            if state.is_processing_frames && percent / 10 != last_percent / 10 {
                last_percent = percent;
                info!("Measurement progress: {}%", percent);
            }

            if let Some(alert) = state.last_error {
                warn!(
                    code = alert.code,
                    retryable = alert.retryable,
                    "{}",
                    alert.user_message
                );
            }
        }
    });

    let outcome = orchestrator.run().await;
    keyboard.stop().await?;

    match outcome {
        Ok(SessionOutcome::Completed(results)) => {
            info!("Measurement completed with {} metrics", results.metric_count());
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Ok(SessionOutcome::Failed(alert)) => {
            error!(code = alert.code, cause = alert.cause, "Session failed");
            eprintln!("✗ {}", alert.user_message);
            std::process::exit(1);
        }
        Ok(SessionOutcome::Cancelled) => {
            info!("Session cancelled");
            Ok(())
        }
        Err(e) => {
            error!("Session error: {}", e);
            Err(e.into())
        }
    }
}

fn init_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vitascan={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().boxed()
        }
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    if let Some(path) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Ok(Some(guard))
    } else {
        registry.init();
        Ok(None)
    }
}
