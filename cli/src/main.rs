use calcpanel_cli::{commands, host};
use calcpanel_core::api::{CliError, LoggingConfig};
use clap::Parser;
use commands::cli;
use tokio::io::BufReader;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = calcpanel_core::api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(store) = args.store.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.recovery.path = Some(store.to_string());
    }
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let recovery = calcpanel_plugins::factory::build_recovery(&cfg)
        .map_err(|e| CliError::Config(e.to_string()))?;
    tracing::debug!(backend = recovery.backend_name(), "recovery log opened");

    match args.command {
        cli::Commands::Run(run_args) => {
            let mut host = host::Host::new(cfg.panel.clone(), recovery, run_args.answer);
            let stdout = tokio::io::stdout();
            let processed = match run_args.script {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    host::run(&mut host, BufReader::new(file), stdout).await?
                }
                None => host::run(&mut host, BufReader::new(tokio::io::stdin()), stdout).await?,
            };
            tracing::info!(messages = processed, "host input finished");
            Ok(0)
        }
        cli::Commands::Recovery(cmd) => commands::recovery::handle(cmd, &recovery).await,
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: IO error or failed command
    // 30: panel error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Panel(calcpanel_core::api::PanelError::Io(_)) => 20,
        CliError::Panel(_) => 30,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("calcpanel"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("calcpanel.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    // stdout carries host output, so console logs always go to stderr.
    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
