pub mod app;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;

use commands::Gateway;
use config::LedgerConfig;
use error::AppError;
use std::io::{BufRead, Write};
use std::process::ExitCode;

/// Install the stderr logger. Stdout is reserved for responses.
pub fn init_logging(config: &LedgerConfig) {
    let _ = env_logger::Builder::new()
        .filter_level(config.log_level)
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Open the ledger and wrap it in a gateway. Fails with
/// `MigrationFailure` rather than serve an out-of-date schema.
pub fn open(config: &LedgerConfig) -> Result<Gateway, AppError> {
    let pool = infra::init_db(config)?;
    log::info!("DB path: {:?}", pool.path());
    Ok(Gateway::new(pool))
}

/// Answer one JSON request per input line until the input closes.
pub fn serve<R: BufRead, W: Write>(gateway: &Gateway, input: R, mut output: W) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = gateway.dispatch_json(&line);
        writeln!(output, "{}", response)?;
        output.flush()?;
    }
    Ok(())
}

pub fn run() -> ExitCode {
    let config = match LedgerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("finsight: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let gateway = match open(&config) {
        Ok(g) => g,
        Err(e) if e.is_fatal() => {
            log::error!("refusing to serve {:?}: {}", config.db_path, e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            log::error!("DB init failed: {} ({})", e, e.code());
            return ExitCode::FAILURE;
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = serve(&gateway, stdin.lock(), stdout.lock()) {
        log::error!("request loop stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
