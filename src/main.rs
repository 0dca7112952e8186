//! olist-query command-line entry point.

use olist_query::cli::{render_text, Cli, OutputFormat};
use olist_query::config::Config;
use olist_query::error::{QueryError, Result};
use olist_query::logging::{init_file_logging, init_stderr_logging};
use olist_query::pipeline::{check_question, AttemptRecord, Engine};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.log_file {
        init_file_logging();
    } else {
        init_stderr_logging();
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Answers the question on the command line. Returns whether it succeeded.
async fn run(cli: Cli) -> Result<bool> {
    let format = cli.parse_output_format().map_err(QueryError::config)?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides()?;
    cli.apply_to(&mut config);
    config.validate()?;

    let question = cli.question();
    let question = check_question(&question, config.pipeline.question_max_chars)?;

    let engine = Engine::from_config(&config, cli.demo)?;
    let budget = Duration::from_secs(config.pipeline.timeout_secs);

    let record = match tokio::time::timeout(budget, engine.process(question)).await {
        Ok(record) => record,
        Err(_) => {
            warn!(timeout_secs = config.pipeline.timeout_secs, "Question timed out");
            let mut record = AttemptRecord::new(question);
            record.demo_mode = engine.is_offline();
            record.fail(QueryError::internal(format!(
                "Question timed out after {}s",
                config.pipeline.timeout_secs
            )));
            record
        }
    };

    match format {
        OutputFormat::Text => print!("{}", render_text(&record)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| QueryError::internal(format!("Failed to serialize result: {e}")))?;
            println!("{json}");
        }
    }

    Ok(record.success)
}
