//! Command-line argument parsing and result rendering for olist-query.

use crate::config::Config;
use crate::pipeline::AttemptRecord;
use clap::Parser;
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Output format for a finished question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Explanation, SQL and an aligned table.
    #[default]
    Text,
    /// The attempt record as JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Ask analytical questions about the Olist e-commerce warehouse in plain English.
#[derive(Parser, Debug)]
#[command(name = "olist-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The question to answer (words are joined with spaces)
    #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Path to the SQLite database
    #[arg(long, value_name = "PATH", env = "OLIST_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider: anthropic, openai or mock
    #[arg(long, value_name = "PROVIDER", env = "OLIST_LLM_PROVIDER")]
    pub provider: Option<String>,

    /// Row cap for queries without a LIMIT clause
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Correction rounds after a failed execution
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Answer from the canned query library without calling an LLM
    #[arg(long)]
    pub demo: bool,

    /// Also require generated SQL to parse as a single read-only query
    #[arg(long)]
    pub strict: bool,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Write logs to the state directory instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The question as a single string.
    pub fn question(&self) -> String {
        self.question.join(" ")
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> std::result::Result<OutputFormat, String> {
        self.format.parse()
    }

    /// Applies flag overrides on top of file and environment configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(max_rows) = self.max_rows {
            config.pipeline.max_rows = max_rows;
        }
        if let Some(max_retries) = self.max_retries {
            config.pipeline.max_retries = max_retries;
        }
        if self.strict {
            config.safety.strict_parse = true;
        }
    }
}

/// Renders a record for the terminal.
pub fn render_text(record: &AttemptRecord) -> String {
    let mut out = String::new();

    if !record.explanation.is_empty() {
        out.push_str(&record.explanation);
        out.push_str("\n\n");
    }

    if !record.sql.is_empty() {
        let label = if record.success { "SQL" } else { "Last SQL tried" };
        out.push_str(&format!("{label}:\n{}\n\n", record.sql));
    }

    if let Some(error) = &record.error {
        out.push_str(&format!("Error: {error}\n"));
        return out;
    }

    out.push_str(&render_table(&record.columns, record));
    out.push('\n');

    let rows = if record.row_count == 1 { "row" } else { "rows" };
    out.push_str(&format!(
        "{} {rows} in {} ms, attempts: {}{}\n",
        record.row_count,
        record.execution_time_ms,
        record.attempts,
        if record.demo_mode { " [demo]" } else { "" }
    ));

    out
}

fn render_table(columns: &[String], record: &AttemptRecord) -> String {
    let cells: Vec<Vec<String>> = record
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map_or_else(String::new, display_cell))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let format_row = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut table = format_row(columns);
    table.push('\n');
    table.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    table.push('\n');
    for row in &cells {
        table.push_str(&format_row(row));
        table.push('\n');
    }
    table
}

fn display_cell(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
