//! Normalize and compare query errors from the command line.

mod input;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use input::{Input, read_input};
use qerr_common::api::schema::{export_schemas, generate_classification_catalog};
use qerr_common::config::QerrConfig;
use qerr_common::{ErrorNormalizer, LogConfig, init_logging};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "qerr", version, about = "Normalize and compare query errors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Config file (defaults to ~/.config/qerr/config.toml)
    #[arg(long, global = true, env = "QERR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one error or a list of errors into wire form
    Normalize {
        /// JSON input file (stdin when omitted or '-')
        file: Option<PathBuf>,
    },

    /// Compare two errors under canonical identity
    Compare { a: PathBuf, b: PathBuf },

    /// Print the built-in classification catalog
    Catalog,

    /// Write JSON schemas for the wire form
    Schema {
        /// Output directory
        #[arg(long, default_value = "schemas")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env("warn");
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;

    let config = QerrConfig::load(cli.config.as_deref()).context("failed to load config")?;
    debug!(?config, "configuration loaded");
    let pretty = cli.pretty || config.output.pretty;
    let normalizer = config.normalizer();

    match cli.command {
        Commands::Normalize { file } => {
            let output = normalize(&normalizer, read_input(file.as_deref())?)?;
            emit(&output, pretty)?;
        }
        Commands::Compare { a, b } => {
            let a = read_input(Some(&a))?.into_single().context("left input")?;
            let b = read_input(Some(&b))?.into_single().context("right input")?;
            let output = json!({
                "equal": normalizer.equals(&a, &b),
                "hash_a": normalizer.hash_code(&a),
                "hash_b": normalizer.hash_code(&b),
            });
            emit(&output, pretty)?;
        }
        Commands::Catalog => {
            emit(&generate_classification_catalog(), pretty)?;
        }
        Commands::Schema { out } => {
            let result = export_schemas(&out)
                .with_context(|| format!("failed to export schemas to {}", out.display()))?;
            emit(&result, pretty)?;
        }
    }

    Ok(())
}

fn normalize(normalizer: &ErrorNormalizer, input: Input) -> Result<Value> {
    match input {
        Input::One(error) => Ok(Value::Object(normalizer.to_specification(&error)?)),
        Input::Many(errors) => {
            debug!(count = errors.len(), "normalizing errors");
            errors
                .iter()
                .map(|error| normalizer.to_specification(error).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
                .map_err(Into::into)
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    write_json(&mut std::io::stdout().lock(), value, pretty)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{output}").context("failed to write output")?;
    out.flush().context("failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qerr_common::MessagePolicy;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["qerr", "--pretty", "normalize", "errors.json"]).unwrap();
        assert!(cli.pretty);
        assert!(matches!(
            cli.command,
            Commands::Normalize { file: Some(ref f) } if f == &PathBuf::from("errors.json")
        ));

        let cli = Cli::try_parse_from(["qerr", "compare", "a.json", "b.json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Compare { .. }));
    }

    #[test]
    fn test_normalize_list_preserves_order() {
        let input = Input::parse(json!([
            {"message": "first"},
            {"message": "second", "classification": "ExecutionAborted"}
        ]))
        .unwrap();
        let output = normalize(&ErrorNormalizer::new(), input).unwrap();
        assert_eq!(
            output,
            json!([
                {"message": "first"},
                {"message": "second", "extensions": {"classification": "ExecutionAborted"}}
            ])
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_json_to_closed_pipe_is_error() {
        let err = write_json(&mut ClosedPipe, &json!({"message": "boom"}), false).unwrap_err();
        assert!(err.to_string().contains("failed to write output"));
    }

    #[test]
    fn test_write_json_formats() {
        let mut out = Vec::new();
        write_json(&mut out, &json!({"a": 1}), false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n");

        let mut out = Vec::new();
        write_json(&mut out, &json!({"a": 1}), true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_normalize_respects_message_policy() {
        let input = Input::parse(json!({"path": ["a"]})).unwrap();
        let normalizer = ErrorNormalizer::new().with_message_policy(MessagePolicy::OmitAbsent);
        assert_eq!(normalize(&normalizer, input).unwrap(), json!({"path": ["a"]}));
    }
}
