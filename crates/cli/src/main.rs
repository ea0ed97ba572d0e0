// odflow - spatial-interaction models and migration OD matrices from the shell

mod exit_codes;
mod migration;
mod models;
mod table;

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use odflow_migration::MigrationError;
use odflow_models::ModelError;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    EXIT_CONFIG, EXIT_DUPLICATE, EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SHAPE, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "odflow")]
#[command(about = "Origin-destination flow models and migration matrices")]
#[command(version)]
struct Cli {
    /// Increase log detail on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank intervening opportunities from a feature vector and a cost matrix
    #[command(after_help = "\
Examples:
  odflow rank --features population.txt --cost distance.csv
  odflow rank --features population.txt --cost distance.csv -o s.csv
  odflow rank --features population.txt --cost distance.csv --reference")]
    Rank(models::RankArgs),

    /// Predict flow probabilities with an interaction model
    #[command(after_help = "\
Examples:
  odflow predict --model radiation --origins pop.txt --cost distance.csv
  odflow predict --model extended-radiation --alpha 0.5 --origins pop.txt --cost distance.csv
  odflow predict --model gravity --alpha 2 --decay power --origins pop.txt --cost distance.csv
  odflow predict --model radiation --origins pop.txt --cost s.csv --cost-is-opportunity
  odflow predict --model gravity --alpha 0.1 --decay exponential --origins pop.txt \\
      --cost distance.csv --verify --normalize -o p.csv")]
    Predict(models::PredictArgs),

    /// Build a reconciled county-to-county migration matrix for one year
    #[command(after_help = "\
Examples:
  odflow matrix --year 2012 --locations counties.txt --data-dir data/raw/migration
  odflow matrix --year 2007 --locations counties.txt --data-dir data --catalog years.toml -o od2007.csv
  odflow matrix --year 2012 --locations counties.txt --data-dir data -o od.csv --json")]
    Matrix(migration::MatrixArgs),

    /// List the locations reported in every year of a range
    #[command(after_help = "\
Examples:
  odflow common --data-dir data/raw/migration
  odflow common --data-dir data --years 2008-2012 -o counties.txt
  odflow common --data-dir data --catalog years.toml --all-states")]
    Common(migration::CommonArgs),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Rank(args) => models::cmd_rank(args),
        Commands::Predict(args) => models::cmd_predict(args),
        Commands::Matrix(args) => migration::cmd_matrix(args),
        Commands::Common(args) => migration::cmd_common(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::new(EXIT_SHAPE, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ModelError> for CliError {
    fn from(err: ModelError) -> Self {
        match &err {
            ModelError::NotColumn { .. } => Self::shape(err.to_string())
                .with_hint("mass vectors are one value per line"),
            ModelError::ShapeMismatch { .. } => Self::shape(err.to_string()),
            ModelError::UnknownDecay(_) => {
                Self::usage(err.to_string()).with_hint("use 'power' or 'exponential'")
            }
            ModelError::InvalidParameter { .. } => Self::usage(err.to_string()),
        }
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        let code = match &err {
            MigrationError::DuplicateLocation(_) | MigrationError::DuplicateKey(_) => EXIT_DUPLICATE,
            MigrationError::MissingColumn { .. } | MigrationError::Parse { .. } => EXIT_PARSE,
            MigrationError::UnknownYear(_)
            | MigrationError::ConfigParse(_)
            | MigrationError::ConfigValidation(_) => EXIT_CONFIG,
            MigrationError::Io(_) => EXIT_IO,
        };
        let hint = match &err {
            MigrationError::DuplicateLocation(_) => {
                Some("each location id must appear once in the --locations file")
            }
            MigrationError::UnknownYear(_) => Some("add the year to the --catalog file"),
            _ => None,
        };
        CliError { code, message: err.to_string(), hint: hint.map(String::from) }
    }
}
