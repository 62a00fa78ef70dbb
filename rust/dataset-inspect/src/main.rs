//! Dataset Inspection Tool
//!
//! Command-line front end over `dataset-core` for looking at per-tensor
//! batch datasets.
//!
//! # Usage
//!
//! ```bash
//! # List tensors and the number of complete batches
//! dataset-inspect info ./calibration
//!
//! # Print an XXHash64 per tensor per batch
//! dataset-inspect checksum ./calibration --max-batches 8
//!
//! # Compare a result dataset against a golden one
//! dataset-inspect compare ./golden ./result --dtype f32 --atol 1e-4
//!
//! # Take defaults from a configuration file
//! dataset-inspect --config inspect.toml info
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_core::{ElementType, InspectConfig};

/// Per-tensor batch dataset inspector
#[derive(Parser, Debug)]
#[command(name = "dataset-inspect")]
#[command(about = "Inspect and compare per-tensor binary batch datasets")]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the manifest and the number of complete batches
    Info {
        /// Dataset folder (defaults to dataset.folder from the config)
        folder: Option<PathBuf>,

        /// Cap on the number of batches
        #[arg(long)]
        max_batches: Option<usize>,
    },

    /// Print an XXHash64 checksum per tensor per batch
    Checksum {
        /// Dataset folder (defaults to dataset.folder from the config)
        folder: Option<PathBuf>,

        /// Cap on the number of batches
        #[arg(long)]
        max_batches: Option<usize>,

        /// Only read the first N tensors of each batch
        #[arg(long)]
        num_datas: Option<usize>,
    },

    /// Compare a result dataset against a golden dataset
    Compare {
        /// Golden dataset folder
        golden: PathBuf,

        /// Result dataset folder
        result: PathBuf,

        /// Element type of every tensor (f32, f64, i32, u8, ...)
        #[arg(long, value_parser = clap::value_parser!(ElementType))]
        dtype: Option<ElementType>,

        /// Absolute tolerance
        #[arg(long)]
        atol: Option<f64>,

        /// Relative tolerance
        #[arg(long)]
        rtol: Option<f64>,

        /// Cap on the number of batches
        #[arg(long)]
        max_batches: Option<usize>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = tracing_subscriber::filter::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> dataset_core::Result<bool> {
    let mut config = match &args.config {
        Some(path) => InspectConfig::from_file(path)?,
        None => InspectConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    tracing::debug!("Effective configuration: {:?}", config);

    match args.command {
        Command::Info {
            folder,
            max_batches,
        } => {
            let folder = folder.unwrap_or_else(|| config.dataset.folder.clone());
            let max_batches = max_batches.or(config.dataset.max_batches);
            commands::info(&folder, max_batches)?;
            Ok(true)
        }
        Command::Checksum {
            folder,
            max_batches,
            num_datas,
        } => {
            let folder = folder.unwrap_or_else(|| config.dataset.folder.clone());
            let max_batches = max_batches.or(config.dataset.max_batches);
            let num_datas = num_datas.or(config.dataset.num_datas);
            commands::checksum(&folder, max_batches, num_datas)?;
            Ok(true)
        }
        Command::Compare {
            golden,
            result,
            dtype,
            atol,
            rtol,
            max_batches,
        } => {
            if let Some(dtype) = dtype {
                config.compare.dtype = dtype;
            }
            if let Some(atol) = atol {
                config.compare.atol = atol;
            }
            if let Some(rtol) = rtol {
                config.compare.rtol = rtol;
            }
            config.validate()?;
            let max_batches = max_batches.or(config.dataset.max_batches);
            commands::compare(&golden, &result, &config.compare, max_batches)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_parsed_by_clap() {
        let args = Args::try_parse_from(["dataset-inspect", "compare", "g", "r", "--dtype", "i64"])
            .unwrap();
        match args.command {
            Command::Compare { dtype, .. } => assert_eq!(dtype, Some(ElementType::I64)),
            _ => panic!("expected compare"),
        }

        let err = Args::try_parse_from(["dataset-inspect", "compare", "g", "r", "--dtype", "f16"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
