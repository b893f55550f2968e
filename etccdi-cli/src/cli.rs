use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ndarray::Array1;
use tracing::info;

use etccdi::{reduce, Aggregation, Config, Ensemble, Index, Outcome, Source, Store};
use etccdi_netcdf::NetcdfStore;

/// Aggregate ETCCDI climate index ensembles to period means
#[derive(Parser, Debug)]
#[command(name = "etccdi")]
#[command(version)]
pub struct CliArgs {
    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate indices over the analysis period and save one file per index
    Aggregate {
        /// Indices to aggregate, e.g. txx fd r95p
        #[arg(value_name = "INDEX", required_unless_present = "all")]
        indices: Vec<Index>,

        /// Aggregate every known index
        #[arg(long, conflicts_with = "indices")]
        all: bool,

        #[arg(short, long, default_value_t = Source::Model)]
        source: Source,

        #[command(flatten)]
        period: Period,

        /// Replace outputs that exist already
        #[arg(long)]
        overwrite: bool,
    },

    /// Load an aggregated index and print a summary
    Show {
        #[arg(value_name = "INDEX")]
        index: Index,

        #[arg(short, long, default_value_t = Source::Model)]
        source: Source,

        #[command(flatten)]
        period: Period,

        /// Report temperatures in K instead of °C
        #[arg(long)]
        kelvin: bool,
    },

    /// List the known indices
    Indices,
}

/// Overrides for the analysis period of the configuration
#[derive(clap::Args, Debug, Default)]
pub struct Period {
    /// First year of the analysis period
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year of the analysis period
    #[arg(long)]
    pub end: Option<i32>,
}

impl Period {
    fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(start) = self.start {
            config.start_year = start;
        }
        if let Some(end) = self.end {
            config.end_year = end;
        }
        config.validate()?;

        Ok(config)
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let store = NetcdfStore::new();

    match args.command {
        Commands::Aggregate {
            indices,
            all,
            source,
            period,
            overwrite,
        } => {
            let config = period.apply(config)?;
            let indices = if all { Index::ALL.to_vec() } else { indices };
            aggregate(&store, &config, &indices, source, overwrite)
        }
        Commands::Show {
            index,
            source,
            period,
            kelvin,
        } => {
            let config = period.apply(config)?;
            let ensemble = etccdi::load_data(&store, &config, index, source, !kelvin)
                .with_context(|| format!("loading {index} from {source}"))?;
            print!("{}", summary(&ensemble));
            Ok(())
        }
        Commands::Indices => {
            print!("{}", catalog());
            Ok(())
        }
    }
}

fn aggregate(
    store: &dyn Store,
    config: &Config,
    indices: &[Index],
    source: Source,
    overwrite: bool,
) -> Result<()> {
    info!(count = indices.len(), %source, period = config.period().as_str(), "aggregating");
    for &index in indices {
        let outcome = etccdi::run(store, config, index, source, overwrite)
            .with_context(|| format!("aggregating {index} from {source}"))?;
        match outcome {
            Outcome::Written(path) => println!("{index}: wrote {}", path.display()),
            Outcome::Skipped(path) => println!("{index}: {} exists, skipped", path.display()),
        }
    }

    Ok(())
}

/// Members, grid, units and the range of the ensemble mean
pub fn summary(ensemble: &Ensemble) -> String {
    let mean = ensemble.mean();
    let cells = Array1::from_iter(mean.data.iter().copied());
    let missing = cells.iter().filter(|value| value.is_nan()).count();
    let grid: String = ensemble
        .spatial
        .iter()
        .map(|coord| format!("  {}: {}\n", coord.name, coord.len()))
        .collect();

    format!(
        "{}\n  members: {} ({})\n{grid}  units: {}\n  \
         ensemble mean: min {:.3} mean {:.3} max {:.3} ({missing} cells missing)\n",
        ensemble.name,
        ensemble.len(),
        ensemble.members.join(", "),
        ensemble.units().unwrap_or("unknown"),
        reduce(cells.view(), Aggregation::Min),
        reduce(cells.view(), Aggregation::Mean),
        reduce(cells.view(), Aggregation::Max),
    )
}

fn catalog() -> String {
    Index::ALL
        .iter()
        .map(|index| {
            format!(
                "{:<8} {:<8} {:<10} {:<8} {}\n",
                index.name(),
                index.acronym(),
                format!("{:?}", index.aggregation()).to_lowercase(),
                index.units(),
                index.description(),
            )
        })
        .collect()
}
