//! AMR - antimicrobial resistance surveillance CLI
//!
//! Command-line interface for computing surveillance summaries from a
//! cleaned isolate table.

use amr_surveillance::data::{Dataset, LoadOptions};
use amr_surveillance::error::Result;
use amr_surveillance::export::long_format;
use amr_surveillance::filter::FilterRequest;
use amr_surveillance::pipeline::{Analysis, AnalysisConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Output format for reports.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

/// Antimicrobial resistance surveillance statistics
#[derive(Parser)]
#[command(name = "amr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Input table options shared by subcommands.
#[derive(Args)]
struct InputArgs {
    /// Path to the isolate table (CSV, or TSV by extension)
    #[arg(short, long)]
    input: PathBuf,

    /// Treat ESBL/MDR values other than YES as NO instead of failing
    #[arg(long)]
    lenient_flags: bool,
}

impl InputArgs {
    fn load(&self) -> Result<Dataset> {
        let mut options = LoadOptions::default();
        if self.lenient_flags {
            options = options.lenient_flags();
        }
        info!("Loading isolates from {:?}...", self.input);
        let dataset = Dataset::from_csv(&self.input, &options)?;
        info!(
            "Loaded {} isolates x {} antibiotics",
            dataset.n_isolates(),
            dataset.n_antibiotics()
        );
        Ok(dataset)
    }
}

/// Filter options shared by subcommands.
#[derive(Args)]
struct FilterArgs {
    /// Restrict to one gender (M, F, or another recorded value; ALL for none)
    #[arg(long)]
    gender: Option<String>,

    /// Restrict to one sample type, case-insensitive (ALL for none)
    #[arg(long)]
    sample_type: Option<String>,
}

impl FilterArgs {
    /// Command-line filters override the configured ones per dimension.
    fn apply(&self, mut filter: FilterRequest) -> FilterRequest {
        if let Some(g) = &self.gender {
            filter.gender = Some(g.clone());
        }
        if let Some(s) = &self.sample_type {
            filter.sample_type = Some(s.clone());
        }
        filter
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a surveillance report
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Optional analysis configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Write the per-isolate export table (and optionally the long format)
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output path for the wide CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Output path for the long-format CSV
        #[arg(long)]
        long: Option<PathBuf>,

        /// MAR risk threshold
        #[arg(long, default_value = "0.2")]
        risk_threshold: f64,
    },

    /// Run an analysis from a YAML configuration and write the report as JSON
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Output path for the JSON report
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Report {
            input,
            filter,
            config,
            format,
        } => cmd_report(&input, &filter, config.as_deref(), format),

        Commands::Export {
            input,
            filter,
            output,
            long,
            risk_threshold,
        } => cmd_export(&input, &filter, &output, long.as_deref(), risk_threshold),

        Commands::Run {
            config,
            input,
            output,
        } => cmd_run(&config, &input, &output),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => {
            info!("Loading analysis configuration from {:?}...", p);
            AnalysisConfig::from_yaml(&std::fs::read_to_string(p)?)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

/// Print a report to stdout
fn cmd_report(
    input: &InputArgs,
    filter: &FilterArgs,
    config_path: Option<&Path>,
    format: Format,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.filter = filter.apply(config.filter);

    let dataset = input.load()?;
    let report = Analysis::from_config(&config).run(&dataset)?;

    match format {
        Format::Json => println!("{}", report.to_json()?),
        Format::Yaml => println!("{}", report.to_yaml()?),
        Format::Text => print!("{}", report),
    }
    Ok(())
}

/// Write export tables
fn cmd_export(
    input: &InputArgs,
    filter: &FilterArgs,
    output: &Path,
    long: Option<&Path>,
    risk_threshold: f64,
) -> Result<()> {
    let dataset = input.load()?;
    let analysis = Analysis::new()
        .filter(filter.apply(FilterRequest::all()))
        .risk_threshold(risk_threshold);

    let report = analysis.run(&dataset)?;
    let filtered = analysis.filtered(&dataset);

    info!("Writing export table to {:?}...", output);
    let table = report.export_table(&filtered)?;
    table.to_csv(output)?;
    info!("Wrote {} rows", table.n_rows());

    if let Some(path) = long {
        info!("Writing long-format table to {:?}...", path);
        let long_table = long_format(&filtered);
        long_table.to_csv(path)?;
        info!("Wrote {} rows", long_table.n_rows());
    }
    Ok(())
}

/// Run an analysis from configuration
fn cmd_run(config_path: &Path, input: &InputArgs, output: &Path) -> Result<()> {
    let config = load_config(Some(config_path))?;
    let dataset = input.load()?;

    info!("Running analysis '{}'...", config.name);
    let report = Analysis::from_config(&config).run(&dataset)?;

    info!("Writing report to {:?}...", output);
    std::fs::write(output, report.to_json()?)?;

    info!(
        "Done! {} isolates analysed, {} MDR profiles",
        report.filtered_isolates,
        report.profiles.len()
    );
    Ok(())
}

/// Write an example configuration
fn cmd_example(output: &Path) -> Result<()> {
    let config = Analysis::new()
        .name("urine-isolates")
        .filter(FilterRequest::all().sample_type("URINE"))
        .to_config();

    let yaml = format!(
        "# AMR surveillance analysis configuration\n\
         # filter: gender / sample_type may be null or ALL for no restriction\n\
         # risk_threshold: MAR index at or below which an isolate is LOW risk\n\
         # top_profiles: profiles listed in text reports (0 = all)\n\n{}",
        config.to_yaml()?
    );
    std::fs::write(output, yaml)?;
    info!("Wrote example configuration to {:?}", output);
    Ok(())
}
