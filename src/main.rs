//! Price estimator command-line front end.

use clap::{ArgAction, Args, Parser, Subcommand};
use price_estimator::config::Config;
use price_estimator::form::{BuildingState, FormController, Peb, PropertyForm};
use price_estimator::pipeline::Estimator;
use price_estimator::predictor::locate_latest_model;
use price_estimator::schema::SchemaBuilder;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "price-estimator")]
#[command(about = "Estimate real-estate prices from property attributes", version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Training data CSV (overrides config)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Model artifact directory (overrides config)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the feature schema derived from the training data
    Schema {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the model artifact that would be loaded
    LatestModel,

    /// Estimate the price of one property
    Estimate(EstimateArgs),

    /// Read `field=value` lines from stdin and estimate after each line
    Interactive,
}

/// Property attributes; anything omitted keeps its form default.
#[derive(Args)]
struct EstimateArgs {
    #[arg(long)]
    postal_code: Option<u32>,
    #[arg(long)]
    bathroom_count: Option<u32>,
    #[arg(long)]
    bedroom_count: Option<u32>,
    #[arg(long)]
    construction_year: Option<u32>,
    #[arg(long)]
    number_of_facades: Option<u32>,
    /// Plot area in m²
    #[arg(long)]
    surface_of_plot: Option<u32>,
    /// Living area in m²
    #[arg(long)]
    living_area: Option<u32>,
    /// Garden area in m²
    #[arg(long)]
    garden_area: Option<u32>,
    #[arg(long)]
    toilet_count: Option<u32>,
    #[arg(long)]
    room_count: Option<u32>,
    #[arg(long)]
    swimming_pool: bool,
    #[arg(long)]
    terrace: bool,
    #[arg(long)]
    fireplace: bool,
    #[arg(long)]
    furnished: bool,
    /// Energy class (A++, A+, A .. G, Unknown)
    #[arg(long)]
    peb: Option<Peb>,
    /// Building state code or label, e.g. GOOD or "To be done up"
    #[arg(long)]
    state_of_building: Option<BuildingState>,
}

impl EstimateArgs {
    fn into_form(self) -> PropertyForm {
        let defaults = PropertyForm::default();
        PropertyForm {
            postal_code: self.postal_code.unwrap_or(defaults.postal_code),
            bathroom_count: self.bathroom_count.unwrap_or(defaults.bathroom_count),
            bedroom_count: self.bedroom_count.unwrap_or(defaults.bedroom_count),
            construction_year: self.construction_year.unwrap_or(defaults.construction_year),
            number_of_facades: self.number_of_facades.unwrap_or(defaults.number_of_facades),
            surface_of_plot: self.surface_of_plot.unwrap_or(defaults.surface_of_plot),
            living_area: self.living_area.unwrap_or(defaults.living_area),
            garden_area: self.garden_area.unwrap_or(defaults.garden_area),
            swimming_pool: self.swimming_pool,
            terrace: self.terrace,
            fireplace: self.fireplace,
            furnished: self.furnished,
            toilet_count: self.toilet_count.unwrap_or(defaults.toilet_count),
            room_count: self.room_count.unwrap_or(defaults.room_count),
            peb: self.peb.unwrap_or(defaults.peb),
            state_of_building: self.state_of_building.unwrap_or(defaults.state_of_building),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("price_estimator={},warn", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Schema { json } => show_schema(&config, json),
        Commands::LatestModel => {
            let handle = locate_latest_model(&config.model_dir, &config.model_extensions)?;
            println!("{}", handle.path().display());
            Ok(())
        }
        Commands::Estimate(args) => {
            let estimator = Estimator::bootstrap(&config)?;
            let mut controller = FormController::new(estimator, config.currency.clone());
            println!("{}", controller.submit(args.into_form())?);
            Ok(())
        }
        Commands::Interactive => interactive(&config),
    }
}

fn show_schema(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fit = SchemaBuilder::new().build_from_csv(&config.data_path, &config.target_column)?;
    if json {
        let value = serde_json::json!({
            "target": config.target_column,
            "columns": fit.schema.columns(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for column in fit.schema.iter() {
            println!("{}", column);
        }
    }
    Ok(())
}

fn interactive(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let estimator = Estimator::bootstrap(config)?;
    let mut controller = FormController::new(estimator, config.currency.clone());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "enter field=value pairs, an empty line re-submits, 'quit' exits")?;

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }

        if let Err(e) = controller.session_mut().apply_line(line) {
            writeln!(stdout, "error: {}", e)?;
            continue;
        }

        match controller.submit_session() {
            Ok(shown) => writeln!(stdout, "The predicted price is: {}", shown)?,
            Err(e) => writeln!(stdout, "error: {}", e)?,
        }
    }
    Ok(())
}
