use clap::{Parser, Subcommand};
use cli::{format_analysis, format_match, format_registry, load_config, load_polygons};
use color_eyre::eyre::{eyre, Result};
use shapes::{
    FileStore, ShapeConfig, ShapeManager, ShapeManagerCommand, ShapeManagerOutput,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a .toml or .json configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory the component registry is persisted in
    #[arg(long, global = true, default_value = ".mapmap")]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the polygons of a detector output file
    Analyze {
        /// Detector output (.json) or polygons (.geojson)
        #[arg(short, long)]
        input: PathBuf,
        /// Write the analysis as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Print the analysis as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Teach the registry a label for one analyzed shape
    Register {
        #[arg(short, long)]
        input: PathBuf,
        /// Shape index as listed by `analyze`
        #[arg(long)]
        index: usize,
        #[arg(short, long)]
        label: String,
    },
    /// Find the registered label nearest to one analyzed shape
    Recognize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: usize,
        /// Largest feature distance still reported as a match
        #[arg(long)]
        max_distance: Option<f64>,
    },
    /// List registered components
    Registry,
    /// Print the JSON schema of the configuration or of the manager commands
    Schema {
        #[arg(long)]
        commands: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze { input, geojson, json } => {
            let mut manager = open_manager(&cli)?;
            let output = analyze(&mut manager, input)?;
            let analysis = match output {
                ShapeManagerOutput::Analysis(analysis) => analysis,
                other => return Err(eyre!("analyze produced {other:?}")),
            };

            if let Some(path) = geojson {
                analysis.save_geojson(path)?;
                info!("Wrote GeoJSON to {:?}", path);
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", format_analysis(&analysis));
            }
        }
        Commands::Register { input, index, label } => {
            let mut manager = open_manager(&cli)?;
            analyze(&mut manager, input)?;
            let output = manager.execute(ShapeManagerCommand::Register {
                index: *index,
                label: label.clone(),
            })?;
            let registration = match output {
                ShapeManagerOutput::Registration(registration) => registration,
                other => return Err(eyre!("register produced {other:?}")),
            };

            if let Some(warning) = &registration.warning {
                warn!("{}", warning);
            }
            println!("{}: {} example(s)", registration.label, registration.count);
        }
        Commands::Recognize { input, index, max_distance } => {
            let mut manager = open_manager(&cli)?;
            analyze(&mut manager, input)?;
            let output = manager.execute(ShapeManagerCommand::Recognize {
                index: *index,
                max_distance: *max_distance,
            })?;
            let found = match output {
                ShapeManagerOutput::Recognition(found) => found,
                other => return Err(eyre!("recognize produced {other:?}")),
            };
            println!("{}", format_match(found.as_ref()));
        }
        Commands::Registry => {
            let mut manager = open_manager(&cli)?;
            let output = manager.execute(ShapeManagerCommand::ListRegistry)?;
            let entries = match output {
                ShapeManagerOutput::Registry(entries) => entries,
                other => return Err(eyre!("registry listing produced {other:?}")),
            };
            print!("{}", format_registry(&entries));
        }
        Commands::Schema { commands } => {
            let schema = if *commands {
                serde_json::to_string_pretty(&ShapeManagerCommand::schema())?
            } else {
                serde_json::to_string_pretty(&ShapeConfig::schema())?
            };
            println!("{schema}");
        }
    }

    Ok(())
}

fn open_manager(cli: &Cli) -> Result<ShapeManager> {
    let config = load_config(cli.config.as_deref())?;
    Ok(ShapeManager::new(&config, FileStore::new(&cli.store_dir)))
}

fn analyze(manager: &mut ShapeManager, input: &Path) -> Result<ShapeManagerOutput> {
    let polygons = load_polygons(input)?;
    info!("Loaded {} polygons from {:?}", polygons.len(), input);
    manager.set_polygons(polygons);
    Ok(manager.execute(ShapeManagerCommand::Analyze)?)
}
