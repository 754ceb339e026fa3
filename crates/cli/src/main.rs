use anyhow::{bail, Context};
use log::{info, LevelFilter};
use morphogen::{timed, Drawing, GridMesh, Preset, Terrain, TerrainConfig};
use serde::{de::DeserializeOwned, Serialize};
use simple_logger::SimpleLogger;
use std::{
    ffi::OsStr,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for generating procedural geometry via the Morphogen kit.
#[derive(Debug, StructOpt)]
#[structopt(name = "morphogen")]
struct Opt {
    /// The logging level to use during generation. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Grow an L-system and trace it with a turtle. Outputs the traced
    /// polylines, along with the config that produced them, as JSON.
    Lsystem {
        /// Path to a config file that defines the L-system. Supported
        /// formats: JSON, TOML
        #[structopt(short, long)]
        config: Option<PathBuf>,

        /// Run a built-in L-system instead of loading a config. Options:
        /// koch, islands_and_lakes, tree2d, tree3d, stochastic_tree3d
        #[structopt(short, long)]
        preset: Option<Preset>,

        /// File to write output to. If not given, output goes to stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a height field. Outputs a grid mesh (vertices and edges) as
    /// JSON.
    Terrain {
        /// Path to a config file that defines the terrain. Supported formats:
        /// JSON, TOML. If not given, the default config (with a random seed)
        /// is used.
        #[structopt(short, long)]
        config: Option<PathBuf>,

        /// File to write output to. If not given, output goes to stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,

        /// Include a grayscale intensity per vertex, with the lowest
        /// elevation at 0 and the highest at 1
        #[structopt(long)]
        grayscale: bool,
    },
}

/// Supported config file formats, picked by file extension
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum ConfigFormat {
    Json,
    Toml,
}

/// Terrain output, as handed to whatever builds the final mesh
#[derive(Debug, Serialize)]
struct TerrainOutput<'a> {
    config: &'a TerrainConfig,
    mesh: GridMesh,
    #[serde(skip_serializing_if = "Option::is_none")]
    grayscale: Option<Vec<f64>>,
}

fn load_config<T: DeserializeOwned>(config_path: &Path) -> anyhow::Result<T> {
    let format: ConfigFormat = config_path
        .extension()
        .and_then(OsStr::to_str)
        .and_then(|ext| ext.parse().ok())
        .with_context(|| {
            format!(
                "unsupported config file {:?}, expected a .json or .toml file",
                config_path
            )
        })?;
    let contents = fs::read_to_string(config_path).with_context(|| {
        format!("error reading config file {:?}", config_path)
    })?;

    info!("Loading {} config from {:?}", format, config_path);
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(&contents).context("error reading config")
        }
        ConfigFormat::Toml => {
            toml::from_str(&contents).context("error reading config")
        }
    }
}

/// Write output to a file if a path was given, otherwise to stdout
fn write_output(output_path: Option<&Path>, output: &str) -> anyhow::Result<()> {
    match output_path {
        Some(output_path) => timed!(
            format!("Writing output to {:?}", output_path),
            log::Level::Info,
            {
                let mut file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(output_path)
                    .with_context(|| {
                        format!("error opening output file {:?}", output_path)
                    })?;
                file.write_all(output.as_bytes()).with_context(|| {
                    format!("error writing to file {:?}", output_path)
                })?;
            }
        ),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", output).context("error writing to stdout")?;
        }
    }
    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    // Logs go to stderr, so they never mix with JSON on stdout
    SimpleLogger::new().with_level(opt.log_level).init()?;

    match opt.command {
        Command::Lsystem {
            config,
            preset,
            output,
        } => {
            let config = match (config, preset) {
                (Some(config_path), None) => load_config(&config_path)?,
                (None, Some(preset)) => {
                    info!("Using preset {}", preset);
                    preset.config()
                }
                _ => bail!("must pass exactly one of --config or --preset"),
            };
            let drawing = Drawing::generate(config)?;
            info!(
                "Traced {} polylines with {} segments",
                drawing.polylines().len(),
                drawing.polylines().segment_count()
            );
            write_output(output.as_deref(), &drawing.to_json()?)
        }
        Command::Terrain {
            config,
            output,
            grayscale,
        } => {
            let config = match config {
                Some(config_path) => load_config(&config_path)?,
                None => TerrainConfig::default(),
            };
            let terrain = Terrain::generate(config)?;
            let grayscale = if grayscale {
                Some(terrain.field().to_grayscale()?)
            } else {
                None
            };
            let output_data = TerrainOutput {
                config: terrain.config(),
                mesh: terrain.to_mesh(),
                grayscale,
            };
            let json = serde_json::to_string(&output_data)
                .context("error serializing terrain")?;
            write_output(output.as_deref(), &json)
        }
    }
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
