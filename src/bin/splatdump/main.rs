//! splatdump CLI - generate and inspect splat renderer fixtures.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use splatdump::dump::DumpFile;
use splatdump::scene::{self, Fixture, SceneConfig, WriteStats, FIELD_NAMES, NUM_FIELDS};

#[derive(Parser)]
#[command(
    name = "splatdump",
    version,
    about = "Gaussian-splat renderer fixture generator"
)]
struct Cli {
    /// More output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Trace output, same as -vv.
    #[arg(long, global = true)]
    trace: bool,
    /// Only warnings and errors.
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "trace"])]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one uniform-cube fixture.
    Generate {
        /// Number of splats.
        #[arg(short = 'n', long)]
        count: usize,
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Generate the standard dataset suite (100k .. 2000k).
    Suite {
        /// Output directory.
        #[arg(long, default_value = scene::DEFAULT_DIR)]
        dir: PathBuf,
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Convert a trained 3DGS PLY export into a fixture.
    ImportPly {
        /// Input PLY file.
        input: PathBuf,
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// List the values stored in a dump file.
    Inspect {
        path: PathBuf,
        /// Print JSON instead of a table.
        #[arg(short, long)]
        json: bool,
        /// Elements shown per preview.
        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
}

#[derive(Args)]
struct SceneArgs {
    /// Scene config (JSON); defaults apply to missing fields.
    #[arg(long = "scene", value_name = "JSON")]
    path: Option<PathBuf>,
}

impl SceneArgs {
    fn load(&self) -> Result<SceneConfig> {
        SceneConfig::load_or_default(self.path.as_deref()).with_context(|| match &self.path {
            Some(p) => format!("load scene config {}", p.display()),
            None => "default scene config".to_string(),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Command::Generate { count, output, scene } => {
            let config = scene.load()?;
            let stats = Fixture::generate(count, &config)
                .write(&output)
                .with_context(|| format!("write fixture {}", output.display()))?;
            report(&stats);
        }
        Command::Suite { dir, scene } => {
            let config = scene.load()?;
            let stats = scene::generate_suite(&dir, &scene::DATASET_SIZES, &config)
                .with_context(|| format!("generate suite in {}", dir.display()))?;
            stats.iter().for_each(report);
        }
        Command::ImportPly { input, output, scene } => {
            let config = scene.load()?;
            let fixture = Fixture::from_ply(&input, &config)
                .with_context(|| format!("read PLY {}", input.display()))?;
            if fixture.is_empty() {
                warn!(input = %input.display(), "PLY holds no splats");
            }
            let stats = fixture
                .write(&output)
                .with_context(|| format!("write fixture {}", output.display()))?;
            report(&stats);
        }
        Command::Inspect { path, json, limit } => cmd_inspect(&path, json, limit)?,
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.trace || cli.verbose >= 2 {
        "trace"
    } else if cli.verbose == 1 {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn report(stats: &WriteStats) {
    info!(
        "{}: {} splats, {} values, {} bytes",
        stats.path.display(),
        stats.splats,
        stats.num_values,
        stats.bytes
    );
}

#[derive(Serialize)]
struct ValueInfo {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'static str>,
    offset: u64,
    tag: &'static str,
    rank: usize,
    shape: Vec<u64>,
    bytes: u64,
    preview: String,
}

fn cmd_inspect(path: &Path, json: bool, limit: usize) -> Result<()> {
    let file = DumpFile::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = file.reader();
    let mut infos = Vec::new();
    while let Some(header) = reader
        .read_header()
        .with_context(|| format!("read value {} of {}", infos.len(), path.display()))?
    {
        let value = reader
            .read_payload(&header)
            .with_context(|| format!("read value {} of {}", infos.len(), path.display()))?;
        infos.push(ValueInfo {
            index: infos.len(),
            name: None,
            offset: header.offset,
            tag: header.element_type.name(),
            rank: header.rank(),
            shape: value.shape().to_vec(),
            bytes: header.encoded_len(),
            preview: value.preview(limit),
        });
    }
    // Name the slots when the file has the fixture layout.
    if infos.len() == NUM_FIELDS {
        for (info, name) in infos.iter_mut().zip(FIELD_NAMES) {
            info.name = Some(name);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{}: {} values, {} bytes", path.display(), infos.len(), file.size());
    for info in &infos {
        let shape = if info.shape.is_empty() {
            "scalar".to_string()
        } else {
            format!("{:?}", info.shape)
        };
        println!(
            "  {:>3} {:<6} {} {:<12} {:>10}  {}",
            info.index,
            info.name.unwrap_or("-"),
            info.tag,
            shape,
            info.bytes,
            info.preview
        );
    }
    Ok(())
}
