mod logic;
mod util;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;
use summit_game::{Catalog, HeightSource, LevelProperties, MissionConfig, SlopePolicy};

use logic::{LoadedTrack, MissionRunner, Pacing, RunSettings, RunSummary, resolve_track};
use util::split_csv;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SlopeArg {
    /// Elevation delta per sample
    Raw,
    /// Elevation delta per metre of horizontal distance
    Normalized,
}

impl From<SlopeArg> for SlopePolicy {
    fn from(value: SlopeArg) -> Self {
        match value {
            SlopeArg::Raw => Self::RawDelta,
            SlopeArg::Normalized => Self::DistanceNormalized,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeightArg {
    /// Climb to the level's configured height
    Level,
    /// Climb to the loaded track's highest point
    Terrain,
}

impl From<HeightArg> for HeightSource {
    fn from(value: HeightArg) -> Self {
        match value {
            HeightArg::Level => Self::Level,
            HeightArg::Terrain => Self::Terrain,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "summit-tester", version = "0.1.0")]
#[command(about = "Headless mission and campaign runner for the Summit game core")]
struct Args {
    /// Levels to play (comma-separated names, or "all")
    #[arg(long, default_value = "all")]
    levels: String,

    /// Play levels in order on one player, carrying rewards between them
    #[arg(long)]
    campaign: bool,

    /// Attempts per level in campaign mode
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// GPX file supplying the elevation track
    #[arg(long)]
    gpx: Option<PathBuf>,

    /// Generate a seeded synthetic track instead of loading GPX
    #[arg(long)]
    synthetic_seed: Option<u64>,

    /// How slopes are derived from the track
    #[arg(long, value_enum, default_value_t = SlopeArg::Raw)]
    slope_policy: SlopeArg,

    /// Where a mission's target height comes from
    #[arg(long, value_enum, default_value_t = HeightArg::Level)]
    height_source: HeightArg,

    /// Mission config JSON overriding the bundled defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick budget per mission; exceeding it fails the run
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Drive ticks on the wall clock instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List bundled levels and exit
    #[arg(long)]
    list_levels: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let catalog = Catalog::load_bundled().context("bundled catalog is malformed")?;

    if maybe_list_levels(&args, &catalog)? {
        return Ok(());
    }

    if args.output.is_some() || args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = build_config(&args)?;
    let levels = select_levels(&catalog, &args.levels)?;
    let track = resolve_track(args.gpx.as_deref(), args.synthetic_seed)?;
    let track_summary = track.as_ref().map(LoadedTrack::summary).transpose()?;

    let settings = RunSettings {
        config: config.clone(),
        max_ticks: args.max_ticks,
        attempts: args.attempts,
        pacing: if args.realtime {
            Pacing::Realtime
        } else {
            Pacing::Instant
        },
        verbose: args.verbose,
    };
    let runner = MissionRunner::new(catalog, track, settings);
    let (missions, final_stats) = if args.campaign {
        let (records, stats) = runner.run_campaign(&levels).await?;
        (records, Some(stats))
    } else {
        (runner.run_isolated(&levels).await?, None)
    };

    let summary = RunSummary {
        generated_at: Utc::now().to_rfc3339(),
        mode: if args.campaign { "campaign" } else { "isolated" },
        slope_policy: config.slope_policy,
        height_source: config.height_source,
        track: track_summary,
        missions,
        final_stats,
    };
    write_reports(&args, &summary, start_time)?;

    if summary.timeouts() > 0 {
        eprintln!(
            "❌ {} mission(s) exceeded the {} tick limit",
            summary.timeouts(),
            args.max_ticks
        );
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

fn maybe_list_levels(args: &Args, catalog: &Catalog) -> Result<bool> {
    if !args.list_levels {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available levels:")?;
    for level in &catalog.levels {
        let requirements = if level.required_items().is_empty() {
            String::new()
        } else {
            format!(", needs {}", level.required_items().join(", "))
        };
        writeln!(
            output_target.writer(),
            "  {:20} - {:>6.0} m, unlock {}, +{:.0} money, +{:.0} stamina{requirements}",
            level.name,
            level.max_height,
            level.required_level,
            level.reward_money,
            level.reward_stamina
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⛰️  Summit Mission Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn build_config(args: &Args) -> Result<MissionConfig> {
    let base = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            MissionConfig::from_json(&raw)
                .with_context(|| format!("invalid mission config {}", path.display()))?
        }
        None => MissionConfig::load_from_static(),
    };
    Ok(base
        .with_slope_policy(args.slope_policy.into())
        .with_height_source(args.height_source.into()))
}

fn select_levels(catalog: &Catalog, levels_arg: &str) -> Result<Vec<LevelProperties>> {
    let names = split_csv(levels_arg);
    if names.is_empty() || names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        return Ok(catalog.levels.clone());
    }
    names
        .iter()
        .map(|name| catalog.level(name).cloned().map_err(anyhow::Error::from))
        .collect()
}

fn write_reports(args: &Args, summary: &RunSummary, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, summary)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, summary)?,
        _ => {
            let duration = start_time.elapsed();
            if summary.missions.is_empty() {
                writeln!(&mut output_target, "No missions executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, summary, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
