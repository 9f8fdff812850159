use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hqc_engine::config::Settings;
use hqc_engine::optimizer::{BoostLevel, OptimizeOptions, Pattern, PromptOptimizer};
use hqc_engine::types::{Axis, WeakPoint};
use hqc_engine::weak_points::{detect_weak_axis, summarize, WeakPointSummary};
use hqc_engine::{AnalysisContext, Analyzer};

#[derive(Parser)]
#[command(
    name = "hqc-engine",
    about = "Score hotel review articles on the H/Q/C rubric and build reinforced prompts",
    version
)]
struct Cli {
    /// Settings JSON file (weights, threshold, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the full analysis of each article (reads stdin if none provided)
    Analyze {
        files: Vec<PathBuf>,
        /// Hotel name used for keyphrase density
        #[arg(long, default_value = "")]
        hotel: String,
    },
    /// Print the weak points and weak axes of each article
    WeakPoints {
        files: Vec<PathBuf>,
        #[arg(long, default_value = "")]
        hotel: String,
        /// Number of weak points listed before collapsing the rest
        #[arg(long, default_value_t = 5)]
        shown: usize,
    },
    /// Append reinforcement instructions to a base prompt
    Optimize {
        #[arg(long)]
        prompt_file: PathBuf,
        #[arg(long, default_value = "")]
        hotel: String,
        /// Weak point such as H:emotion (repeatable)
        #[arg(long = "weak")]
        weak_points: Vec<WeakPoint>,
        /// Pattern id to force (repeatable)
        #[arg(long = "pattern")]
        patterns: Vec<Pattern>,
        #[arg(long, default_value = "normal")]
        boost: BoostLevel,
        /// Apply the core pattern set aimed at a total of 80
        #[arg(long)]
        target_80: bool,
    },
}

#[derive(Serialize)]
struct WeakPointReport {
    source: String,
    total_score: f64,
    weak_axes: Vec<Axis>,
    weak_points: WeakPointSummary,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn read_inputs(files: &[PathBuf]) -> CliResult<Vec<(String, String)>> {
    if files.is_empty() {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(vec![("<stdin>".to_string(), input)]);
    }
    files
        .iter()
        .map(|path| -> CliResult<(String, String)> {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            Ok((path.display().to_string(), text))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> CliResult<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let analyzer = Analyzer::from_settings(&settings);

    match cli.command {
        Command::Analyze { files, hotel } => {
            let ctx = AnalysisContext::for_hotel(hotel);
            for (_, text) in read_inputs(&files)? {
                print_json(&analyzer.analyze(&text, &ctx))?;
            }
        }
        Command::WeakPoints { files, hotel, shown } => {
            let ctx = AnalysisContext::for_hotel(hotel);
            for (source, text) in read_inputs(&files)? {
                let result = analyzer.analyze(&text, &ctx);
                print_json(&WeakPointReport {
                    source,
                    total_score: result.total_score,
                    weak_axes: detect_weak_axis(&result).into_iter().collect(),
                    weak_points: summarize(&result.weak_points, shown),
                })?;
            }
        }
        Command::Optimize {
            prompt_file,
            hotel,
            weak_points,
            patterns,
            boost,
            target_80,
        } => {
            let prompt = std::fs::read_to_string(&prompt_file)
                .map_err(|e| format!("Error reading {}: {e}", prompt_file.display()))?;
            let optimizer = PromptOptimizer::new();
            let result = if target_80 {
                optimizer.optimize_for_80(&prompt, &hotel)
            } else {
                optimizer.optimize(
                    &prompt,
                    &hotel,
                    &OptimizeOptions {
                        weak_points,
                        boost_level: boost,
                        force_patterns: patterns,
                    },
                )
            };
            print_json(&result)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hqc_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hqc-engine failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
