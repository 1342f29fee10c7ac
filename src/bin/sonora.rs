//! Sonora CLI - Command-line interface for the Sonora recommendation engine
//!
//! Commands:
//! - recommend: Compute one recommendation from flags
//! - run: Process streaming requests from stdin (streaming mode)
//! - simulate: Drive recommendations from a simulated wearable
//! - modes: List therapy modes
//! - doctor: Diagnose model and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use sonora::model::{FileModelLoader, ModelSlot, ModelStatus};
use sonora::modes::TherapyMode;
use sonora::wearable::{BiometricSource, SimulatedWearable};
use sonora::{
    BiometricSnapshot, ComputeError, Recommender, RecommenderConfig, SoundRecommendation,
    PRODUCER_NAME, SONORA_VERSION,
};

/// How long the CLI waits for a model file before carrying on without it
const MODEL_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Sonora - On-device soundscape recommendation engine
#[derive(Parser)]
#[command(name = "sonora")]
#[command(author = "Synheart AI Inc")]
#[command(version = SONORA_VERSION)]
#[command(about = "Map mood and biometrics to therapy soundscapes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single recommendation
    Recommend {
        /// Mood / therapy mode (relaxation, focus, sleep; others use relaxation)
        #[arg(short, long, default_value = "relaxation")]
        mood: String,

        /// Heart rate (bpm)
        #[arg(long, default_value = "70")]
        heart_rate: f64,

        /// Stress level (0-100)
        #[arg(long, default_value = "50")]
        stress: f64,

        /// Sleep quality (0-100)
        #[arg(long, default_value = "50")]
        sleep_quality: f64,

        /// Activity level (0-100)
        #[arg(long, default_value = "50")]
        activity: f64,

        /// Previous recommendation JSON to merge from
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Save the resulting recommendation to this file
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,

        /// Include diagnostics (resolved mode, fallback, model use)
        #[arg(long)]
        report: bool,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Process streaming requests from stdin (streaming mode)
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Include diagnostics in each output record
        #[arg(long)]
        report: bool,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Generate recommendations from a simulated wearable
    Simulate {
        /// Mood / therapy mode
        #[arg(short, long, default_value = "relaxation")]
        mood: String,

        /// RNG seed for the simulated readings
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of readings to take
        #[arg(long, default_value = "5")]
        count: usize,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List therapy modes
    Modes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose model and configuration
    Doctor {
        /// Check a model file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Predictive model file (linear model JSON)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Recommender configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// One line of `run` input
#[derive(Deserialize)]
struct StreamRequest {
    #[serde(default = "default_mood")]
    mood: String,
    biometrics: BiometricSnapshot,
}

fn default_mood() -> String {
    TherapyMode::Relaxation.as_str().to_string()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SonoraCliError> {
    match cli.command {
        Commands::Recommend {
            mood,
            heart_rate,
            stress,
            sleep_quality,
            activity,
            prior,
            save,
            engine,
            report,
            output_format,
        } => {
            let snapshot = BiometricSnapshot::new(heart_rate, stress, sleep_quality, activity);
            cmd_recommend(
                &mood,
                &snapshot,
                prior.as_deref(),
                save.as_deref(),
                &engine,
                report,
                output_format,
            )
        }

        Commands::Run {
            engine,
            report,
            flush,
        } => cmd_run(&engine, report, flush),

        Commands::Simulate {
            mood,
            seed,
            count,
            engine,
        } => cmd_simulate(&mood, seed, count, &engine),

        Commands::Modes { json } => cmd_modes(json),

        Commands::Doctor {
            model,
            config,
            json,
        } => cmd_doctor(model.as_deref(), config.as_deref(), json),
    }
}

/// Build a recommender from config and model flags.
///
/// A model that fails to load is logged and skipped; it never fails the command.
fn build_recommender(engine: &EngineArgs) -> Result<Recommender, SonoraCliError> {
    let config = match &engine.config {
        Some(path) => RecommenderConfig::from_json(&fs::read_to_string(path)?)?,
        None => RecommenderConfig::default(),
    };

    let mut recommender = Recommender::with_config(config);

    if let Some(model_path) = &engine.model {
        let mut slot = ModelSlot::spawn(FileModelLoader::new(model_path));
        slot.wait(MODEL_LOAD_TIMEOUT);
        recommender.set_model(slot);
    }

    Ok(recommender)
}

fn cmd_recommend(
    mood: &str,
    snapshot: &BiometricSnapshot,
    prior: Option<&Path>,
    save: Option<&Path>,
    engine: &EngineArgs,
    report: bool,
    output_format: OutputFormat,
) -> Result<(), SonoraCliError> {
    let mut recommender = build_recommender(engine)?;

    if let Some(prior_path) = prior {
        recommender.load_current(&fs::read_to_string(prior_path)?)?;
    }

    let result = recommender.recommend_detailed(mood, snapshot);

    if let Some(save_path) = save {
        fs::write(save_path, recommender.save_current()?)?;
    }

    let output = if report {
        format_json(&result, &output_format)?
    } else {
        format_json(&result.recommendation, &output_format)?
    };
    println!("{}", output);

    Ok(())
}

fn cmd_run(engine: &EngineArgs, report: bool, flush: bool) -> Result<(), SonoraCliError> {
    let mut recommender = build_recommender(engine)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let request: StreamRequest = serde_json::from_str(trimmed).map_err(|e| {
            SonoraCliError::ParseError(format!("Failed to parse request on line {}: {}", index + 1, e))
        })?;

        let result = recommender.recommend_detailed(&request.mood, &request.biometrics);

        if report {
            writeln!(stdout, "{}", serde_json::to_string(&result)?)?;
        } else {
            writeln!(stdout, "{}", serde_json::to_string(&result.recommendation)?)?;
        }

        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn cmd_simulate(
    mood: &str,
    seed: u64,
    count: usize,
    engine: &EngineArgs,
) -> Result<(), SonoraCliError> {
    let mut recommender = build_recommender(engine)?;
    let mut wearable = SimulatedWearable::new(seed);
    wearable.connect()?;

    let mut stdout = io::stdout();
    for _ in 0..count {
        let snapshot = wearable.read()?;
        let recommendation = recommender.recommend(mood, &snapshot).clone();
        let record = SimulationRecord {
            biometrics: snapshot,
            recommendation,
        };
        writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
    }
    stdout.flush()?;

    wearable.disconnect();
    Ok(())
}

fn cmd_modes(json: bool) -> Result<(), SonoraCliError> {
    let modes: Vec<ModeEntry> = TherapyMode::ALL
        .iter()
        .map(|mode| {
            let template = mode.template();
            ModeEntry {
                id: mode.as_str(),
                label: mode.label(),
                description: mode.description(),
                premium: mode.is_premium(),
                binaural_beat_type: template.binaural_beat_type.as_str(),
                frequency_range: template.frequency_range.into(),
                noise_profile: template.noise_profile.iter().map(|l| l.as_str()).collect(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&modes)?);
    } else {
        println!("Therapy Modes");
        println!("=============");
        for mode in &modes {
            let lock = if mode.premium { " [premium]" } else { "" };
            println!("  {:<11} {}{}", mode.id, mode.label, lock);
            println!("              {}", mode.description);
            println!(
                "              {} {:?} Hz, layers: {}",
                mode.binaural_beat_type,
                mode.frequency_range,
                mode.noise_profile.join(", ")
            );
        }
    }

    Ok(())
}

fn cmd_doctor(model: Option<&Path>, config: Option<&Path>, json: bool) -> Result<(), SonoraCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "sonora_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Sonora version {}", SONORA_VERSION),
    });

    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match RecommenderConfig::from_json(&content) {
                Ok(config) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (blend weight {}, beat bounds {}-{} Hz)",
                        config.model_blend_weight, config.min_beat_hz, config.max_beat_hz
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            },
        };
        checks.push(check);
    }

    // A bad model is only a warning: recommendations still work without it
    if let Some(model_path) = model {
        let slot = ModelSlot::load_blocking(&FileModelLoader::new(model_path));
        let check = match (&slot, slot.status()) {
            (_, ModelStatus::Ready) => DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Ok,
                message: "Model loaded; recommendations will be refined".to_string(),
            },
            (ModelSlot::Unavailable(reason), _) => DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Warning,
                message: format!("{}; recommendations will be unrefined", reason),
            },
            _ => DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Warning,
                message: "Model not loaded".to_string(),
            },
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SONORA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sonora Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SonoraCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn format_json<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, SonoraCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

// Error types

#[derive(Debug)]
enum SonoraCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for SonoraCliError {
    fn from(e: io::Error) -> Self {
        SonoraCliError::Io(e)
    }
}

impl From<ComputeError> for SonoraCliError {
    fn from(e: ComputeError) -> Self {
        SonoraCliError::Compute(e)
    }
}

impl From<serde_json::Error> for SonoraCliError {
    fn from(e: serde_json::Error) -> Self {
        SonoraCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SonoraCliError> for CliError {
    fn from(e: SonoraCliError) -> Self {
        match e {
            SonoraCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SonoraCliError::Compute(ComputeError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'sonora doctor --config <file>' for details".to_string()),
            },
            SonoraCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SonoraCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SonoraCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            SonoraCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some(
                    "Each line must be {\"mood\": ..., \"biometrics\": {...}}".to_string(),
                ),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct SimulationRecord {
    biometrics: BiometricSnapshot,
    recommendation: SoundRecommendation,
}

#[derive(Serialize)]
struct ModeEntry {
    id: &'static str,
    label: &'static str,
    description: &'static str,
    premium: bool,
    binaural_beat_type: &'static str,
    frequency_range: [f64; 2],
    noise_profile: Vec<&'static str>,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

