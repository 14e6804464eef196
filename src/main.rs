use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_SCORING: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Response envelope as JSON
    Json,
    /// Human-readable report
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a request file (JSON, or YAML for .yaml/.yml); "-" reads JSON from stdin
    Score {
        request: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Show the fixed 90-item factor table
    Factors,
    /// Validate the scale library
    Validate,
}

#[derive(Parser, Debug)]
#[command(name = "scale-score")]
#[command(about = "Self-report assessment scoring engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to scale library (defaults to ~/.config/scale-score/scales.yaml)
    #[arg(short, long, global = true)]
    library: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    scale_score::logging::init_logger(cli.verbose);
    let start_time = Instant::now();

    let library_path = cli.library.map(PathBuf::from);
    let library = match scale_score::config::load_library(library_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = scale_score::output::should_use_colors();

    let code = match cli.command {
        Commands::Factors => {
            println!("{}", scale_score::output::format_factor_table(use_colors));
            EXIT_SUCCESS
        }
        Commands::Validate => {
            let mut failed = false;
            for scale in &library.scales {
                if let Err(errors) = scale_score::scoring::validate_scale(scale) {
                    failed = true;
                    eprintln!("Scale '{}' errors:", scale.id);
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                }
            }
            if failed {
                EXIT_CONFIG
            } else {
                println!("{} scales OK", library.scales.len());
                EXIT_SUCCESS
            }
        }
        Commands::Score { request, format } => {
            let mut request = match scale_score::config::load_request(&request) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            if library.apply_to(&mut request) {
                tracing::debug!("Applied library configuration for scale '{}'", request.scale_id);
            }

            let envelope = scale_score::score_request(&request);
            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&envelope) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {}", e);
                        std::process::exit(EXIT_SCORING);
                    }
                },
                OutputFormat::Text => {
                    println!("{}", scale_score::output::format_envelope(&envelope, use_colors));
                }
            }

            if envelope.success {
                EXIT_SUCCESS
            } else {
                EXIT_SCORING
            }
        }
    };

    tracing::debug!("Finished in {:?}", start_time.elapsed());
    std::process::exit(code);
}
