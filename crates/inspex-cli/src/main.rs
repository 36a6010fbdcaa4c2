mod commands;
mod output;

use clap::{Parser, Subcommand};
use inspex_core::error::InspexError;
use inspex_core::InspexConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "inspex",
    version,
    about = "Extract inspection plans, CMM results and text from engineering documents"
)]
struct Cli {
    /// Configuration file (default: inspex.toml in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract plan rows or text from a spreadsheet, PDF, image or DOCX file
    Extract {
        input_file: PathBuf,

        /// Output format: json (default) or table
        #[arg(short, long, default_value = "json")]
        output: String,
    },
    /// Stream the plan rows of a spreadsheet as JSON, one row at a time
    ExtractStream { input_file: PathBuf },
    /// OCR a cropped image region
    OcrImage { input_file: PathBuf },
    /// Merge the feature/actual columns of a CMM measurement workbook
    ParseCmm {
        input_file: PathBuf,

        /// Output format: json (default) or table
        #[arg(short, long, default_value = "json")]
        output: String,
    },
    /// Look up supplier names by prefix
    Suppliers {
        /// Case-insensitive name prefix; empty lists every supplier
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Maximum number of names; negative means no limit
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Output format: json (default) or table
        #[arg(short, long, default_value = "json")]
        output: String,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let config = match InspexConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let result = match cli.command {
        Commands::Extract { input_file, output } => {
            commands::extract::run(input_file, &output, config)
        }
        Commands::ExtractStream { input_file } => commands::extract_stream::run(input_file, config),
        Commands::OcrImage { input_file } => commands::ocr_image::run(input_file, config),
        Commands::ParseCmm { input_file, output } => {
            commands::parse_cmm::run(input_file, &output, config)
        }
        Commands::Suppliers {
            prefix,
            limit,
            output,
        } => commands::suppliers::run(&prefix, limit, &output, &config),
    };

    if let Err(e) = result {
        match e {
            InspexError::StructureNotFound { ref trace } => {
                if let Err(json_err) = output::json::print_structure_error(&e, trace) {
                    eprintln!("Error: {json_err}");
                }
            }
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
