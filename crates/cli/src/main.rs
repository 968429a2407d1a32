use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use pagemark_core::{
    ExtractConfig, FetchConfig, Mode, PipelineConfig, ScoreConfig, convert_with_config, fetch_url,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert web pages to clean Markdown
#[derive(Parser, Debug)]
#[command(name = "pagemark")]
#[command(version = VERSION)]
#[command(about = "Convert web pages to clean Markdown", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Render the whole page instead of extracting the main article
    #[arg(short, long)]
    detailed: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum winner score before falling back to the full page
    #[arg(long, default_value = "10.0", value_name = "SCORE")]
    min_score: f64,

    /// Number of top candidates considered during extraction
    #[arg(long, default_value = "5", value_name = "NUM")]
    top_candidates: usize,

    /// Weight applied when class/id tokens look like content
    #[arg(long, default_value = "25.0", value_name = "WEIGHT")]
    positive_weight: f64,

    /// Enable progress output on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Print a styled banner for verbose mode
fn print_banner() {
    eprintln!("\n{} {} {}", "Pagemark".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Convert web pages to clean Markdown".dimmed());
    eprintln!();
}

/// Print a styled step message
fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print an info message
fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Format file size for display
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        print_banner();
    }

    let html = if args.input == "-" {
        if args.verbose {
            print_step(1, 3, "Reading from stdin");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        buffer
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if args.verbose {
            print_step(1, 3, &format!("Fetching {}", args.input.bright_white().underline()));
        }

        let mut config = FetchConfig { timeout: args.timeout, ..Default::default() };
        if let Some(user_agent) = args.user_agent {
            config.user_agent = user_agent;
        }

        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            print_step(1, 3, &format!("Reading file {}", args.input.bright_white()));
        }
        fs::read_to_string(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
        print_step(2, 3, "Converting to Markdown");
    }

    let mode = if args.detailed { Mode::Detailed } else { Mode::Summary };
    let config = PipelineConfig {
        extract: ExtractConfig {
            min_score_floor: args.min_score,
            max_top_candidates: args.top_candidates,
            score: ScoreConfig { positive_weight: args.positive_weight, ..Default::default() },
            ..Default::default()
        },
        ..Default::default()
    };

    let result = convert_with_config(&html, mode, &config).context("Failed to convert page")?;

    if args.verbose && result.used_fallback {
        print_warning("No main content found, rendered the whole page");
    }

    if args.verbose {
        print_step(3, 3, "Writing output");
    }

    match args.output {
        Some(path) => {
            fs::write(&path, &result.markdown).with_context(|| format!("Failed to write {}", path.display()))?;
            if args.verbose {
                print_info(&format!("Wrote {}", path.display()));
            }
        }
        None => {
            println!("{}", result.markdown);
        }
    }

    Ok(())
}
