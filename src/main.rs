//! archgen CLI entry point

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "archgen")]
#[command(about = "Generate architecture diagrams from source repositories", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a diagram for a local directory or a GitHub repository
    Generate(GenerateArgs),
    /// Write a default .env file
    Init {
        /// Where to write the file
        #[arg(short, long, default_value = ".env")]
        path: PathBuf,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Local path, `owner/repo` or a github.com URL
    #[arg(short, long)]
    pub repo: String,

    /// Diagram type: functional or deployment
    #[arg(short = 't', long = "type", default_value = "functional")]
    pub diagram_type: String,

    /// Output format: json, mermaid, svg, png or excalidraw
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// GitHub token for remote repositories
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Branch read from GitHub
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Exclusion pattern (substring, or `re:<regex>`); repeatable
    #[arg(short, long = "exclude")]
    pub exclude: Vec<String>,

    /// Maximum directory depth for local walks
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Enhance the diagram with a language model
    #[arg(long)]
    pub enable_ai: bool,

    /// Provider: openai, claude or aliyun
    #[arg(long, env = "AI_TYPE")]
    pub ai_type: Option<String>,

    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,

    #[arg(long, env = "AI_MODEL")]
    pub ai_model: Option<String>,

    #[arg(long, env = "AI_BASE_URL")]
    pub ai_base_url: Option<String>,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub ai_timeout: u64,

    /// Extra context passed to the model
    #[arg(long)]
    pub context: Option<String>,
}

/// Log panics through tracing and exit with status 1.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Unexpected failure: {}", panic_info);
        default_hook(panic_info);
        std::process::exit(1);
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before parsing so env fallbacks see .env values
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("archgen={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    install_panic_hook();

    tracing::debug!("archgen v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Generate(args) => commands::generate(args).await,
        Commands::Init { path } => commands::init(&path),
    }
}
