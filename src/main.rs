//! blocksmith: MCP server for block-aware accessibility work.
//!
//! Usage:
//!   blocksmith --mcp --root <blocks>     # Start MCP server on stdin/stdout
//!   blocksmith tools                     # Print the tool registry
//!   blocksmith scan --block hero         # List files a tool would read
//!   blocksmith context                   # Print the assembled context
//!   blocksmith call <tool> --args '{}'   # Run one tool call locally

use blocksmith::config::{load_dotenv, DispatcherSettings, GenerationConfig};
use blocksmith::server::BlocksmithServer;
use blocksmith::services::{assemble, scan, DEFAULT_MAX_CONTEXT_CHARS};
use blocksmith::tools::{JsonObject, ToolInvocation, ToolRegistry};
use blocksmith::types::Extensions;
use blocksmith::{fmt, security};
use clap::{Args, Parser, Subcommand};
use rmcp::ServiceExt;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blocksmith")]
#[command(about = "MCP server that matches HTML to blocks and drafts accessibility fixes")]
#[command(version)]
struct Cli {
    /// Run as MCP server (stdin/stdout JSON-RPC)
    #[arg(long)]
    mcp: bool,

    /// Blocks directory scanned by the tools
    #[arg(long, env = "BLOCKSMITH_ROOT", default_value = "./blocks")]
    root: PathBuf,

    /// Maximum context size in characters
    #[arg(long, default_value_t = DEFAULT_MAX_CONTEXT_CHARS)]
    max_context: usize,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(flatten)]
    generation: GenerationArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GenerationArgs {
    /// Azure OpenAI resource endpoint
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    endpoint: Option<String>,

    /// Azure OpenAI API key
    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completion deployment name
    #[arg(long, env = "AZURE_COMPLETION_DEPLOYMENT")]
    deployment: Option<String>,

    /// Azure OpenAI API version
    #[arg(long, env = "AZURE_OPENAI_API_VERSION")]
    api_version: Option<String>,

    /// Generation request timeout in seconds (default: 120)
    #[arg(long)]
    request_timeout: Option<u64>,
}

impl From<GenerationArgs> for GenerationConfig {
    fn from(args: GenerationArgs) -> Self {
        Self {
            endpoint: args.endpoint,
            api_key: args.api_key,
            deployment: args.deployment,
            api_version: args.api_version,
            request_timeout: args.request_timeout.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered tools and their arguments
    Tools {
        /// Print the raw JSON definitions
        #[arg(long)]
        json: bool,
    },

    /// List the files that would be scanned
    Scan {
        /// Scan a single block instead of the whole root
        #[arg(short, long)]
        block: Option<String>,

        /// File extensions to include (default: .js .css)
        #[arg(short, long = "ext")]
        ext: Vec<String>,
    },

    /// Print the assembled context
    Context {
        /// Assemble a single block instead of the whole root
        #[arg(short, long)]
        block: Option<String>,

        /// Character budget (default: --max-context)
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Run one tool invocation and print its result
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tracing is not up yet
    if let Some(err) = load_dotenv() {
        eprintln!("warning: failed to load .env: {err}");
    }

    let cli = Cli::parse();

    // CRITICAL: Log to stderr only (stdout is JSON-RPC for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("blocksmith=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let root = dunce::canonicalize(&cli.root).unwrap_or_else(|_| cli.root.clone());
    let settings = DispatcherSettings::new(root).with_max_context_chars(cli.max_context);
    let color = !cli.no_color && std::io::stdout().is_terminal();

    if cli.mcp {
        run_mcp_server(settings, cli.generation.into()).await
    } else if let Some(cmd) = cli.command {
        run_cli(settings, cli.generation.into(), cmd, color).await
    } else {
        eprintln!("Use --mcp to start MCP server, or a subcommand for CLI mode.");
        eprintln!("Run with --help for more information.");
        std::process::exit(1);
    }
}

async fn run_mcp_server(settings: DispatcherSettings, config: GenerationConfig) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server for blocks root: {}", settings.blocks_root.display());
    if !settings.blocks_root.is_dir() {
        tracing::warn!(
            "Blocks root {} is not a directory; tool calls will report it",
            settings.blocks_root.display()
        );
    }

    let server = BlocksmithServer::from_config(settings, config)?;
    let service = server.serve(rmcp::transport::io::stdio()).await?;

    tokio::select! {
        res = service.waiting() => {
            res?;
        }
        () = shutdown_signal() => {
            tracing::info!("Shutting down");
            std::process::exit(0);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

fn target_dir(root: &Path, block: Option<&str>) -> anyhow::Result<PathBuf> {
    match block {
        Some(name) => Ok(security::resolve_block_dir(root, name)?),
        None => Ok(root.to_path_buf()),
    }
}

async fn run_cli(
    settings: DispatcherSettings,
    config: GenerationConfig,
    cmd: Commands,
    color: bool,
) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cmd {
        Commands::Tools { json } => {
            let registry = ToolRegistry::new();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(registry.list_tools())?)?;
            } else {
                fmt::fmt_tools(&mut out, registry.list_tools(), color)?;
            }
        }

        Commands::Scan { block, ext } => {
            let dir = target_dir(&settings.blocks_root, block.as_deref())?;
            let extensions = if ext.is_empty() {
                Extensions::default()
            } else {
                Extensions::new(&ext)
            };
            let records = scan(&dir, &extensions)?;
            fmt::fmt_scan(&mut out, &records, color)?;
        }

        Commands::Context { block, max } => {
            let dir = target_dir(&settings.blocks_root, block.as_deref())?;
            let records = scan(&dir, &Extensions::default())?;
            let ctx = assemble(&records, max.unwrap_or(settings.max_context_chars));
            fmt::fmt_context(&mut out, &ctx, color)?;
        }

        Commands::Call { tool, args } => {
            let arguments: JsonObject = serde_json::from_str(&args)
                .map_err(|e| anyhow::anyhow!("--args must be a JSON object: {e}"))?;

            let server = BlocksmithServer::from_config(settings, config)?;
            let result = server.call(ToolInvocation::new(tool, arguments)).await;
            fmt::fmt_tool_result(&mut out, &result, color)?;
            out.flush()?;

            if result.is_error {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
