//! memhook: memory relevance hooks
//!
//! Usage:
//!   memhook search  [--prompt TEXT]             → rank memory files, write result artifact
//!   memhook touch   [--tool NAME --file PATH]   → record a file operation
//!   memhook context [--prompt TEXT]             → print subagent context block
//!   memhook prune                               → trim tracking log, remove warm excerpts
//!   memhook dump-config                         → print default config as TOML
//!
//! Without flags, each subcommand reads the hook JSON payload from stdin.
//! The process always exits 0; failures are logged to stderr.

mod hook;

use clap::{Parser, Subcommand};
use memhook_core::MemhookConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "memhook",
    about = "Memory relevance scoring and attention state for agent hooks",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (TOML). Default: ~/.claude/memhook.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file (in addition to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the memory catalog against a prompt
    Search {
        /// Prompt text (default: read {"prompt": ...} from stdin)
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Record a Read/Edit/Write of a file
    Touch {
        /// Tool name
        #[arg(short, long)]
        tool: Option<String>,
        /// Path of the touched file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Print memory context for a subagent task
    Context {
        /// Task text (default: read {"task_prompt": ...} from stdin)
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Trim the tracking log and delete warm excerpt files
    Prune,
    /// Print the default config as TOML
    DumpConfig,
}

fn main() {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    if let Err(e) = run(cli) {
        tracing::warn!("{:#}", e);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(MemhookConfig::default_path);
    let config = MemhookConfig::load(&config_path);

    match cli.command {
        Commands::Search { prompt } => {
            let outcome = hook::search(prompt, hook::read_stdin, &config)?;
            tracing::debug!("{} results selected", outcome.selected.len());
        }
        Commands::Touch { tool, file } => {
            let outcome = hook::touch(tool, file, hook::read_stdin, &config)?;
            if outcome.tracked {
                tracing::debug!("Touched {} ({} co-activated)", outcome.file_id, outcome.coactivated.len());
            }
        }
        Commands::Context { prompt } => {
            if let Some(block) = hook::context(prompt, hook::read_stdin, &config)? {
                println!("{block}");
            }
        }
        Commands::Prune => {
            hook::prune(&config);
        }
        Commands::DumpConfig => {
            print!("{}", MemhookConfig::default().to_toml());
        }
    }
    Ok(())
}

/// stderr always; a second, non-blocking file layer when `log_file` is set.
/// The returned guard flushes the file writer on drop.
fn init_tracing(log_file: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "memhook=warn,memhook_recall=warn,memhook_core=warn".into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "memhook.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

#[cfg(test)]
mod tests;
