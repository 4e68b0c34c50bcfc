//! autoscribe - CLI entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use autoscribe::coordinator::{Coordinator, CoordinatorOptions, DEFAULT_DEBOUNCE_SECS};
use autoscribe::driver::{run_once, watch_repository};
use autoscribe::git::GitRepository;
use autoscribe::llm::ChatCompletionsClient;
use autoscribe::logging::init_logging;
use autoscribe::{Summarizer, SummarizerConfig};

/// Summarize working-tree changes and optionally auto-commit them.
#[derive(Parser, Debug)]
#[command(name = "autoscribe")]
#[command(about = "Generate commit messages from repository changes, or auto-commit while watching")]
#[command(version)]
struct Cli {
    /// Path to the repository (any directory inside the work tree)
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Ask for emojis in the commit message
    #[arg(short, long)]
    emoji: bool,

    /// Only consider staged changes
    #[arg(short, long)]
    staged: bool,

    /// Watch the repository and commit automatically
    #[arg(short, long)]
    watch: bool,

    /// Seconds of quiet before an automatic commit
    #[arg(short, long, default_value_t = DEFAULT_DEBOUNCE_SECS)]
    delay: u64,

    /// Verbose logging, also written to a timestamped log file
    #[arg(long)]
    debug: bool,
}

fn mode_label(staged_only: bool) -> &'static str {
    if staged_only { "staged files only" } else { "all changes" }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.debug);

    // Startup failures are fatal
    if !cli.path.exists() {
        bail!("Path does not exist: {}", cli.path.display());
    }
    let repo = GitRepository::discover(&cli.path).with_context(|| {
        format!("Not a git repository (or any parent): {}", cli.path.display())
    })?;
    let root = repo.root().to_path_buf();

    let config = SummarizerConfig::from_env().context("Failed to load configuration")?;
    let client = ChatCompletionsClient::new(&config)?;
    let summarizer = Summarizer::new(client, config.options.clone(), cli.emoji);

    if cli.watch {
        println!("\nWatching repository at: {}", root.display());
        println!("Mode: {}", mode_label(cli.staged));
        println!("Auto-commit delay: {} seconds", cli.delay);
        println!("Press Ctrl+C to stop watching...");

        let coordinator = Coordinator::new(
            repo,
            summarizer,
            CoordinatorOptions {
                delay: Duration::from_secs(cli.delay),
                staged_only: cli.staged,
            },
        );

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        watch_repository(&root, coordinator, cancel)
            .await
            .context("Failed to watch repository")?;
        println!("\nStopped watching repository.");
        return Ok(());
    }

    println!("Using repository at: {}", root.display());
    println!(
        "Emoji in commit message: {}",
        if cli.emoji { "enabled" } else { "disabled" }
    );
    println!("Mode: {}", mode_label(cli.staged));

    let report = run_once(&repo, &summarizer, cli.staged).await?;
    if report.is_empty() {
        println!("No changes detected in the repository.");
        return Ok(());
    }

    println!("\n{}", report.render());
    Ok(())
}
