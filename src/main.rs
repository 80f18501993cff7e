use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};

use mystool::api::{DsSigner, ReqwestTransport};
use mystool::{
    cancel_pair, Account, ActionOutcome, Game, MissionConfig, MissionEngine, MissionError,
    MissionStatus,
};

/// Run community-platform point missions for one account
#[derive(Parser)]
#[command(name = "mystool")]
#[command(about = "Sign in, read, like and share forum posts for mission points", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Give every request a single attempt
    #[arg(long, global = true)]
    no_retry: bool,

    /// Account file (JSON with phone, cookie and device_id)
    #[arg(short = 'a', long, global = true, default_value = "account.json")]
    account: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show missions, progress and point total
    Status,
    /// Run every unfinished mission
    Run {
        #[arg(short, long, default_value = "ys")]
        game: Game,
    },
    /// Forum sign-in
    Sign {
        #[arg(short, long, default_value = "ys")]
        game: Game,
    },
    /// Read posts
    Read {
        #[arg(short, long, default_value = "ys")]
        game: Game,
        /// Number of posts (default: configured read_times)
        #[arg(short = 'n', long)]
        times: Option<u32>,
    },
    /// Like posts
    Like {
        #[arg(short, long, default_value = "ys")]
        game: Game,
        /// Number of posts (default: configured like_times)
        #[arg(short = 'n', long)]
        times: Option<u32>,
    },
    /// Share a post
    Share {
        #[arg(short, long, default_value = "ys")]
        game: Game,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,reqwest=debug", // -vvv shows everything including dependencies
    };
    // Config supplies the default log level
    let config = match MissionConfig::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    let log_level = config
        .log_level
        .clone()
        .filter(|_| cli.verbose == 0)
        .unwrap_or_else(|| log_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("mystool started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let code = match run(cli, config).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<MissionError>() {
                Some(mission_error) => mission_error.code().unsigned_abs() as i32,
                None => 1,
            }
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, mut config: MissionConfig) -> Result<()> {
    if cli.no_retry {
        config.retry.enabled = false;
    }
    let account = Account::load(&cli.account).await?;

    let transport = ReqwestTransport::new(config.timeout)?;
    let signer = DsSigner::new(config.signing.clone());
    let engine = MissionEngine::new(config, Arc::new(transport), Arc::new(signer));

    let (cancel, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("Cancelling after the current request...");
            cancel.cancel();
        }
    });

    let runner = engine.runner(&account, signal);
    runner
        .prepare()
        .await
        .context("Device session setup failed")?;

    match cli.command {
        Commands::Status => {
            let status = runner.get_missions_with_progress().await?;
            print_status(&status);
        }
        Commands::Run { game } => {
            let runs = runner.run_pending(game).await?;
            if runs.is_empty() {
                println!("All missions already complete.");
            }
            for run in runs {
                match run.result {
                    Ok(outcome) => println!("✅ {}: {}", run.key, describe(&outcome)),
                    Err(e) => println!("❌ {}: {} (code {})", run.key, e, e.code()),
                }
            }
        }
        Commands::Sign { game } => {
            let points = runner.sign(game).await?;
            println!("✅ Signed in to {game} forum, points: {points}");
        }
        Commands::Read { game, times } => {
            let times = times.unwrap_or(engine.config().read_times);
            let read = runner.read(game, times).await?;
            println!("✅ Read {read} post(s) in {game} forum");
        }
        Commands::Like { game, times } => {
            let times = times.unwrap_or(engine.config().like_times);
            let liked = runner.like(game, times).await?;
            println!("✅ Liked {liked} post(s) in {game} forum");
        }
        Commands::Share { game } => {
            runner.share(game).await?;
            println!("✅ Shared a post in {game} forum");
        }
    }

    Ok(())
}

fn describe(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::SignedIn { points } => format!("signed in, points: {points}"),
        ActionOutcome::Completed { interactions } => format!("{interactions} interaction(s)"),
    }
}

fn print_status(status: &MissionStatus) {
    println!("Points: {}", status.total_points);
    for entry in &status.progress {
        let mark = if entry.is_complete() { "✅" } else { "⏳" };
        let note = if entry.mission.key.is_executable() {
            ""
        } else {
            " (not supported)"
        };
        println!(
            "{} {} {}/{} (+{}){}",
            mark,
            entry.mission.name,
            entry.current,
            entry.mission.threshold,
            entry.mission.points,
            note
        );
    }
}
