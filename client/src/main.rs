//! Form Coach command line client
//!
//! Uploads a workout video to the analysis backend, shows progress and the
//! analysed metrics, and saves the workout to local history.
//!
//! ## Commands
//!
//! - `health`: check backend connectivity once
//! - `watch-health`: keep polling connectivity until interrupted
//! - `process <VIDEO> --activity <NAME>`: analyse a video
//! - `history`: list saved workouts

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use form_coach_client::config::AppConfig;
use form_coach_client::processor::{AnalysisOutcome, ProcessingResult};
use form_coach_client::{
    telemetry, AppState, ConnectionStatus, ProcessingHandle, VideoUpload, ViewEvent, WorkoutBackend,
};
use form_coach_shared::Activity;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "form-coach",
    version,
    about = "Upload workout videos for form analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check backend connectivity once
    Health,
    /// Poll backend connectivity until interrupted
    WatchHealth,
    /// Analyse a workout video and save the result
    Process {
        /// Video file to upload
        video: PathBuf,
        /// Activity performed in the video, e.g. "Push-ups"
        #[arg(long, short)]
        activity: String,
        /// Show the results without saving them to history
        #[arg(long)]
        no_submit: bool,
        /// Also download the per-frame CSV log
        #[arg(long)]
        csv: bool,
    },
    /// List saved workouts
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    telemetry::init_tracing(AppConfig::is_production());

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend.base_url,
        "Starting Form Coach"
    );

    let state = AppState::new(config)?;

    match cli.command {
        Command::Health => check_health(&state).await,
        Command::WatchHealth => watch_health(&state).await,
        Command::Process {
            video,
            activity,
            no_submit,
            csv,
        } => process(&state, video, activity, !no_submit, csv).await,
        Command::History => show_history(&state).await,
    }
}

async fn check_health(state: &AppState) -> Result<()> {
    let status = ConnectionStatus::from_healthy(state.client().check_health().await);
    println!("{}: {}", status.title(), status.description());

    if status != ConnectionStatus::Connected {
        bail!("backend at {} is offline", state.config().backend.base_url);
    }
    Ok(())
}

async fn watch_health(state: &AppState) -> Result<()> {
    let monitor = state.health_monitor();
    let mut rx = monitor.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let status = *rx.borrow_and_update();
        println!("{}: {}", status.title(), status.description());

        tokio::select! {
            _ = &mut shutdown => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}

async fn process(
    state: &AppState,
    video: PathBuf,
    activity: String,
    submit: bool,
    fetch_csv: bool,
) -> Result<()> {
    if Activity::from_name(&activity).is_none() {
        let known: Vec<_> = Activity::ALL.iter().map(|a| a.name()).collect();
        warn!(
            activity = %activity,
            known = ?known,
            "unrecognized activity, no metrics will be listed"
        );
    }

    let upload = VideoUpload::from_path(&video)
        .await
        .with_context(|| format!("Cannot read {}", video.display()))?;

    // Informational only: processing does not wait for it
    let monitor = state.health_monitor();
    let mut health = monitor.subscribe();
    let health_reporter = tokio::spawn(async move {
        while health.changed().await.is_ok() {
            let status = *health.borrow_and_update();
            eprintln!("[{}] {}", status.title(), status.description());
        }
    });

    let mut handle = state.processor().start(upload, activity);

    let result = follow_processing(&handle).await;
    drop(monitor);
    health_reporter.abort();
    let result = result?;

    match result {
        ProcessingResult::Good(outcome) | ProcessingResult::Bad(outcome) => {
            print_results(&handle, &outcome);

            if fetch_csv {
                match state.client().fetch_csv_log(&outcome.csv_url).await {
                    Ok(log) => println!("CSV log: {} rows ({})", log.len(), outcome.csv_url),
                    Err(e) => warn!(error = %e, "could not download csv log"),
                }
            }

            play_rewards(&handle).await;

            if submit {
                let record = handle.submit_workout().await?;
                println!(
                    "Workout saved: {} badges, +{} coins",
                    record.badges_earned.len(),
                    record.coins_earned
                );
            }
            handle.close().await;
            Ok(())
        }
        ProcessingResult::Poor { message } => {
            eprintln!("error: {}", message);
            loop {
                match handle.next_event().await {
                    Some(ViewEvent::Retry) | None => break,
                    Some(_) => continue,
                }
            }
            handle.close().await;
            bail!("video could not be processed, upload another video to retry")
        }
        ProcessingResult::Anomaly { message } => {
            eprintln!("Anomaly Detected: {}", message);
            handle.close().await;
            bail!("anomaly detected")
        }
    }
}

/// Render progress until the view settles
async fn follow_processing(handle: &ProcessingHandle) -> Result<ProcessingResult> {
    let mut rx = handle.subscribe();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        {
            let snapshot = rx.borrow_and_update();
            if let Some(result) = &snapshot.result {
                eprintln!();
                return Ok(result.clone());
            }
            eprint!(
                "\r{} {}",
                snapshot.processing_caption(),
                snapshot.progress_caption()
            );
        }

        tokio::select! {
            _ = &mut shutdown => {
                eprintln!();
                bail!("interrupted");
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    bail!("processing view closed unexpectedly");
                }
            }
        }
    }
}

fn print_results(handle: &ProcessingHandle, outcome: &AnalysisOutcome) {
    let snapshot = handle.snapshot();
    println!("Workout Results: {}", snapshot.activity_name);
    println!("Video: {}", outcome.video_url);
    for tile in outcome.tiles() {
        println!("  {:<24} {}", tile.label, tile.value);
    }
    println!("{}", outcome.caption());
}

/// Print the reward overlays as they appear, until they are hidden again
async fn play_rewards(handle: &ProcessingHandle) {
    let mut rx = handle.subscribe();
    let coins = handle.coins_on_offer().unwrap_or_default();
    let mut badge_shown = false;
    let mut coins_shown = false;

    let wait = async {
        loop {
            let overlay = rx.borrow_and_update().overlay;
            if overlay.badge_visible && !badge_shown {
                println!("Badge Unlocked! Form Analyzer");
                badge_shown = true;
            }
            if overlay.coins_visible && !coins_shown {
                println!("Coins Earned! +{} coins", coins);
                coins_shown = true;
            }
            if badge_shown && !overlay.is_visible() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    if tokio::time::timeout(Duration::from_secs(10), wait).await.is_err() {
        warn!("reward animation did not finish");
    }
}

async fn show_history(state: &AppState) -> Result<()> {
    let records = state.history().load_all().await?;
    if records.is_empty() {
        println!("No workouts saved yet ({})", state.history().path().display());
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {:<20} {:<4} +{} coins",
            record.timestamp, record.activity_name, record.posture, record.coins_earned
        );
    }
    let total: u64 = records.iter().map(|r| u64::from(r.coins_earned)).sum();
    println!("{} workouts, {} coins", records.len(), total);
    Ok(())
}

/// Resolves on Ctrl+C (or SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping");
        }
    }
}
