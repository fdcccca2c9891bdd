//! blockday - daily execution dashboard
//!
//! Five timed blocks a day:
//! - Run a block in the foreground, optionally in 25/5 Pomodoro mode
//! - Keep a daily history, streaks and consistency
//! - Unlock achievements and track the weekly areas

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant};

use blockday::cli::{Cli, Commands, Display, ResetArgs, ReviewArgs, StartArgs};
use blockday::practice::BreathingSession;
use blockday::types::parse_percentage;
use blockday::{
    BlockId, Clock, Dashboard, DashboardConfig, DashboardEvent, DashboardService, FileStore, LoadOutcome,
    SystemClock, WeeklyReview,
};

type CliDashboard = Dashboard<SystemClock, FileStore>;
type Events = mpsc::UnboundedReceiver<DashboardEvent>;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let data_file = cli.data_file;

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Start(args) => {
            let (dashboard, events) = open_dashboard(data_file)?;
            run_block(dashboard, events, args).await?;
        }
        Commands::Reset(ResetArgs { block, all }) => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            if all {
                dashboard.reset_all();
            } else if let Some(block) = block {
                dashboard.reset(block);
            }
            print_events(&mut events);
        }
        Commands::Pomodoro { block } => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            dashboard.toggle_pomodoro(block);
            print_events(&mut events);
        }
        Commands::Task { block, text } => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            dashboard
                .set_task(block, text)
                .context("Failed to save the task")?;
            print_events(&mut events);
            Display::show_success(&format!("Tarea del bloque {} guardada", block));
        }
        Commands::Notes { block, text } => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            dashboard
                .set_notes(block, text)
                .context("Failed to save the notes")?;
            print_events(&mut events);
            Display::show_success(&format!("Notas del bloque {} guardadas", block));
        }
        Commands::Progress { area, value } => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            let stored = dashboard.set_weekly_progress(area, i64::from(parse_percentage(&value)));
            Display::show_success(&format!("{}: {}%", area, stored));
            print_events(&mut events);
        }
        Commands::Theme { theme } => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            if theme != Some(dashboard.theme()) {
                dashboard.toggle_theme();
            }
            print_events(&mut events);
            println!("Tema actual: {}", dashboard.theme().as_str());
        }
        Commands::Review(args) => {
            let (mut dashboard, mut events) = open_dashboard(data_file)?;
            dashboard
                .save_weekly_review(review_from_args(args))
                .context("Failed to save the weekly review")?;
            print_events(&mut events);
        }
        Commands::Status => {
            let (dashboard, mut events) = open_dashboard(data_file)?;
            print_events(&mut events);
            Display::show_status(
                dashboard.timers(),
                dashboard.weekly_progress(),
                dashboard.theme(),
            );
        }
        Commands::Stats => {
            let (dashboard, mut events) = open_dashboard(data_file)?;
            print_events(&mut events);
            Display::show_stats(&dashboard.stats());
        }
        Commands::Achievements => {
            let (dashboard, mut events) = open_dashboard(data_file)?;
            print_events(&mut events);
            Display::show_achievements(
                &dashboard.stats(),
                &dashboard.record().unlocked_achievements,
            );
        }
        Commands::Plan => {
            Display::show_plan(SystemClock.now().weekday());
        }
        Commands::Breathe => {
            run_breathing().await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Builds the engine over the state file and loads today's state.
fn open_dashboard(data_file: Option<PathBuf>) -> Result<(CliDashboard, Events)> {
    let mut config = DashboardConfig::default();
    if let Some(path) = data_file {
        config = config.with_data_file(path);
    }
    config.validate().map_err(anyhow::Error::msg)?;

    tracing::info!("State file: {}", config.data_file.display());
    let store = FileStore::new(config.data_file.clone());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut dashboard = Dashboard::new(config, SystemClock, store, tx);

    if dashboard.load_state() == LoadOutcome::NewDay {
        // Seal the rollover so the next command sees today's record
        dashboard
            .save_state()
            .context("Failed to save the new day")?;
    }

    Ok((dashboard, rx))
}

/// Prints queued events. The restore notice is left out of one-shot commands.
fn print_events(events: &mut Events) {
    while let Ok(event) = events.try_recv() {
        if event != DashboardEvent::StateRestored {
            Display::show_event(&event);
        }
    }
}

/// Runs one block in the foreground until it stops on its own or Ctrl-C.
async fn run_block(mut dashboard: CliDashboard, mut events: Events, args: StartArgs) -> Result<()> {
    let block = args.block;
    if args.pomodoro && !dashboard.timer(block).pomodoro_mode() {
        dashboard.toggle_pomodoro(block);
    }
    let delay = dashboard.config().next_block_delay();

    let mut service = DashboardService::new(dashboard);
    let autosave = service.spawn_autosave();

    if args.focus {
        service.enter_focus_mode(block).await;
    } else {
        service.start(block).await;
    }

    {
        let shared = service.dashboard();
        let dashboard = shared.lock().await;
        let timer = dashboard.timer(block);
        println!(
            "{} / {} (Ctrl-C para salir)",
            Display::format_clock(timer.elapsed_seconds()),
            Display::format_clock(timer.current_target_seconds())
        );
    }

    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    let mut interrupted = false;

    loop {
        tokio::select! {
            Some(event) = events.recv() => Display::show_event(&event),
            _ = service.wait_for_block() => break,
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                interrupted = true;
                break;
            }
        }
    }

    if !interrupted && block.next().is_some() && finished_block(&service, block).await {
        // Give the next-block prompt time to arrive
        let mut deadline = std::pin::pin!(tokio::time::sleep(delay + Duration::from_millis(200)));
        loop {
            tokio::select! {
                Some(event) = events.recv() => {
                    Display::show_event(&event);
                    if matches!(event, DashboardEvent::NextBlockSuggested { .. }) {
                        break;
                    }
                }
                _ = &mut deadline => break,
            }
        }
    }

    autosave.abort();
    service.shutdown().await?;
    print_events(&mut events);
    Ok(())
}

/// True if the block stopped because it reached its target.
async fn finished_block(service: &DashboardService<SystemClock, FileStore>, block: BlockId) -> bool {
    let shared = service.dashboard();
    let dashboard = shared.lock().await;
    let timer = dashboard.timer(block);
    !timer.pomodoro_mode() && timer.elapsed_seconds() >= timer.target_seconds()
}

/// Runs the three-minute breathing practice.
async fn run_breathing() -> Result<()> {
    let mut session = BreathingSession::new();
    Display::show_breath_step(session.step(), session.remaining_seconds());

    let period = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + period, period);
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(step) = session.tick() {
                    Display::show_breath_step(step, session.remaining_seconds());
                }
                if session.is_finished() {
                    Display::show_practice_done();
                    break;
                }
            }
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    Ok(())
}

fn review_from_args(args: ReviewArgs) -> WeeklyReview {
    WeeklyReview {
        date: None,
        achievements: args.achievements,
        obstacles: args.obstacles,
        learnings: args.learnings,
        adjustments: args.adjustments,
        intention: args.intention,
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
