// services/queue-dash/src/main.rs
//
// Queue Dashboard for the clinic front desk
// Terminal view of the live patient queue with check-in and triage actions
//
// Run with: cargo run --bin queue-dash -- --demo

use std::fs::File;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use queue_dash::app::{App, LogLevel};
use queue_dash::config::{load_config, QueueDashConfig};
use queue_dash::{
    ui, MockQueue, Poller, QueueApi, QueueController, QueueSource, QueueStore, QueueView,
};
use svckit::credentials;

#[derive(Parser, Debug)]
#[command(name = "queue-dash")]
#[command(about = "Terminal dashboard for the clinic patient queue")]
#[command(version = "0.1.0")]
struct Args {
    #[arg(short, long, default_value = "config/queue-dash.yaml")]
    config: String,

    /// Run with built-in fixture data (no API required)
    #[arg(long, short)]
    demo: bool,

    /// Queue API base URL, overrides the config file
    #[arg(long)]
    api_url: Option<String>,

    /// Poll interval in seconds, 0 disables polling
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// File holding the bearer token
    #[arg(long)]
    token_file: Option<String>,
}

const UI_TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    // The terminal owns stdout, so logs go to a file.
    init_tracing(&config)?;

    let runtime = Runtime::new().context("failed to start tokio runtime")?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &runtime, &config);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn apply_overrides(config: &mut QueueDashConfig, args: &Args) {
    if args.demo {
        config.demo = true;
    }
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(secs) = args.refresh_secs {
        config.poll.interval_secs = secs;
    }
    if let Some(path) = &args.token_file {
        config.auth.token_file = Some(path.clone());
    }
}

fn init_tracing(config: &QueueDashConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("queue_dash={0},svckit={0}", config.observability.log_level).into()
    });

    match &config.observability.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::sink))
                .init();
        }
    }
    Ok(())
}

fn build_source(config: &QueueDashConfig) -> Arc<dyn QueueSource> {
    if config.demo {
        // Roughly one new walk-in every six polls.
        Arc::new(MockQueue::new().with_arrivals(1, 6))
    } else {
        Arc::new(QueueApi::new(&config.api, credentials::from_config(&config.auth)))
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    config: &QueueDashConfig,
) -> Result<()> {
    let source = build_source(config);
    let store = Arc::new(QueueStore::new(source.clone(), QueueView::Active));
    let controller = Arc::new(QueueController::new(source, store.clone()));
    let mut app = App::new(controller, runtime.handle().clone(), config.demo);

    let poller = {
        let _guard = runtime.enter();
        Poller::start(store, config.poll.interval())
    };

    if config.demo {
        app.add_log(LogLevel::Info, "Demo modunda başlatıldı");
    } else {
        app.add_log(
            LogLevel::Info,
            &format!("Bağlanılıyor: {}", app.source_description()),
        );
    }
    if config.poll.interval().is_none() {
        app.add_log(LogLevel::Warn, "Otomatik yenileme kapalı, [R] ile yenileyin");
    }
    info!(
        "Queue dashboard started (demo: {}, poll: {:?})",
        config.demo,
        config.poll.interval()
    );

    while !app.should_quit {
        app.drain_notices();
        terminal.draw(|frame| ui::draw_ui(frame, &app))?;

        if event::poll(UI_TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }

    drop(poller);
    info!("Queue dashboard stopped");
    Ok(())
}
