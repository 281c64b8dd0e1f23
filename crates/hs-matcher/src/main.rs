use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use hs_common::{
    config::MatchingConfig,
    db::{OutboxNotifier, PgMatchingStore, create_pool_from_url, run_migrations},
    fixtures::{Dataset, matching_demo_dataset},
    logging::{init_tracing_subscriber, install_tracing_panic_hook},
    matching::{BatchReport, MatchingError, MatchingService},
    notify::{LogNotifier, MatchNotifier},
    store::{InMemoryStore, JobMatch, MatchingStore},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const APP_NAME: &str = "hs-matcher";

#[derive(Debug, Parser)]
#[command(name = "hs-matcher", about = "Score candidates against active job posts")]
struct Cli {
    /// Expose Prometheus metrics on this port
    #[arg(long, env = "HS_METRICS_PORT")]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct DbArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one matching batch and exit
    Run {
        #[command(flatten)]
        db: DbArgs,
    },
    /// Run a batch on a fixed interval until interrupted
    Schedule {
        #[command(flatten)]
        db: DbArgs,

        /// Seconds between batch starts
        #[arg(long, default_value_t = 3600)]
        interval_secs: u64,
    },
    /// Apply pending schema migrations
    Migrate {
        #[command(flatten)]
        db: DbArgs,
    },
    /// Run the batch over the built-in demo data set without a database
    Demo,
}

fn init_metrics(port: u16) {
    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
    {
        Ok(()) => info!(metrics_port = port, "started prometheus exporter"),
        Err(err) => warn!(error = %err, metrics_port = port, "failed to start prometheus exporter"),
    }
}

/// Token cancelled on Ctrl-C so an in-flight batch stops between jobs.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; stopping job matching");
            on_signal.cancel();
        }
    });
    token
}

fn postgres_service(
    db: &DbArgs,
    config: MatchingConfig,
) -> Result<MatchingService<PgMatchingStore, OutboxNotifier>, Box<dyn std::error::Error>> {
    let pool = create_pool_from_url(&db.db_url)?;
    let status = pool.status();
    info!(
        size = status.size,
        available = status.available,
        threshold = config.threshold,
        page_size = config.candidate_page_size,
        status_policy = ?config.status_policy,
        "created postgres connection pool for matcher"
    );

    let notifier = OutboxNotifier::new(pool.clone(), config.app_url.clone());
    Ok(MatchingService::new(
        PgMatchingStore::new(pool),
        notifier,
        config,
    ))
}

async fn schedule<S, N>(
    service: &MatchingService<S, N>,
    interval: Duration,
    cancel: &CancellationToken,
) where
    S: MatchingStore,
    N: MatchNotifier,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // A failed batch is retried on the next tick.
        if let Err(err) = service.run_batch(cancel).await {
            error!(error = %err, "job matching batch failed");
        }
    }

    info!("scheduler stopped");
}

async fn run_demo(config: MatchingConfig) -> Result<(BatchReport, Vec<JobMatch>), MatchingError> {
    let notifier = LogNotifier::new(config.app_url.clone());
    let store = InMemoryStore::from_dataset(matching_demo_dataset());
    let service = MatchingService::new(store, notifier, config);

    let report = service.run_batch(&CancellationToken::new()).await?;
    let matches = service.store().job_matches().await;
    Ok((report, matches))
}

fn render_matches(dataset: &Dataset, matches: &[JobMatch]) -> Vec<String> {
    let job_title = |id: i64| {
        dataset
            .job_posts
            .iter()
            .find(|j| j.id == id)
            .map_or("?", |j| j.title.as_str())
    };
    let user_name = |id: i64| {
        dataset
            .users
            .iter()
            .find(|u| u.id == id)
            .map_or("?", |u| u.name.as_str())
    };

    matches
        .iter()
        .map(|m| {
            format!(
                "{:<26} {:<20} {:>3}  skills={:<3} salary={:<3} location={:<3} {}",
                job_title(m.job_post_id),
                user_name(m.candidate_id),
                m.match_score,
                m.match_details.scores.skills,
                m.match_details.scores.salary,
                m.match_details.scores.location,
                m.status,
            )
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let cli = Cli::parse();
    if let Some(port) = cli.metrics_port {
        init_metrics(port);
    }

    let config = MatchingConfig::from_env()?;

    match cli.command {
        Command::Run { db } => {
            let service = postgres_service(&db, config)?;
            let report = service.run_batch(&shutdown_token()).await?;
            if let Some(reason) = report.skipped {
                info!(run_id = %report.run_id, reason = ?reason, "nothing to do");
            }
        }
        Command::Schedule { db, interval_secs } => {
            let service = postgres_service(&db, config)?;
            let interval = Duration::from_secs(interval_secs.max(1));
            info!(interval_secs = interval.as_secs(), "starting job matching scheduler");
            schedule(&service, interval, &shutdown_token()).await;
        }
        Command::Migrate { db } => {
            let pool = create_pool_from_url(&db.db_url)?;
            let applied = run_migrations(&pool).await?;
            info!(applied, "migrations complete");
        }
        Command::Demo => {
            let (report, matches) = run_demo(config).await?;
            for line in render_matches(&matching_demo_dataset(), &matches) {
                println!("{line}");
            }
            println!(
                "run {}: {} pairs scored, {} notifications",
                report.run_id, report.pairs_scored, report.notifications_sent
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{APP_NAME} failed: {err}");
        std::process::exit(1);
    }
}
