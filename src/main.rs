use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, TimeDelta};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use garage_analytics::config::{AppConfig, ConfigOverrides};
use garage_analytics::domain::analytics::event_analytics::{AnalyticsReport, AnalyticsSource};
use garage_analytics::domain::clock::clock::{SharedClock, WallClock};
use garage_analytics::domain::http::api_client::ApiClient;
use garage_analytics::domain::monitoring::monitoring_client::{MonitoringClient, MonitoringData};
use garage_analytics::domain::polling::periodic_task::PeriodicTask;
use garage_analytics::domain::providers::parking_data::{
    DataOrigin, DataSourcePolicy, ParkingDataSource, RemoteParkingProvider, SyntheticParkingProvider, TaggedSnapshot,
};
use garage_analytics::domain::providers::vehicle_events::SyntheticEventsProvider;
use garage_analytics::domain::revenue::revenue_client::RevenueClient;
use garage_analytics::domain::revenue::revenue_history::{revenue_history, revenue_projection};
use garage_analytics::domain::simulation::scheduler::{Scheduler, SimulationReport};
use garage_analytics::domain::simulation::simulation_config::SimulationPreset;
use garage_analytics::domain::simulation::vehicle_event::ScheduledEvent;
use garage_analytics::domain::submission::event_submitter::SharedEventSubmitter;
use garage_analytics::domain::submission::notification::{CompositeNotifier, LogNotifier};
use garage_analytics::domain::submission::webhook_submitter::{DryRunSubmitter, WebhookSubmitter};
use garage_analytics::domain::utils::id::SimulationRunId;
use garage_analytics::domain::utils::statistics::{StatisticsNotifier, StatsCollector};
use garage_analytics::{generate_simulation_plan, logger};

/// Garage analytics toolkit: load simulation, occupancy, revenue and monitoring.
#[derive(Parser, Debug)]
#[command(name = "garage-analytics", version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend API base URL, e.g. http://localhost:3003/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a load scenario and replay it against the webhook
    Simulate(SimulateArgs),

    /// Print the generated schedule without dispatching anything
    Preview(PreviewArgs),

    /// Show current garage occupancy
    Occupancy(OccupancyArgs),

    /// Show daily revenue, synthetic history and a twelve month projection
    Revenue(RevenueArgs),

    /// Show backend health and the monitoring dashboard
    Monitor(MonitorArgs),

    /// Summarize recent vehicle activity and occupancy per sector
    Analytics(AnalyticsArgs),
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    /// conservative, moderate or aggressive
    #[arg(long)]
    preset: Option<SimulationPreset>,

    /// Number of simulated vehicles
    #[arg(long)]
    vehicles: Option<u32>,

    /// Stay length of every vehicle in minutes
    #[arg(long)]
    duration: Option<u32>,

    /// Milliseconds between consecutive vehicle entries
    #[arg(long)]
    interval: Option<u64>,

    /// Seed for a reproducible schedule
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    plan: PlanArgs,

    /// Log events instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Write one CSV row per submission outcome to this file
    #[arg(long)]
    stats: Option<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    plan: PlanArgs,

    /// Print at most this many events
    #[arg(long, default_value_t = 30)]
    limit: usize,
}

#[derive(Args, Debug)]
struct OccupancyArgs {
    /// remote, synthetic or fallback
    #[arg(long, default_value = "fallback")]
    policy: DataSourcePolicy,

    /// Keep polling until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(Args, Debug)]
struct RevenueArgs {
    /// Day to query (YYYY-MM-DD), today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    sector: Option<String>,

    /// Also print a synthetic history of this many days
    #[arg(long)]
    history_days: Option<u32>,

    /// Monthly growth rate of the projection
    #[arg(long)]
    growth: Option<f64>,

    /// Seed for the synthetic history
    #[arg(long)]
    seed: Option<u64>,

    /// Keep polling the daily revenue until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(Args, Debug)]
struct AnalyticsArgs {
    /// Where sector occupancy comes from: remote, synthetic or fallback
    #[arg(long, default_value = "fallback")]
    policy: DataSourcePolicy,

    /// Seed for the synthetic activity feed
    #[arg(long)]
    seed: Option<u64>,

    /// Keep polling until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// Keep polling until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let plan_args = match &cli.command {
        Commands::Simulate(args) => Some(args.plan.clone()),
        Commands::Preview(args) => Some(args.plan.clone()),
        _ => None,
    };
    if let Some(preset) = plan_args.as_ref().and_then(|p| p.preset) {
        config.simulation = preset.config();
    }

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        vehicle_count: plan_args.as_ref().and_then(|p| p.vehicles),
        duration_minutes: plan_args.as_ref().and_then(|p| p.duration),
        event_interval_ms: plan_args.as_ref().and_then(|p| p.interval),
        growth_rate: match &cli.command {
            Commands::Revenue(args) => args.growth,
            _ => None,
        },
        statistics_file: match &cli.command {
            Commands::Simulate(args) => args.stats.clone(),
            _ => None,
        },
    };
    let config = config.apply(overrides).context("invalid configuration")?;

    let _log_guard = logger::init_from_config(&config.logging);
    log::debug!("Effective configuration: {:?}", config);

    let clock: SharedClock = Arc::new(WallClock);

    match cli.command {
        Commands::Simulate(args) => simulate(&config, clock, args).await,
        Commands::Preview(args) => preview(&config, clock, args),
        Commands::Occupancy(args) => occupancy(&config, clock, args).await,
        Commands::Revenue(args) => revenue(&config, clock, args).await,
        Commands::Monitor(args) => monitor(&config, args).await,
        Commands::Analytics(args) => analytics(&config, clock, args).await,
    }
}

async fn simulate(config: &AppConfig, clock: SharedClock, args: SimulateArgs) -> anyhow::Result<()> {
    let plan = generate_simulation_plan(config.simulation, clock.now(), args.plan.seed)?;
    let summary = plan.summary();

    println!("{}", "▶ LOAD SIMULATION".bright_yellow().bold());
    println!(
        "  {} vehicles, {} min stays, {} events over {}",
        summary.vehicle_count,
        summary.duration,
        summary.total_events,
        format_span(plan.last_delay_ms())
    );
    println!("  target: {}", if args.dry_run { "dry run".cyan().to_string() } else { config.base_url.bright_white().to_string() });

    let submitter: SharedEventSubmitter = if args.dry_run {
        Arc::new(DryRunSubmitter)
    } else {
        Arc::new(WebhookSubmitter::new(ApiClient::new(config.base_url.clone(), config.timeout)?))
    };

    let run_id = SimulationRunId::generate();
    let mut notifier = CompositeNotifier::new().with(Arc::new(LogNotifier));
    let collector = match &config.statistics_file {
        Some(file) => {
            let collector = Arc::new(StatsCollector::init(Some(file.as_str())).with_context(|| format!("cannot create statistics file '{}'", file))?);
            let stats_notifier = StatisticsNotifier::new(collector.clone());
            stats_notifier.set_run_id(run_id.clone());
            notifier = notifier.with(Arc::new(stats_notifier));
            Some(collector)
        }
        None => None,
    };

    let mut scheduler = Scheduler::new(submitter, Arc::new(notifier));
    scheduler.start_run(run_id, plan.into_events())?;
    println!("  {} (Ctrl-C to stop)", "running".green());

    let report = tokio::select! {
        report = scheduler.wait() => report,
        _ = tokio::signal::ctrl_c() => {
            println!("  {}", "stopping, pending timers are cancelled".yellow());
            scheduler.stop();
            scheduler.wait().await
        }
    };

    if let Some(collector) = collector {
        collector.shutdown();
    }
    if let Some(report) = report {
        print_report(&report);
    }
    Ok(())
}

fn preview(config: &AppConfig, clock: SharedClock, args: PreviewArgs) -> anyhow::Result<()> {
    let plan = generate_simulation_plan(config.simulation, clock.now(), args.plan.seed)?;
    let summary = plan.summary();

    println!("{}", "▶ SCHEDULE PREVIEW".bright_yellow().bold());
    println!("  {} events, last one at +{}", summary.total_events, format_span(plan.last_delay_ms()));

    for scheduled in plan.events.iter().take(args.limit) {
        print_scheduled(scheduled);
    }
    if plan.len() > args.limit {
        println!("  ... {} more", plan.len() - args.limit);
    }
    Ok(())
}

async fn occupancy(config: &AppConfig, clock: SharedClock, args: OccupancyArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(config.base_url.clone(), config.timeout)?;
    let source = Arc::new(ParkingDataSource::new(
        Arc::new(RemoteParkingProvider::new(client, clock.clone())),
        Arc::new(SyntheticParkingProvider::new(clock)),
        args.policy,
    ));

    if !args.watch {
        match source.fetch().await {
            Ok(tagged) => print_snapshot(&tagged),
            Err(e) => println!("{} {}", "✗".red(), e.user_message()),
        }
        return Ok(());
    }

    watch("parking", config.polling.parking, move || {
        let source = source.clone();
        async move {
            match source.fetch().await {
                Ok(tagged) => print_snapshot(&tagged),
                Err(e) => println!("{} {}", "✗".red(), e.user_message()),
            }
        }
    })
    .await
}

async fn revenue(config: &AppConfig, clock: SharedClock, args: RevenueArgs) -> anyhow::Result<()> {
    let client = Arc::new(RevenueClient::new(ApiClient::new(config.base_url.clone(), config.timeout)?, clock.clone()));
    let sector = args.sector.as_deref();

    if args.watch {
        let (date, sector) = (args.date, args.sector.clone());
        return watch("revenue", config.polling.revenue, move || {
            let (client, sector) = (client.clone(), sector.clone());
            async move {
                print_revenue(&client, date, sector.as_deref()).await;
            }
        })
        .await;
    }

    println!("{}", "▶ REVENUE".bright_yellow().bold());
    let current = print_revenue(&client, args.date, sector).await;

    if let Some(days) = args.history_days {
        let end = args.date.unwrap_or_else(|| clock.now().date_naive());
        let start = end.checked_sub_signed(TimeDelta::days(days as i64)).unwrap_or(NaiveDate::MIN);
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        println!("{}", "▶ HISTORY (synthetic)".bright_yellow().bold());
        for entry in revenue_history(start, end, sector.unwrap_or("A"), &mut rng) {
            println!("  {}  {:>10.2} {}", entry.date, entry.amount, entry.currency);
        }
    }

    if let Some(amount) = current {
        println!("{}", format!("▶ PROJECTION ({:.0}% monthly growth)", config.simulation.growth_rate * 100.0).bright_yellow().bold());
        for entry in revenue_projection(amount, config.simulation.growth_rate) {
            println!("  month {:>2}  {:>12.2} {}", entry.month, entry.amount, entry.currency);
        }
    }
    Ok(())
}

async fn print_revenue(client: &RevenueClient, date: Option<NaiveDate>, sector: Option<&str>) -> Option<f64> {
    match client.fetch(date, sector).await {
        Ok(dto) => {
            println!("  {:.2} {} ({})", dto.amount, dto.currency, dto.timestamp);
            Some(dto.amount)
        }
        Err(e) => {
            println!("  {} {}", "✗".red(), e.user_message());
            None
        }
    }
}

async fn monitor(config: &AppConfig, args: MonitorArgs) -> anyhow::Result<()> {
    let client = Arc::new(MonitoringClient::new(ApiClient::new(config.base_url.clone(), config.timeout)?));

    if !args.watch {
        match client.fetch().await {
            Ok(data) => print_monitoring(&data),
            Err(e) => println!("{} {}", "✗".red(), e.user_message()),
        }
        return Ok(());
    }

    watch("monitoring", config.polling.monitoring, move || {
        let client = client.clone();
        async move {
            match client.fetch().await {
                Ok(data) => print_monitoring(&data),
                Err(e) => println!("{} {}", "✗".red(), e.user_message()),
            }
        }
    })
    .await
}

async fn analytics(config: &AppConfig, clock: SharedClock, args: AnalyticsArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(config.base_url.clone(), config.timeout)?;
    let parking = ParkingDataSource::new(
        Arc::new(RemoteParkingProvider::new(client, clock.clone())),
        Arc::new(SyntheticParkingProvider::new(clock.clone())),
        args.policy,
    );
    let events = match args.seed {
        Some(seed) => SyntheticEventsProvider::seeded(seed, clock),
        None => SyntheticEventsProvider::new(clock),
    };
    let source = Arc::new(AnalyticsSource::new(parking, Arc::new(events)));

    if !args.watch {
        match source.fetch().await {
            Ok(report) => print_analytics(&report),
            Err(e) => println!("{} {}", "✗".red(), e.user_message()),
        }
        return Ok(());
    }

    watch("analytics", config.polling.events, move || {
        let source = source.clone();
        async move {
            match source.fetch().await {
                Ok(report) => print_analytics(&report),
                Err(e) => println!("{} {}", "✗".red(), e.user_message()),
            }
        }
    })
    .await
}

async fn watch<F, Fut>(name: &str, period: Duration, job: F) -> anyhow::Result<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = PeriodicTask::start(name, period, job);
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;

    let stats = task.stop().await;
    println!("{} polled {} times, {} ticks skipped while a request was in flight", name, stats.runs, stats.skipped);
    Ok(())
}

fn format_span(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{}m{:02}s", minutes, seconds)
}

fn print_scheduled(scheduled: &ScheduledEvent) {
    let event = &scheduled.event;
    println!("  +{:>9}  {}  {:<6}  sector {}", format_span(scheduled.delay_ms), event.license_plate, event.event_type(), event.sector);
}

fn print_report(report: &SimulationReport) {
    println!("{}", "▶ RESULT".bright_yellow().bold());
    println!("  run        {}", report.run_id);
    println!("  armed      {}", report.armed);
    println!("  dispatched {}", report.dispatched);
    println!("  succeeded  {}", report.succeeded.to_string().green());
    println!("  failed     {}", if report.failed > 0 { report.failed.to_string().red() } else { report.failed.to_string().normal() });
    println!("  cancelled  {}", report.cancelled);
}

fn print_snapshot(tagged: &TaggedSnapshot) {
    let snapshot = &tagged.snapshot;
    let origin = match tagged.origin {
        DataOrigin::Remote => "live".green(),
        DataOrigin::Synthetic => "synthetic".yellow(),
    };

    println!(
        "{} [{}] {}/{} occupied ({:.1}%), {} free",
        snapshot.generated_at.format("%H:%M:%S"),
        origin,
        snapshot.occupied_spots,
        snapshot.total_spots,
        snapshot.occupancy_rate() * 100.0,
        snapshot.available_spots()
    );
    for sector in &snapshot.sectors {
        println!("    sector {:<3} {:>4}/{:<4} {:>3}%", sector.name, sector.occupied_spots, sector.total_spots, sector.occupancy_percent);
    }
}

fn print_analytics(report: &AnalyticsReport) {
    let summary = &report.summary;
    let origin = match report.origin {
        DataOrigin::Remote => "live".green(),
        DataOrigin::Synthetic => "synthetic".yellow(),
    };

    println!("{}", "▶ ANALYTICS".bright_yellow().bold());
    println!(
        "  {} events: {} entries, {} exits, {} parked; average stay {:.0} min",
        summary.total_events,
        summary.entries.to_string().green(),
        summary.exits.to_string().red(),
        summary.parked,
        summary.average_stay_minutes
    );
    println!("  occupancy by sector [{}]", origin);
    for sector in &summary.occupancy_by_sector {
        println!("    sector {:<3} {:>5.1}%", sector.name, sector.occupancy_percent);
    }
}

fn print_monitoring(data: &MonitoringData) {
    let status = if data.is_healthy() { "UP".green().bold() } else { "DEGRADED".red().bold() };
    println!("{} health: {} (actuator {}, detailed {})", "▶".bright_yellow(), status, data.health.status, data.detailed_health.status);

    if let Some(line) = data.occupancy_line() {
        println!("  {}", line);
    }
    if let Some(activity) = &data.dashboard.today_activity {
        println!("  today: {} entries, {} exits, {:.2} revenue", activity.entries, activity.exits, activity.revenue);
    }
    if let Some(performance) = &data.dashboard.performance {
        let show = |v: &Option<serde_json::Value>| v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string());
        println!(
            "  performance: avg {} / errors {} / throughput {}",
            show(&performance.avg_response_time),
            show(&performance.error_rate),
            show(&performance.throughput)
        );
    }
}
