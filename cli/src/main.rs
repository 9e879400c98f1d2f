use std::thread;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use feedback_core::config::{self, DASHBOARD_REFRESH_INTERVAL};
use feedback_core::{
    poll_until_awake, Analytics, Dashboard, Feedback, FeedbackClient, FeedbackFilter, HealthMonitor, HealthStatus,
    Metric, WakePolicy,
};
use serde::Serialize;
use tracing::{info, warn};

mod output;
#[cfg(test)]
mod test_support;
mod transport;

use transport::Transport;

#[derive(Parser)]
#[command(name = "feedback", version, about = "Customer feedback dashboard: submit reviews and inspect analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the feedback API
    #[arg(long, global = true, env = config::API_URL_ENV)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a star rating and review
    Submit {
        /// Star rating, 1-5
        #[arg(long, short)]
        rating: u8,

        /// Review text
        #[arg(long, short)]
        text: String,

        /// Wake a sleeping backend before submitting
        #[arg(long)]
        wake: bool,
    },

    /// List submitted feedback
    List {
        /// Only show reviews with this star rating
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Case-insensitive search over review text and AI summary
        #[arg(long, default_value = "")]
        search: String,

        /// Maximum reviews to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one review with its AI enrichment
    Show {
        /// Feedback ID
        id: i64,
    },

    /// Delete a review
    Delete {
        /// Feedback ID
        id: i64,
    },

    /// Show server-computed analytics
    Analytics,

    /// Metrics, analytics and recent reviews in one view
    Dashboard {
        /// Keep refreshing every 10 seconds
        #[arg(long)]
        watch: bool,

        /// Only show reviews with this star rating
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Filter recent reviews by text
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Check whether the backend is awake
    Health,

    /// Poll a sleeping backend until it comes online
    Wake,
}

/// Everything needed to run a command against one backend.
struct App {
    client: FeedbackClient,
    transport: Transport,
    json: bool,
    wake_policy: WakePolicy,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_base = config::resolve_api_base(cli.api_url.as_deref());
    info!(%api_base, "using feedback API");

    let ctx = App {
        client: FeedbackClient::new(&api_base),
        transport: Transport::new(),
        json: cli.json,
        wake_policy: WakePolicy::default(),
    };

    match cli.command {
        Commands::Submit { rating, text, wake } => submit(&ctx, rating, &text, wake),
        Commands::List { rating, search, limit } => list(&ctx, FeedbackFilter::new(rating, search), limit),
        Commands::Show { id } => show(&ctx, id),
        Commands::Delete { id } => delete(&ctx, id),
        Commands::Analytics => analytics(&ctx),
        Commands::Dashboard { watch, rating, search } => dashboard(&ctx, FeedbackFilter::new(rating, search), watch),
        Commands::Health => health(&ctx),
        Commands::Wake => wake(&ctx),
    }
}

fn fetch_feedback(ctx: &App) -> Result<Vec<Feedback>> {
    let response = ctx.transport.execute(ctx.client.build_list_feedback())?;
    Ok(ctx.client.parse_list_feedback(response)?)
}

fn fetch_analytics(ctx: &App) -> Result<Analytics> {
    let response = ctx.transport.execute(ctx.client.build_analytics())?;
    Ok(ctx.client.parse_analytics(response)?)
}

/// Probe once, then run the bounded wake poll if the backend is asleep.
fn wake(ctx: &App) -> Result<()> {
    let mut monitor = HealthMonitor::new(ctx.wake_policy);
    if !ctx.json {
        eprintln!("Waking backend at {} ...", ctx.client.health_url());
    }
    let status = poll_until_awake(&mut monitor, || ctx.transport.probe(&ctx.client), thread::sleep);
    if ctx.json {
        output::print_json(&serde_json::json!({ "status": status, "attempts": monitor.attempts() }))?;
    } else {
        output::print_health(status, ctx.client.health_url());
    }
    if status != HealthStatus::Online {
        bail!("Backend did not wake after {} attempts", monitor.attempts());
    }
    Ok(())
}

/// Keep polling through `monitor` until the backend answers. Prints nothing.
fn wait_until_online(ctx: &App, monitor: &mut HealthMonitor) -> Result<()> {
    let status = poll_until_awake(monitor, || ctx.transport.probe(&ctx.client), thread::sleep);
    if status != HealthStatus::Online {
        bail!("Backend did not wake after {} attempts", monitor.attempts());
    }
    Ok(())
}

fn health(ctx: &App) -> Result<()> {
    let mut monitor = HealthMonitor::new(ctx.wake_policy);
    let status = monitor.record_probe(ctx.transport.probe(&ctx.client));
    if ctx.json {
        output::print_json(&serde_json::json!({ "status": status, "url": ctx.client.health_url() }))?;
    } else {
        output::print_health(status, ctx.client.health_url());
    }
    Ok(())
}

/// Health-check (and with `wake_first`, wake) the backend, then send one
/// submission.
fn submit_feedback(ctx: &App, rating: u8, text: &str, wake_first: bool) -> Result<Feedback> {
    // Validate before touching the network at all.
    let request = ctx.client.build_submit_feedback(rating, text)?;

    let mut monitor = HealthMonitor::new(ctx.wake_policy);
    monitor.record_probe(ctx.transport.probe(&ctx.client));
    if !monitor.can_submit() {
        if !wake_first {
            bail!("Backend is offline. Run `feedback wake` or pass --wake to wait for it.");
        }
        info!("backend offline, waking before submit");
        wait_until_online(ctx, &mut monitor)?;
    }

    let response = ctx.transport.execute(request)?;
    let created = ctx.client.parse_submit_feedback(response)?;
    info!(id = created.id, attempts = monitor.attempts(), "feedback submitted");
    Ok(created)
}

fn submit(ctx: &App, rating: u8, text: &str, wake_first: bool) -> Result<()> {
    let created = submit_feedback(ctx, rating, text, wake_first)?;
    if ctx.json {
        return output::print_json(&created);
    }
    println!("Thank you!");
    if let Some(reply) = &created.ai_response {
        println!("\"{reply}\"");
    }
    Ok(())
}

fn list(ctx: &App, filter: FeedbackFilter, limit: Option<usize>) -> Result<()> {
    let items = fetch_feedback(ctx)?;
    let mut visible = filter.apply(&items);
    if let Some(limit) = limit {
        visible.truncate(limit);
    }
    if ctx.json {
        return output::print_json(&visible);
    }
    output::print_feedback_table(&visible, items.len());
    Ok(())
}

fn show(ctx: &App, id: i64) -> Result<()> {
    let mut dashboard = Dashboard::new();
    dashboard.set_feedback(fetch_feedback(ctx)?);
    let item = dashboard
        .select(id)
        .with_context(|| format!("No feedback with id {id}"))?;
    if ctx.json {
        return output::print_json(item);
    }
    output::print_feedback_detail(item);
    Ok(())
}

fn delete(ctx: &App, id: i64) -> Result<()> {
    let response = ctx.transport.execute(ctx.client.build_delete_feedback(id))?;
    let confirmation = ctx
        .client
        .parse_delete_feedback(response)
        .with_context(|| format!("Failed to delete review {id}"))?;
    if ctx.json {
        return output::print_json(&confirmation);
    }
    println!(
        "{}",
        confirmation
            .message
            .unwrap_or_else(|| format!("Deleted review {id}"))
    );
    Ok(())
}

fn analytics(ctx: &App) -> Result<()> {
    let analytics = fetch_analytics(ctx)?;
    if ctx.json {
        return output::print_json(&analytics);
    }
    output::print_analytics(&analytics);
    Ok(())
}

#[derive(Serialize)]
struct DashboardSnapshot<'a> {
    metrics: Vec<Metric>,
    analytics: Option<&'a Analytics>,
    recent: Vec<&'a Feedback>,
}

/// Fetch feedback and analytics in parallel and apply both to the view.
fn refresh(ctx: &App, dashboard: &mut Dashboard) -> Result<()> {
    let (feedback, analytics) = thread::scope(|s| {
        let feedback = s.spawn(|| fetch_feedback(ctx));
        let analytics = fetch_analytics(ctx);
        let feedback = feedback
            .join()
            .unwrap_or_else(|_| Err(anyhow::anyhow!("feedback fetch panicked")));
        (feedback, analytics)
    });
    dashboard.apply_refresh(feedback?, analytics?, chrono::Utc::now());
    Ok(())
}

fn dashboard(ctx: &App, filter: FeedbackFilter, watch: bool) -> Result<()> {
    let mut dashboard = Dashboard::new();
    dashboard.filter = filter;
    loop {
        match refresh(ctx, &mut dashboard) {
            Ok(()) => render_dashboard(ctx, &dashboard)?,
            // A failed poll keeps the last good view on screen.
            Err(err) if watch => warn!(error = %err, "dashboard refresh failed"),
            Err(err) => return Err(err),
        }
        if !watch {
            return Ok(());
        }
        thread::sleep(DASHBOARD_REFRESH_INTERVAL);
    }
}

fn render_dashboard(ctx: &App, dashboard: &Dashboard) -> Result<()> {
    if ctx.json {
        return output::print_json(&DashboardSnapshot {
            metrics: dashboard.metrics(),
            analytics: dashboard.analytics(),
            recent: dashboard.recent(),
        });
    }
    output::print_dashboard(dashboard);
    Ok(())
}
