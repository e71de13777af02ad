//! # StatusBot
//!
//! Sends a record-status report to an operator channel once a day and
//! serves the same report on demand.
//!
//! Usage:
//!   statusbot                          # Gateway + daily trigger
//!   statusbot report                   # Print the report now
//!   statusbot send --channel 12345     # Build and deliver once now
//!   statusbot config                   # Show the effective configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use statusbot_channels::{DiscordChannel, DiscordConfig, WebhookSink};
use statusbot_core::StatusBotConfig;
use statusbot_core::config::DeliveryTarget;
use statusbot_core::traits::DeliverySink;
use statusbot_gateway::AppState;
use statusbot_report::{AggregateOptions, ReportService, SupabaseFetcher};
use statusbot_scheduler::{DailyTrigger, Dispatcher, ReportJob, TriggerState, ZonedClock};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "statusbot",
    version,
    about = "📊 StatusBot — daily record-status reports"
)]
struct Cli {
    /// Path to config.toml (default: ~/.statusbot/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway and the daily trigger (default)
    Serve,
    /// Build the report now and print it
    Report,
    /// Build the report now and deliver it once
    Send {
        /// Destination (channel id or webhook URL); defaults to the configured one
        #[arg(long)]
        channel: Option<String>,
    },
    /// Print the effective configuration with secrets masked
    Config,
}

fn load_config(path: Option<&str>) -> Result<StatusBotConfig> {
    let mut config = match path {
        Some(p) => StatusBotConfig::load_from(&PathBuf::from(shellexpand::tilde(p).to_string()))?,
        None => StatusBotConfig::load()?,
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn build_sink(config: &StatusBotConfig) -> Arc<dyn DeliverySink> {
    match config.delivery.target {
        DeliveryTarget::Discord => Arc::new(DiscordChannel::new(DiscordConfig::new(
            config.delivery.bot_token.as_deref().unwrap_or_default(),
        ))),
        DeliveryTarget::Webhook => Arc::new(WebhookSink::new()),
    }
}

fn build_reports(config: &StatusBotConfig) -> ReportService {
    ReportService::new(
        Arc::new(SupabaseFetcher::new(&config.source)),
        AggregateOptions::from(&config.report),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "statusbot=debug,tower_http=debug"
    } else {
        "statusbot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Report => {
            let report = build_reports(&config).build().await;
            println!("{}", report.content);
            Ok(())
        }
        Command::Send { channel } => {
            let destination = channel
                .or_else(|| config.destination().map(String::from))
                .ok_or_else(|| anyhow::anyhow!("No destination: pass --channel or set STATUS_CHANNEL_ID"))?;
            let report = build_reports(&config).build().await;
            let dispatcher = Dispatcher::new(build_sink(&config));
            dispatcher
                .dispatch("Manual status report", &destination, &report)
                .await?;
            println!("✅ Report delivered to {destination}");
            Ok(())
        }
        Command::Config => {
            let mut masked = config.clone();
            for secret in [&mut masked.source.api_key, &mut masked.delivery.bot_token] {
                if secret.is_some() {
                    *secret = Some("***".into());
                }
            }
            println!("{}", toml::to_string_pretty(&masked)?);
            Ok(())
        }
    }
}

async fn serve(config: StatusBotConfig) -> Result<()> {
    if config.source.api_key.is_none() {
        tracing::warn!("⚠️ SUPABASE_KEY not configured — reports will show a configuration error");
    }

    let reports = build_reports(&config);
    let dispatcher = Arc::new(Dispatcher::new(build_sink(&config)));
    let trigger_state = TriggerState::new();
    let destination = config.destination().map(String::from);

    match &destination {
        Some(dest) => {
            let job = ReportJob::new(reports.clone(), dispatcher.clone(), dest);
            DailyTrigger::new(
                config.schedule.hour,
                config.schedule.minute,
                ZonedClock::new(config.schedule.tz()?),
                trigger_state.clone(),
                Arc::new(job),
            )?
            .with_poll_interval(Duration::from_secs(config.schedule.poll_interval_secs))
            .start();
            tracing::info!(
                "📅 Daily report scheduled at {:02}:{:02} ({}) → {}",
                config.schedule.hour,
                config.schedule.minute,
                config.schedule.timezone,
                dest
            );
        }
        None => {
            tracing::info!("⚠️ No destination configured (STATUS_CHANNEL_ID) — daily report disabled");
        }
    }

    let state = Arc::new(AppState {
        reports,
        dispatcher,
        trigger_state,
        schedule: config.schedule.clone(),
        destination,
        start_time: std::time::Instant::now(),
    });

    println!("📊 StatusBot v{}", env!("CARGO_PKG_VERSION"));
    println!("   🌐 Gateway: http://{}:{}", config.gateway.host, config.gateway.port);
    println!();

    statusbot_gateway::start_server(state, &config.gateway).await?;
    Ok(())
}
