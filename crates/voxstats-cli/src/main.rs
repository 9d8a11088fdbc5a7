//! VoxStats CLI - session tracking for Voxyl Network players

mod display;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use voxstats_core::commands::link::{self as link_cmd, IntegrationCheck, LinkOutcome};
use voxstats_core::commands::session::{self as session_cmd, ViewOutcome};
use voxstats_core::config::Config;
use voxstats_core::domain::player::PlayerId;
use voxstats_core::domain::session::{Session, SessionReport, SessionSlot};
use voxstats_core::domain::stats::StatsSource;
use voxstats_core::storage::{Database, DatabaseConfig};
use voxstats_core::voxyl::VoxylClient;

use display::{level_progress_bar, signed, started_on, thousands};

#[derive(Parser)]
#[command(name = "voxstats")]
#[command(author, version, about = "Session tracking for Voxyl Network players", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Discord account to act as (defaults to VOXSTATS_DISCORD_ID)
    #[arg(long, global = true)]
    discord_id: Option<u64>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Link your Discord account to a player
    Link {
        /// Player UUID (dashed or undashed)
        player: String,
        /// Replace an existing link
        #[arg(long)]
        force: bool,
        /// Require a matching Voxyl Network integration
        #[arg(long)]
        verify: bool,
    },

    /// Remove your account link
    Unlink,

    /// Show the player your account is linked to
    Whoami,

    /// Manage tracking sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Start a new session
    Start {
        /// Session slot (1-3)
        #[arg(value_parser = parse_slot)]
        slot: SessionSlot,
    },
    /// End a session
    End {
        #[arg(value_parser = parse_slot)]
        slot: SessionSlot,
    },
    /// Reset a session's baseline to your current stats
    Reset {
        #[arg(value_parser = parse_slot)]
        slot: SessionSlot,
        /// Print the finished session's progress before resetting
        #[arg(long)]
        summary: bool,
    },
    /// List your active sessions
    Active,
    /// View a session's progress, starting it if it is not active
    View {
        /// Session slot (1-3)
        #[arg(value_parser = parse_slot, default_value = "1")]
        slot: SessionSlot,
        /// Player UUID to view instead of your linked account
        #[arg(short, long)]
        player: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

fn parse_slot(value: &str) -> Result<SessionSlot, String> {
    let number: i64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a slot number", value))?;
    SessionSlot::new(number).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("voxstats=info".parse()?)
                .add_directive("voxstats_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let ctx = CliContext {
        discord_id: cli.discord_id,
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Link {
            player,
            force,
            verify,
        } => cmd_link(&ctx, &player, force, verify).await,
        Commands::Unlink => cmd_unlink(&ctx).await,
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Session { action } => cmd_session(&ctx, action).await,
        Commands::Config { action } => cmd_config(action, ctx.quiet),
        Commands::Doctor => cmd_doctor(ctx.quiet).await,
    }
}

/// Global flags shared by every command
struct CliContext {
    discord_id: Option<u64>,
    format: OutputFormat,
    quiet: bool,
}

impl CliContext {
    fn discord_id(&self) -> anyhow::Result<u64> {
        if let Some(id) = self.discord_id {
            return Ok(id);
        }
        let raw = std::env::var("VOXSTATS_DISCORD_ID").map_err(|_| {
            anyhow!("No Discord account given. Pass --discord-id or set VOXSTATS_DISCORD_ID.")
        })?;
        raw.trim()
            .parse()
            .with_context(|| format!("Invalid VOXSTATS_DISCORD_ID: {}", raw))
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print `value` as JSON, or run `text` for human output
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        if self.json() {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else if !self.quiet {
            text();
        }
        Ok(())
    }
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database.resolved_path();
    Database::new(DatabaseConfig::with_path(&path))
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Live stats from the Voxyl API; needs an API key
fn live_source(config: &Config) -> anyhow::Result<Arc<dyn StatsSource>> {
    Ok(Arc::new(api_client(config)?))
}

fn api_client(config: &Config) -> anyhow::Result<VoxylClient> {
    let api_key = config.api.resolved_api_key()?.ok_or_else(|| {
        anyhow!("Stats API key not set. Set the VOXSTATS_API_KEY or API_KEY environment variable.")
    })?;
    Ok(VoxylClient::new(config.api.clone(), api_key)?)
}

async fn cmd_link(ctx: &CliContext, player: &str, force: bool, verify: bool) -> anyhow::Result<()> {
    let discord_id = ctx.discord_id()?;
    let player = PlayerId::from_uuid_str(player)?;
    let config = Config::load()?;

    if verify {
        let client = api_client(&config)?;
        if !client.has_ever_played(&player).await? {
            return Err(anyhow!("{} has never played on the Voxyl Network", player));
        }
        match link_cmd::verify_integration(&client, discord_id, &player).await? {
            IntegrationCheck::Verified => {}
            IntegrationCheck::NotIntegrated => {
                return Err(anyhow!(
                    "{} is not integrated with Discord account {} on the Voxyl Network. \
                     Integrate in-game first, then link again.",
                    player,
                    discord_id
                ));
            }
            IntegrationCheck::IntegratedElsewhere(other) => {
                return Err(anyhow!(
                    "Discord account {} is integrated with {}. Link that player instead.",
                    discord_id,
                    other
                ));
            }
        }
    }

    let db = open_database(&config).await?;
    let outcome = link_cmd::link(db.pool(), discord_id, &player, force).await?;

    match &outcome {
        LinkOutcome::Linked(link) => ctx.emit(&outcome, || {
            println!("Linked Discord account {} to {}.", link.discord_id, link.player_id);
        }),
        LinkOutcome::AlreadyLinked(link) => {
            ctx.emit(&outcome, || {
                println!(
                    "Already linked to {}. Run `voxstats unlink` or pass --force to replace it.",
                    link.player_id
                );
            })?;
            Err(anyhow!("Discord account {} is already linked", link.discord_id))
        }
    }
}

async fn cmd_unlink(ctx: &CliContext) -> anyhow::Result<()> {
    let discord_id = ctx.discord_id()?;
    let config = Config::load()?;
    let db = open_database(&config).await?;

    let removed = link_cmd::unlink(db.pool(), discord_id).await?;
    ctx.emit(&removed, || {
        println!("Unlinked from {}.", removed.player_id);
    })
}

async fn cmd_whoami(ctx: &CliContext) -> anyhow::Result<()> {
    let discord_id = ctx.discord_id()?;
    let config = Config::load()?;
    let db = open_database(&config).await?;

    match link_cmd::linked(db.pool(), discord_id).await? {
        Some(link) => ctx.emit(&link, || {
            println!("Linked to {}", link.player_id);
            println!("Since {}", started_on(link.linked_at, Utc::now()));
        }),
        None => Err(voxstats_core::Error::NotLinked(discord_id).into()),
    }
}

async fn cmd_session(ctx: &CliContext, action: SessionAction) -> anyhow::Result<()> {
    let discord_id = ctx.discord_id()?;
    let config = Config::load()?;

    match action {
        SessionAction::Start { slot } => {
            let source = live_source(&config)?;
            let db = open_database(&config).await?;
            let session = session_cmd::start(db.pool(), source, discord_id, slot).await?;
            ctx.emit(&session, || {
                println!("Started session {}.", session.slot);
            })
        }
        SessionAction::End { slot } => {
            let db = open_database(&config).await?;
            session_cmd::end(db.pool(), discord_id, slot).await?;
            ctx.emit(&serde_json::json!({ "ended": slot }), || {
                println!("Ended session {}.", slot);
            })
        }
        SessionAction::Reset { slot, summary } => {
            let source = live_source(&config)?;
            let db = open_database(&config).await?;
            if summary {
                let result =
                    session_cmd::reset_with_summary(db.pool(), source, discord_id, slot).await?;
                ctx.emit(&result, || {
                    print_report(&result.finished);
                    println!();
                    println!("Session {} reset.", slot);
                })
            } else {
                let session = session_cmd::reset(db.pool(), source, discord_id, slot).await?;
                ctx.emit(&session, || {
                    println!("Session {} reset. Previous progress was discarded.", session.slot);
                })
            }
        }
        SessionAction::Active => {
            let db = open_database(&config).await?;
            let slots = session_cmd::active(db.pool(), discord_id).await?;
            ctx.emit(&slots, || {
                if slots.is_empty() {
                    println!("No active sessions. Use `voxstats session start <slot>` to create one.");
                } else {
                    let list: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
                    println!("Active sessions: {}", list.join(", "));
                }
            })
        }
        SessionAction::View { slot, player } => {
            let player = player
                .as_deref()
                .map(PlayerId::from_uuid_str)
                .transpose()?;
            let client = api_client(&config)?;
            if let Some(player) = &player {
                if !client.has_ever_played(player).await? {
                    return Err(anyhow!("{} has never played on the Voxyl Network", player));
                }
            }

            let db = open_database(&config).await?;
            let outcome =
                session_cmd::view(db.pool(), Arc::new(client), discord_id, player, slot).await?;
            ctx.emit(&outcome, || match &outcome {
                ViewOutcome::Report(report) => print_report(report),
                ViewOutcome::Created(session) => print_created(session),
            })
        }
    }
}

fn print_created(session: &Session) {
    println!(
        "Session {} was not active, so it has been started for {}.",
        session.slot, session.player_id
    );
    println!("Run this command again later to see your progress.");
}

fn print_report(report: &SessionReport) {
    let c = &report.counters;
    println!("Session #{} for {}", report.slot, report.player_id);
    println!("Started {}", started_on(report.active_since, Utc::now()));
    println!();
    println!("  Wins           {:>10}", signed(c.wins));
    println!("  Weighted Wins  {:>10}", signed(c.weighted_wins));
    println!("  Kills          {:>10}", signed(c.kills));
    println!("  Final Kills    {:>10}", signed(c.finals));
    println!("  Beds Broken    {:>10}", signed(c.beds_broken));
    println!("  Levels Gained  {:>10}", report.progression.stars_gained);
    println!(
        "  EXP Gained     {:>10}",
        thousands(report.progression.experience_gained)
    );
    println!();
    println!(
        "  {}",
        level_progress_bar(report.live.level, report.live.partial_experience)
    );
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("VoxStats Health Check");
        println!("=====================");
        println!();
    }

    let mut all_ok = true;

    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            config
        }
        Err(e) => {
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            return Err(anyhow!("Health check failed"));
        }
    };

    match config.api.resolved_api_key() {
        Ok(Some(_)) => {
            if !quiet {
                let redacted = config.api.redacted_api_key()?.unwrap_or_default();
                println!("[OK] API Key: Configured ({})", redacted);
            }
        }
        Ok(None) => {
            all_ok = false;
            if !quiet {
                warn!("API Key: Not configured");
                println!("[!!] API Key: Not configured");
                println!("     Set VOXSTATS_API_KEY or API_KEY environment variable");
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] API Key: Error - {}", e);
            }
        }
    }

    if !quiet {
        match Config::config_path() {
            Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
            Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }
    }

    match open_database(&config).await {
        Ok(db) => match db.migration_status().await {
            Ok(status) if !status.needs_migration => {
                if !quiet {
                    let location = db
                        .path()
                        .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
                    println!(
                        "[OK] Database: {} (schema v{})",
                        location, status.current_version
                    );
                }
            }
            Ok(status) => {
                all_ok = false;
                if !quiet {
                    println!(
                        "[!!] Database: schema v{} behind v{}",
                        status.current_version, status.target_version
                    );
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Error - {}", e);
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: Error - {:#}", e);
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    if all_ok {
        Ok(())
    } else {
        Err(anyhow!("Health check failed"))
    }
}
