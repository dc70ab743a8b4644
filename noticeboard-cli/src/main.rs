//! Noticeboard CLI
//!
//! Runs the API server and manages announcements from the terminal.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use noticeboard_api::{ApiConfig, ApiServer};
use noticeboard_core::constants::DEFAULT_PORT;
use noticeboard_core::types::timestamp::{format_timestamp, parse_timestamp};
use noticeboard_core::types::{Announcement, AnnouncementPatch, NewAnnouncement};
use noticeboard_store::AnnouncementStore;

/// Noticeboard - announcements feed with a token-gated admin API
#[derive(Parser)]
#[command(name = "noticeboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Secondary JSON file (overrides NOTICEBOARD_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Show the feed, most recent first
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish an announcement
    Post {
        /// Title
        #[arg(short, long)]
        title: String,
        /// Body text
        #[arg(short, long)]
        body: String,
        /// Publication time (ISO 8601), defaults to now
        #[arg(long)]
        published_at: Option<String>,
        /// Pin the announcement
        #[arg(long)]
        highlight: bool,
    },

    /// Edit an announcement
    Edit {
        /// Announcement ID
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New body text
        #[arg(short, long)]
        body: Option<String>,
        /// New publication time (ISO 8601)
        #[arg(long)]
        published_at: Option<String>,
        /// Set or clear the highlight flag
        #[arg(long)]
        highlight: Option<bool>,
    },

    /// Delete an announcement
    Delete {
        /// Announcement ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "noticeboard=debug,info"
    } else {
        "noticeboard=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(cli.data_file)?;

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::List { json } => cmd_list(&open_store(&config)?, json).await,
        Commands::Post {
            title,
            body,
            published_at,
            highlight,
        } => {
            let store = open_store(&config)?;
            cmd_post(&store, title, body, published_at.as_deref(), highlight).await
        }
        Commands::Edit {
            id,
            title,
            body,
            published_at,
            highlight,
        } => {
            let patch = build_patch(title, body, published_at.as_deref(), highlight)?;
            cmd_edit(&open_store(&config)?, &id, patch).await
        }
        Commands::Delete { id, yes } => cmd_delete(&open_store(&config)?, &id, yes).await,
    }
}

fn load_config(data_file: Option<PathBuf>) -> Result<ApiConfig> {
    let mut config = ApiConfig::from_env().context("Failed to read configuration")?;
    if let Some(path) = data_file {
        config.store = config.store.with_data_file(path);
    }
    Ok(config)
}

fn open_store(config: &ApiConfig) -> Result<AnnouncementStore> {
    config.store.build().context("Failed to open announcement store")
}

fn build_new(
    title: String,
    body: String,
    published_at: Option<&str>,
    highlight: bool,
) -> Result<NewAnnouncement> {
    let mut new = NewAnnouncement::new(title, body).highlight(highlight);
    new.validate()?;
    if let Some(raw) = published_at {
        new = new.published_at(parse_timestamp(raw)?);
    }
    Ok(new)
}

fn build_patch(
    title: Option<String>,
    body: Option<String>,
    published_at: Option<&str>,
    highlight: Option<bool>,
) -> Result<AnnouncementPatch> {
    let patch = AnnouncementPatch {
        title,
        body,
        published_at: published_at.map(parse_timestamp).transpose()?,
        highlight,
    };
    patch.validate()?;
    Ok(patch)
}

fn print_announcement(entry: &Announcement) {
    let marker = if entry.highlight { "★".yellow().bold() } else { " ".normal() };
    println!(
        "{} {}  {}",
        marker,
        entry.title.bold(),
        format_timestamp(&entry.published_at).dimmed()
    );
    for line in entry.body.lines() {
        println!("    {}", line);
    }
    println!("    {} {}", "id:".dimmed(), entry.id.dimmed());
}

/// Run the API server
async fn cmd_serve(config: ApiConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting noticeboard API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    info!(store = ?config.store, "Building server state");
    let server = ApiServer::new(config).context("Failed to initialize server")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    server.run(addr).await?;

    Ok(())
}

/// Print the feed
async fn cmd_list(store: &AnnouncementStore, json: bool) -> Result<()> {
    let feed = store.list().await.context("Failed to load announcements")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }

    if feed.is_empty() {
        println!("{}", "No announcements yet.".dimmed());
        return Ok(());
    }

    println!("{} {}\n", "📋 Announcements:".cyan().bold(), feed.len());
    for entry in &feed {
        print_announcement(entry);
        println!();
    }

    Ok(())
}

/// Publish an announcement
async fn cmd_post(
    store: &AnnouncementStore,
    title: String,
    body: String,
    published_at: Option<&str>,
    highlight: bool,
) -> Result<()> {
    let new = build_new(title, body, published_at, highlight)?;
    let entry = store.create(new).await.context("Failed to publish announcement")?;

    println!("{}", "✅ Published:".green().bold());
    print_announcement(&entry);
    warn_on_divergence(store);

    Ok(())
}

/// Edit an announcement
async fn cmd_edit(store: &AnnouncementStore, id: &str, patch: AnnouncementPatch) -> Result<()> {
    let entry = store
        .update(id, patch)
        .await
        .with_context(|| format!("Failed to update announcement {}", id))?;

    println!("{}", "✅ Updated:".green().bold());
    print_announcement(&entry);
    warn_on_divergence(store);

    Ok(())
}

/// Delete an announcement
async fn cmd_delete(store: &AnnouncementStore, id: &str, yes: bool) -> Result<()> {
    let entry = store
        .get(id)
        .await
        .with_context(|| format!("Failed to load announcement {}", id))?;

    if !yes {
        print_announcement(&entry);
        let confirmed = Confirm::new()
            .with_prompt("Delete this announcement?")
            .default(false)
            .interact()?;
        if !confirmed {
            bail!("Aborted");
        }
    }

    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete announcement {}", id))?;

    println!("{} {}", "🗑  Deleted:".green().bold(), entry.title);
    warn_on_divergence(store);

    Ok(())
}

fn warn_on_divergence(store: &AnnouncementStore) {
    if let Some(last) = store.divergence().last {
        warn!(
            operation = last.operation,
            durable = last.durable_backend,
            fallback = last.fallback_backend,
            "Write only reached the fallback backend"
        );
        println!(
            "\n{} {} write failed ({}), saved to {} instead",
            "⚠️ ".red().bold(),
            last.durable_backend,
            last.error,
            last.fallback_backend
        );
    }
}
