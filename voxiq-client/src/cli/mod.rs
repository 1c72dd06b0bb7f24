//! Command-line interface
//!
//! Thin front-end over the stores and the upload orchestrator. Handlers
//! render store state and feed user actions back in; nothing here owns
//! protocol logic.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use commands::Context;
use voxiq_common::config::resolve_config;

#[derive(Parser)]
#[command(name = "voxiq", version, about = "VoxIQ interview insights client")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload interview files and track processing to completion
    Upload {
        /// Files to upload (.txt .md .pdf .docx .mp3 .wav .mp4)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List and inspect interviews
    Interviews {
        #[command(subcommand)]
        command: InterviewsCommand,
    },
    /// List and manage themes
    Themes {
        #[command(subcommand)]
        command: ThemesCommand,
    },
    /// Manage insights
    Insights {
        #[command(subcommand)]
        command: InsightsCommand,
    },
    /// Ask a question across your interviews (interactive when omitted)
    Ask {
        question: Option<String>,
    },
    /// Browse past ask conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationsCommand,
    },
    /// Export insights or an interview as markdown
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Show this month's usage counters
    Usage,
    /// Show plan limits and remaining quota
    Limits,
    /// Load demo sample data into the workspace
    Demo,
    /// Manage stored credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand)]
pub enum InterviewsCommand {
    /// List interviews
    List {
        /// Sort key: recent, name, or status
        #[arg(long, default_value = "recent")]
        sort: String,
    },
    /// Show one interview with transcript and insights
    Show { id: String },
    /// Delete an interview
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ThemesCommand {
    /// List themes (active and previous)
    List {
        /// Sort key: urgency, mentions, or recency
        #[arg(long, default_value = "urgency")]
        sort: String,
    },
    /// Show one theme with sub-themes and insights
    Show { id: String },
    /// Rename a theme
    Rename { id: String, name: String },
}

#[derive(Subcommand)]
pub enum InsightsCommand {
    /// Add a manual insight to an interview
    Add {
        interview_id: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        quote: String,
        #[arg(long)]
        theme_id: Option<String>,
    },
    /// Update an insight's category, title, or theme
    Update {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        theme_id: Option<String>,
    },
    /// Dismiss an insight
    Dismiss { id: String },
    /// Flag an insight for review
    Flag { id: String },
}

#[derive(Subcommand)]
pub enum ConversationsCommand {
    /// List past conversations
    List,
    /// Show one conversation with its messages
    Show { id: String },
}

#[derive(Subcommand)]
pub enum ExportCommand {
    /// Export all active themes and insights
    Insights {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export one interview
    Interview {
        id: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Store a token (and optionally the API URL) in the config file
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Show the currently authenticated user
    Whoami,
}

/// Resolve configuration and dispatch the selected command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.api_url.as_deref(), cli.token.as_deref())?;
    let api = Arc::new(ApiClient::new(config.api_url.clone()));
    let ctx = Context { config, api };

    match cli.command {
        Commands::Upload { files } => commands::upload(&ctx, files).await,
        Commands::Interviews { command } => commands::interviews(&ctx, command).await,
        Commands::Themes { command } => commands::themes(&ctx, command).await,
        Commands::Insights { command } => commands::insights(&ctx, command).await,
        Commands::Ask { question } => commands::ask(&ctx, question).await,
        Commands::Conversations { command } => commands::conversations(&ctx, command).await,
        Commands::Export { command } => commands::export(&ctx, command).await,
        Commands::Usage => commands::usage(&ctx).await,
        Commands::Limits => commands::limits(&ctx).await,
        Commands::Demo => commands::demo(&ctx).await,
        Commands::Auth { command } => commands::auth(&ctx, command).await,
    }
}
