//! Command handlers

use anyhow::{bail, Context as _};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::realtime::RealtimeChannel;
use crate::session::Session;
use crate::store::{AskStore, InterviewsStore, ThemesStore};
use crate::upload::UploadOrchestrator;
use voxiq_common::api::{ChatMessage, InsightCreate, InsightUpdate, ThemeResponse};
use voxiq_common::config::{config_file_path, ClientConfig};
use voxiq_common::upload::{all_terminal, UploadStatus};
use voxiq_common::Error;

use super::{
    AuthCommand, ConversationsCommand, ExportCommand, InsightsCommand, InterviewsCommand,
    ThemesCommand,
};

/// Resolved configuration plus the shared API client
pub struct Context {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
}

/// Establish a session from the configured token
async fn require_session(ctx: &Context) -> anyhow::Result<Session> {
    let token = ctx
        .config
        .token
        .clone()
        .context("no token configured; run `voxiq auth login --token <token>`")?;
    Ok(Session::establish(ctx.api.as_ref(), token).await?)
}

// === Upload ===

pub async fn upload(ctx: &Context, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    let orchestrator = UploadOrchestrator::new(ctx.api.clone(), &session);

    // Live status while the batch is in flight
    let channel = RealtimeChannel::open(&ctx.config.ws_url(), session.token());
    let reconciler = orchestrator.attach(channel.subscribe());

    let ids = orchestrator.submit(&files);
    if ids.is_empty() {
        println!("No supported files to upload.");
        channel.close().await;
        return Ok(());
    }
    println!("Uploading {} file(s)...", ids.len());

    let mut rx = orchestrator.subscribe();
    let mut printed: HashMap<Uuid, (UploadStatus, u8)> = HashMap::new();
    loop {
        {
            let snapshot = rx.borrow_and_update().clone();
            render_transitions(&snapshot, &mut printed);
            if !snapshot.is_empty() && all_terminal(&snapshot) {
                break;
            }
            if snapshot.is_empty() {
                // Batch was discarded by a confirmed close
                break;
            }
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                match orchestrator.close(false) {
                    Ok(()) => break,
                    Err(Error::UploadsInProgress(active)) => {
                        eprintln!("{} file(s) are still processing. Close anyway? [y/N]", active);
                        if read_confirmation().await {
                            let _ = orchestrator.close(true);
                            break;
                        }
                    }
                    Err(e) => bail!(e),
                }
            }
        }
    }

    let snapshot = orchestrator.snapshot();
    let done = snapshot
        .iter()
        .filter(|i| i.status == UploadStatus::Done)
        .count();
    let failed = snapshot
        .iter()
        .filter(|i| i.status == UploadStatus::Error)
        .count();
    println!("{} processed, {} failed.", done, failed);

    reconciler.abort();
    channel.close().await;
    Ok(())
}

fn render_transitions(
    snapshot: &[voxiq_common::upload::UploadItem],
    printed: &mut HashMap<Uuid, (UploadStatus, u8)>,
) {
    for item in snapshot {
        let current = (item.status, item.progress);
        if printed.get(&item.id) != Some(&current) {
            println!(
                "  {:<40} {:>12} {:>4}%",
                item.file_name, item.status, item.progress
            );
            if let Some(error) = &item.error {
                println!("  {:<40} {}", "", error);
            }
            printed.insert(item.id, current);
        }
    }
}

async fn read_confirmation() -> bool {
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    if reader.read_line(&mut line).await.is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

// === Interviews ===

pub async fn interviews(ctx: &Context, command: InterviewsCommand) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    match command {
        InterviewsCommand::List { sort } => {
            let store = InterviewsStore::new(ctx.api.clone(), &session);
            store.set_sort(sort.parse()?).await;
            let state = store.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            if state.data.is_empty() {
                println!("No interviews yet. Upload one with `voxiq upload <file>`.");
                return Ok(());
            }
            for interview in state.data {
                println!(
                    "{:<12} {:<40} {:>10} {:>12}",
                    interview.id,
                    interview.filename,
                    interview.status,
                    interview.created_at.format("%Y-%m-%d")
                );
            }
        }
        InterviewsCommand::Show { id } => {
            let detail = ctx.api.get_interview(session.token(), &id).await?;
            println!("{} ({})", detail.interview.filename, detail.interview.status);
            println!(
                "  {} bytes, uploaded {}",
                detail.interview.file_size_bytes,
                detail.interview.created_at.format("%Y-%m-%d %H:%M")
            );
            if !detail.speakers.is_empty() {
                println!("Speakers:");
                for speaker in &detail.speakers {
                    println!(
                        "  {} {}",
                        speaker.speaker_label,
                        speaker.name.as_deref().unwrap_or("(unknown)")
                    );
                }
            }
            if !detail.insights.is_empty() {
                println!("Insights:");
                for insight in &detail.insights {
                    println!("  [{}] {} — \"{}\"", insight.category, insight.title, insight.quote);
                }
            }
            if let Some(transcript) = &detail.transcript {
                println!("\n{}", transcript);
            }
        }
        InterviewsCommand::Delete { id } => {
            ctx.api.delete_interview(session.token(), &id).await?;
            println!("Deleted {}.", id);
        }
    }
    Ok(())
}

// === Themes ===

pub async fn themes(ctx: &Context, command: ThemesCommand) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    match command {
        ThemesCommand::List { sort } => {
            let store = ThemesStore::new(ctx.api.clone(), &session);
            store.set_sort(sort.parse()?).await;
            let state = store.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            let active = store.active();
            let previous = store.previous();
            if active.is_empty() && previous.is_empty() {
                println!("No themes yet.");
                return Ok(());
            }
            if !active.is_empty() {
                println!("Active themes:");
                for theme in &active {
                    print_theme_row(theme);
                }
            }
            if !previous.is_empty() {
                println!("Previous themes:");
                for theme in &previous {
                    print_theme_row(theme);
                }
            }
        }
        ThemesCommand::Show { id } => {
            let detail = ctx.api.get_theme(session.token(), &id).await?;
            println!("{} ({} mentions)", detail.theme.name, detail.theme.mention_count);
            if let Some(description) = &detail.theme.description {
                println!("{}", description);
            }
            if !detail.sub_themes.is_empty() {
                println!("Sub-themes:");
                for sub in &detail.sub_themes {
                    println!("  {} {}", sub.id, sub.name);
                }
            }
            for insight in &detail.insights {
                println!("  [{}] {} — \"{}\"", insight.category, insight.title, insight.quote);
            }
        }
        ThemesCommand::Rename { id, name } => {
            let theme = ctx.api.rename_theme(session.token(), &id, &name).await?;
            println!("Renamed to {}.", theme.name);
        }
    }
    Ok(())
}

fn print_theme_row(theme: &ThemeResponse) {
    let marker = if theme.is_new { " new" } else { "" };
    println!(
        "  {:<12} {:<32} {:>4} mentions{}",
        theme.id, theme.name, theme.mention_count, marker
    );
}

// === Insights ===

pub async fn insights(ctx: &Context, command: InsightsCommand) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    match command {
        InsightsCommand::Add {
            interview_id,
            category,
            title,
            quote,
            theme_id,
        } => {
            let request = InsightCreate {
                interview_id,
                category,
                title,
                quote,
                quote_start_index: None,
                quote_end_index: None,
                theme_id,
            };
            let insight = ctx.api.create_insight(session.token(), &request).await?;
            println!("Added insight {}.", insight.id);
        }
        InsightsCommand::Update {
            id,
            category,
            title,
            theme_id,
        } => {
            let request = InsightUpdate {
                category,
                title,
                theme_id,
            };
            let insight = ctx.api.update_insight(session.token(), &id, &request).await?;
            println!("Updated insight {}.", insight.id);
        }
        // Dismiss and flag tolerate failure silently to keep the
        // front-end responsive; failures are only logged
        InsightsCommand::Dismiss { id } => {
            if let Err(e) = ctx.api.dismiss_insight(session.token(), &id).await {
                debug!(error = %e, "dismiss failed");
            }
            println!("Dismissed {}.", id);
        }
        InsightsCommand::Flag { id } => {
            if let Err(e) = ctx.api.flag_insight(session.token(), &id).await {
                debug!(error = %e, "flag failed");
            }
            println!("Flagged {}.", id);
        }
    }
    Ok(())
}

// === Ask ===

pub async fn ask(ctx: &Context, question: Option<String>) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    let store = AskStore::new(ctx.api.clone(), &session);

    if let Some(question) = question {
        match store.ask(&question).await {
            Some(message) => print_answer(&message),
            None => bail!(store.error().unwrap_or_else(|| "no answer".to_string())),
        }
        return Ok(());
    }

    // Interactive loop; `/new` starts a fresh conversation
    println!("Ask about your interviews. Empty line or `exit` quits, `/new` starts over.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        match line.as_str() {
            "" | "exit" | "quit" => break,
            "/new" => {
                store.new_chat();
                println!("Started a new conversation.");
            }
            question => match store.ask(question).await {
                Some(message) => print_answer(&message),
                None => {
                    eprintln!(
                        "{}",
                        store.error().unwrap_or_else(|| "Failed to get a response".to_string())
                    );
                }
            },
        }
    }
    Ok(())
}

fn print_answer(message: &ChatMessage) {
    println!("\n{}\n", message.content);
    for citation in &message.citations {
        println!("  — {}: \"{}\"", citation.filename, citation.quote);
    }
    if !message.suggested_followups.is_empty() {
        println!("Try asking:");
        for followup in &message.suggested_followups {
            println!("  {}", followup);
        }
    }
}

// === Conversations ===

pub async fn conversations(ctx: &Context, command: ConversationsCommand) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    match command {
        ConversationsCommand::List => {
            let conversations = ctx.api.list_conversations(session.token()).await?;
            if conversations.is_empty() {
                println!("No conversations yet.");
                return Ok(());
            }
            for conversation in conversations {
                println!(
                    "{:<12} {:<48} {}",
                    conversation.id,
                    conversation.title.as_deref().unwrap_or("(untitled)"),
                    conversation.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ConversationsCommand::Show { id } => {
            let detail = ctx.api.get_conversation(session.token(), &id).await?;
            println!(
                "{}\n",
                detail.title.as_deref().unwrap_or("(untitled conversation)")
            );
            for message in &detail.messages {
                let who = match message.role {
                    voxiq_common::api::ChatRole::User => "you",
                    voxiq_common::api::ChatRole::Assistant => "voxiq",
                };
                println!("[{}] {}", who, message.content);
            }
        }
    }
    Ok(())
}

// === Export ===

pub async fn export(ctx: &Context, command: ExportCommand) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    let (markdown, output) = match command {
        ExportCommand::Insights { output } => {
            (ctx.api.export_insights(session.token()).await?, output)
        }
        ExportCommand::Interview { id, output } => {
            (ctx.api.export_interview(session.token(), &id).await?, output)
        }
    };
    match output {
        Some(path) => {
            tokio::fs::write(&path, markdown).await?;
            println!("Wrote {}.", path.display());
        }
        None => println!("{}", markdown),
    }
    Ok(())
}

// === Billing ===

pub async fn usage(ctx: &Context) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    let usage = ctx.api.billing_usage(session.token()).await?;
    println!("Usage for {}:", usage.month.format("%B %Y"));
    println!("  interviews uploaded: {}", usage.interviews_uploaded);
    println!("  questions asked:     {}", usage.qa_queries_used);
    println!("  storage used:        {}", format_bytes(usage.storage_bytes_used));
    Ok(())
}

pub async fn limits(ctx: &Context) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    let limits = ctx.api.billing_limits(session.token()).await?;
    println!("Plan: {}", limits.plan);
    println!(
        "  interviews: {}/{} ({} left)",
        limits.usage.interviews_uploaded,
        limits.limits.interviews_per_month,
        limits.remaining.interviews
    );
    println!(
        "  questions:  {}/{} ({} left)",
        limits.usage.qa_queries_used,
        limits.limits.qa_queries_per_month,
        limits.remaining.qa_queries
    );
    println!(
        "  storage:    {}/{}",
        format_bytes(limits.usage.storage_bytes_used),
        format_bytes(limits.limits.storage_bytes)
    );
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

// === Demo ===

pub async fn demo(ctx: &Context) -> anyhow::Result<()> {
    let session = require_session(ctx).await?;
    ctx.api.load_sample_data(session.token()).await?;
    println!("Sample data loaded. Try `voxiq themes list`.");
    Ok(())
}

// === Auth ===

pub async fn auth(ctx: &Context, command: AuthCommand) -> anyhow::Result<()> {
    match command {
        AuthCommand::Login { token, api_url } => {
            // Verify before persisting anything
            let session = Session::establish(ctx.api.as_ref(), token.clone()).await?;
            let path = config_file_path().context("could not determine config directory")?;
            let mut config = voxiq_common::config::read_toml_config(&path)?;
            config.token = Some(token);
            if api_url.is_some() {
                config.api_url = api_url;
            }
            voxiq_common::config::write_toml_config(&config, &path)?;
            println!(
                "Logged in as {} ({}). Credentials stored in {}.",
                session.user().email,
                session.user().plan,
                path.display()
            );
        }
        AuthCommand::Whoami => {
            let session = require_session(ctx).await?;
            let user = session.user();
            println!("{} <{}>, {} plan", user.name, user.email, user.plan);
        }
    }
    Ok(())
}
