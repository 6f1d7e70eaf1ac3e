// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-interactive subcommands: drafts, history, export and config check.

use colored::Colorize;
use qadesk_config::QadeskConfig;
use qadesk_core::{ChatMessage, LocalDraft, QadeskError, ReportData};
use qadesk_export::ExportFormat;
use qadesk_storage::DraftStore;

/// `qadesk drafts list`.
pub fn list_drafts(store: &DraftStore) {
    if store.list().is_empty() {
        println!("{}", "no drafts".dimmed());
        return;
    }
    for draft in store.list() {
        println!("{}", draft_line(draft));
    }
}

/// `qadesk drafts remove <id>`.
pub async fn remove_draft(store: &mut DraftStore, id: &str) -> Result<(), QadeskError> {
    if store.remove(id).await? {
        println!("draft {id} removed");
        Ok(())
    } else {
        Err(QadeskError::DraftNotFound(id.to_string()))
    }
}

/// `qadesk history [--clear]`.
pub async fn history(store: &mut DraftStore, clear: bool) -> Result<(), QadeskError> {
    if clear {
        let count = store.history().len();
        store.clear_history().await?;
        println!("{count} messages removed");
        return Ok(());
    }
    if store.history().is_empty() {
        println!("{}", "history is empty".dimmed());
    }
    for message in store.history() {
        println!("{}", message_header(message).bold());
        println!("{}\n", message.content);
    }
    Ok(())
}

/// `qadesk export <format> [--message <id>]`.
pub fn export(
    store: &DraftStore,
    format: ExportFormat,
    message_id: Option<&str>,
) -> Result<(), QadeskError> {
    let message = pick_message(store.history(), message_id)?;
    println!("{}", qadesk_export::export(&message.content, format)?);
    Ok(())
}

/// `qadesk config check`.
pub fn config_check(config: &QadeskConfig) {
    let key_source = if config
        .generator
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty())
    {
        "config"
    } else {
        qadesk_gemini::API_KEY_ENV_VARS
            .iter()
            .copied()
            .find(|name| std::env::var(name).is_ok_and(|v| !v.trim().is_empty()))
            .unwrap_or("missing")
    };

    println!("{}", "configuration OK".green());
    println!("  model:        {}", config.generator.model);
    println!("  endpoint:     {}", config.generator.base_url);
    println!("  api key:      {key_source}");
    println!("  database:     {}", config.storage.database_path);
    println!(
        "  probe:        {}",
        if config.connectivity.probe_enabled {
            format!(
                "{}:{} every {}s",
                config.connectivity.probe_host,
                config.connectivity.probe_port,
                config.connectivity.probe_interval_secs
            )
        } else {
            "disabled".to_string()
        }
    );
    for (project, environments) in &config.catalog.environments {
        println!("  {project:<13} {} environments", environments.len());
    }
}

/// The message with `id`, or the latest exportable one.
pub fn pick_message<'a>(
    history: &'a [ChatMessage],
    id: Option<&str>,
) -> Result<&'a ChatMessage, QadeskError> {
    match id {
        Some(id) => history
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| QadeskError::MessageNotFound(id.to_string())),
        None => history
            .iter()
            .rev()
            .find(|m| qadesk_export::is_exportable(&m.content))
            .ok_or_else(|| QadeskError::MessageNotFound("latest report".to_string())),
    }
}

/// One-line summary of a draft.
pub fn draft_line(draft: &LocalDraft) -> String {
    let when = draft
        .created_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string());
    let summary = match &draft.data {
        ReportData::Bug(bug) => format!("v{} {}", bug.version, bug.environment),
        ReportData::Retest(retest) => format!("{} v{}", retest.bug_code, retest.version),
    };
    format!(
        "{}  {when}  {:<6} {:<6} {summary}",
        draft.id, draft.project, draft.action
    )
}

/// Header shown above a history entry.
pub fn message_header(message: &ChatMessage) -> String {
    let mut header = format!(
        "[{}] {} {}",
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.role,
        message.id
    );
    if let Some(meta) = &message.metadata {
        if let Some(kind) = meta.kind {
            header.push_str(&format!(" {kind}"));
        }
        if let Some(project) = meta.project {
            header.push_str(&format!(" {project}"));
        }
    }
    header
}
