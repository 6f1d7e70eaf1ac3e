// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `qadesk shell` command implementation.
//!
//! A readline loop that walks the tester through project, action and form
//! entry, shows a spinner while the report is generated, and prints the
//! result. Slash commands work at every step.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use qadesk_config::QadeskConfig;
use qadesk_core::{FlowStep, Project, QadeskError};
use qadesk_export::ExportFormat;
use qadesk_flow::{ConnectivityMonitor, Field, FlowController, FormState, MenuChoice, SubmitOutcome};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::app::{self, RunOptions};
use crate::commands;

const HELP: &str = "\
Commands:
  /submit              send the form (saved as a draft when offline)
  /set <field> <value> change one field, e.g. /set version 2.4.1
  /edit                answer the form questions again
  /cancel              leave the form and go back to the action menu
  /revise              reopen the last submitted form
  /export <format>     print the last report as plain, emphasized or structured
  /drafts              list offline drafts
  /resume <id>         open a draft for editing (removes it from the list)
  /history             show generated reports
  /online, /offline    force the connection state (stops the probe)
  /status              show the current step and connection
  /quit                leave the shell";

/// A parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    Help,
    Status,
    Online,
    Offline,
    Drafts,
    History,
    Resume(String),
    Submit,
    Cancel,
    Edit,
    Revise,
    Set { field: String, value: String },
    Export(ExportFormat),
    /// Anything that is not a slash command.
    Input(String),
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return ShellCommand::Input(trimmed.to_string());
        };
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        match name.to_lowercase().as_str() {
            "quit" | "q" => ShellCommand::Quit,
            "help" | "h" | "?" => ShellCommand::Help,
            "status" => ShellCommand::Status,
            "online" => ShellCommand::Online,
            "offline" => ShellCommand::Offline,
            "drafts" => ShellCommand::Drafts,
            "history" => ShellCommand::History,
            "submit" | "send" | "enviar" => ShellCommand::Submit,
            "cancel" => ShellCommand::Cancel,
            "edit" => ShellCommand::Edit,
            "revise" | "retry" => ShellCommand::Revise,
            "resume" if !args.is_empty() => ShellCommand::Resume(args.to_string()),
            "set" => match args.split_once(char::is_whitespace) {
                Some((field, value)) => ShellCommand::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                None => ShellCommand::Unknown(trimmed.to_string()),
            },
            "export" => match args.parse::<ExportFormat>() {
                Ok(format) => ShellCommand::Export(format),
                Err(_) if args.is_empty() => ShellCommand::Export(ExportFormat::Plain),
                Err(_) => ShellCommand::Unknown(trimmed.to_string()),
            },
            _ => ShellCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Runs the interactive shell until `/quit`, Ctrl+C or Ctrl+D.
pub async fn run_shell(config: QadeskConfig, options: RunOptions) -> Result<(), QadeskError> {
    let connectivity = ConnectivityMonitor::new(!options.offline);
    let mut flow = app::build_flow(&config, options, connectivity.clone())
        .await
        .inspect_err(|e| {
            if matches!(e, QadeskError::Config(_)) {
                eprintln!(
                    "error: Gemini API key required. Set generator.api_key in qadesk.toml or the GEMINI_API_KEY env var"
                );
            }
        })?;

    let mut probe = (!options.offline).then(CancellationToken::new);
    if let Some(token) = &probe
        && connectivity
            .spawn_probe(&config.connectivity, token.clone())
            .is_none()
    {
        probe = None;
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| QadeskError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "qadesk".bold().green());
    println!(
        "Type {} for commands, {} to leave.",
        "/help".yellow(),
        "/quit".yellow()
    );
    if !flow.drafts().list().is_empty() {
        println!(
            "{}",
            format!(
                "{} offline drafts pending, see /drafts",
                flow.drafts().list().len()
            )
            .yellow()
        );
    }
    print_menu(&flow);

    loop {
        let line = match rl.readline(&prompt(&flow)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        let command = ShellCommand::parse(&line);
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = handle(&mut flow, &mut rl, &mut probe, command).await {
            eprintln!("{}: {e}", "error".red());
        }
    }

    if let Some(token) = probe {
        token.cancel();
    }
    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn handle(
    flow: &mut FlowController,
    rl: &mut DefaultEditor,
    probe: &mut Option<CancellationToken>,
    command: ShellCommand,
) -> Result<(), QadeskError> {
    match command {
        ShellCommand::Quit => {}
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Status => println!(
            "step {} | project {} | {}",
            flow.step(),
            flow.project()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".into()),
            connection_label(flow.connectivity().is_online())
        ),
        ShellCommand::Online | ShellCommand::Offline => {
            if let Some(token) = probe.take() {
                token.cancel();
                debug!("probe stopped by manual toggle");
            }
            let online = command == ShellCommand::Online;
            flow.connectivity().set_online(online);
            println!("{}", connection_label(online));
        }
        ShellCommand::Drafts => commands::list_drafts(flow.drafts()),
        ShellCommand::History => {
            for message in flow.history() {
                println!("{}", commands::message_header(message).bold());
                println!("{}\n", message.content);
            }
        }
        ShellCommand::Resume(id) => {
            flow.resume_draft(&id).await?;
            println!("draft {id} loaded");
            println!("{}", render_form(flow.form_mut()?));
        }
        ShellCommand::Submit => submit(flow).await?,
        ShellCommand::Cancel => {
            flow.cancel()?;
            print_menu(flow);
        }
        ShellCommand::Edit => {
            guided_entry(flow.form_mut()?, rl);
            println!("{}", render_form(flow.form_mut()?));
        }
        ShellCommand::Revise => {
            flow.revise()?;
            println!("{}", render_form(flow.form_mut()?));
        }
        ShellCommand::Set { field, value } => {
            let form = flow.form_mut()?;
            form.set_field(&field, &value)?;
            println!("{}", render_form(form));
        }
        ShellCommand::Export(format) => {
            let message = commands::pick_message(flow.history(), None)?;
            println!("{}", qadesk_export::export(&message.content, format)?);
        }
        ShellCommand::Unknown(text) => {
            println!("unknown command {text}, try /help");
        }
        ShellCommand::Input(text) => handle_input(flow, rl, &text).await?,
    }
    Ok(())
}

async fn handle_input(
    flow: &mut FlowController,
    rl: &mut DefaultEditor,
    text: &str,
) -> Result<(), QadeskError> {
    match flow.step() {
        FlowStep::SelectProject => {
            let Some(project) = parse_project(text) else {
                println!("pick a project by number or name");
                return Ok(());
            };
            flow.select_project(project)?;
            print_menu(flow);
        }
        FlowStep::SelectAction | FlowStep::Result => {
            let Some(choice) = parse_choice(text) else {
                println!("pick 1, 2 or 3");
                return Ok(());
            };
            flow.choose(choice).await?;
            if flow.step() == FlowStep::GatheringData {
                guided_entry(flow.form_mut()?, rl);
                println!("{}", render_form(flow.form_mut()?));
                println!("Type {} to send.", "/submit".yellow());
            } else {
                print_menu(flow);
            }
        }
        FlowStep::GatheringData => {
            println!("use /set <field> <value>, /edit or /submit");
        }
        FlowStep::Processing => {}
    }
    Ok(())
}

async fn submit(flow: &mut FlowController) -> Result<(), QadeskError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("generando reporte...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = flow.submit().await;
    spinner.finish_and_clear();

    match outcome? {
        SubmitOutcome::Invalid(missing) => {
            println!(
                "{}",
                "Completa todos los campos obligatorios.".red().bold()
            );
            if let Some(form) = flow.form() {
                println!("{}", render_form(form));
            }
            debug!(missing = missing.len(), "form incomplete");
        }
        SubmitOutcome::SavedOffline(draft) => {
            println!(
                "{}",
                format!("Sin conexión: guardado como borrador {}", draft.id).yellow()
            );
            print_menu(flow);
        }
        SubmitOutcome::Generated(message) => {
            println!("\n{}\n", message.content);
            if qadesk_export::is_exportable(&message.content) {
                println!("{}", "/export plain|emphasized|structured".dimmed());
            }
            print_menu(flow);
        }
        SubmitOutcome::Failed { message, error } => {
            warn!(error = %error, "generation failed");
            println!("\n{}\n", message.content.red());
            println!("{}", "/revise to edit and resend".dimmed());
            print_menu(flow);
        }
    }
    Ok(())
}

/// Asks every question of the form; an empty answer keeps the current value.
fn guided_entry(form: &mut FormState, rl: &mut DefaultEditor) {
    let action = form.action();
    for &field in form.fields() {
        if field.is_derived() {
            continue;
        }
        let options = selection_options(form, field);
        loop {
            println!("{}", field.question(action).cyan());
            for (i, option) in options.iter().enumerate() {
                println!("  {:>2}. {option}", i + 1);
            }
            let current = form.value(field).unwrap_or_default();
            let prompt = if current.is_empty() {
                "> ".to_string()
            } else {
                format!("[{current}] > ")
            };
            let answer = match rl.readline(&prompt) {
                Ok(answer) => answer.trim().to_string(),
                Err(_) => return,
            };
            if answer == "/done" {
                return;
            }
            if answer.is_empty() {
                break;
            }
            let value = pick_option(&options, &answer).unwrap_or(answer);
            match form.set(field, &value) {
                Ok(()) => break,
                Err(e) => println!("{}", e.to_string().red()),
            }
        }
        if field == Field::Environment
            && let Some(db) = form.value(Field::Database)
        {
            println!("{} {}", "Base de Datos:".dimmed(), db.dimmed());
        }
    }
}

fn selection_options(form: &FormState, field: Field) -> Vec<String> {
    match field {
        Field::Browser => form.catalog().browsers().to_vec(),
        Field::Environment => form.catalog().environments(form.project()).to_vec(),
        Field::Solved => vec!["Sí".to_string(), "No".to_string()],
        _ => Vec::new(),
    }
}

/// Resolves a 1-based menu number to its option.
fn pick_option(options: &[String], answer: &str) -> Option<String> {
    let index: usize = answer.parse().ok()?;
    options.get(index.checked_sub(1)?).cloned()
}

fn parse_project(text: &str) -> Option<Project> {
    if let Ok(n) = text.parse::<usize>() {
        return Project::iter().nth(n.checked_sub(1)?);
    }
    text.parse().ok()
}

fn parse_choice(text: &str) -> Option<MenuChoice> {
    match text {
        "1" => Some(MenuChoice::Report),
        "2" => Some(MenuChoice::Retest),
        "3" => Some(MenuChoice::Exit),
        other => other.parse().ok(),
    }
}

/// Field list with missing values flagged after a failed validation.
pub fn render_form(form: &FormState) -> String {
    let mut out = format!("{} · {}\n", form.project(), form.action());
    for &field in form.fields() {
        let value = form.value(field).unwrap_or_default();
        let label = format!("{}:", field.label());
        let line = if form.is_highlighted(field) {
            format!("  {} {}", label.red().bold(), "(obligatorio)".red())
        } else if field.is_derived() {
            format!("  {} {}", label.dimmed(), value.dimmed())
        } else {
            format!("  {} {value}", label.bold())
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn print_menu(flow: &FlowController) {
    match flow.step() {
        FlowStep::SelectProject => {
            println!("\n{}", "Selecciona el proyecto:".bold());
            for (i, project) in Project::iter().enumerate() {
                println!("  {}. {project}", i + 1);
            }
        }
        FlowStep::SelectAction | FlowStep::Result => {
            println!("\n{}", "¿Qué deseas hacer?".bold());
            println!("  1. Reportar bug");
            println!("  2. Retest");
            println!("  3. Salir");
        }
        _ => {}
    }
}

fn prompt(flow: &FlowController) -> String {
    let dot = if flow.connectivity().is_online() {
        "●".green()
    } else {
        "●".red()
    };
    let step = match flow.project() {
        Some(project) => format!("{project}"),
        None => "qadesk".to_string(),
    };
    format!("{dot} {}> ", step.green())
}

fn connection_label(online: bool) -> String {
    if online {
        "online".green().to_string()
    } else {
        "offline".red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use qadesk_core::{Action, Catalog};

    #[test]
    fn parses_slash_commands() {
        assert_eq!(ShellCommand::parse("/quit"), ShellCommand::Quit);
        assert_eq!(ShellCommand::parse("  /SUBMIT "), ShellCommand::Submit);
        assert_eq!(
            ShellCommand::parse("/set expectedResult Se guarda el cambio"),
            ShellCommand::Set {
                field: "expectedResult".into(),
                value: "Se guarda el cambio".into()
            }
        );
        assert_eq!(
            ShellCommand::parse("/resume 1700000000000"),
            ShellCommand::Resume("1700000000000".into())
        );
        assert_eq!(
            ShellCommand::parse("/export json"),
            ShellCommand::Export(ExportFormat::Structured)
        );
        assert_eq!(
            ShellCommand::parse("/export"),
            ShellCommand::Export(ExportFormat::Plain)
        );
    }

    #[test]
    fn malformed_commands_are_unknown() {
        assert!(matches!(ShellCommand::parse("/set version"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/resume"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/export pdf"), ShellCommand::Unknown(_)));
        assert!(matches!(ShellCommand::parse("/fly"), ShellCommand::Unknown(_)));
    }

    #[test]
    fn plain_text_is_input() {
        assert_eq!(ShellCommand::parse(" 2 "), ShellCommand::Input("2".into()));
    }

    #[test]
    fn menu_numbers_resolve() {
        assert_eq!(parse_project("1"), Some(Project::Getnet));
        assert_eq!(parse_project("bpagos"), Some(Project::Bpagos));
        assert_eq!(parse_project("0"), None);
        assert_eq!(parse_project("9"), None);
        assert_eq!(parse_choice("3"), Some(MenuChoice::Exit));
        assert_eq!(parse_choice("retest"), Some(MenuChoice::Retest));

        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(pick_option(&options, "2").as_deref(), Some("b"));
        assert_eq!(pick_option(&options, "0"), None);
        assert_eq!(pick_option(&options, "b"), None);
    }

    #[test]
    fn render_marks_missing_fields() {
        colored::control::set_override(false);
        let mut form = FormState::new(Arc::new(Catalog::builtin()), Project::Getnet, Action::Report);
        form.set_field("version", "1.2").unwrap();
        form.validate();
        let out = render_form(&form);
        assert!(out.starts_with("GETNET · report\n"));
        assert!(out.contains("  Versión: 1.2\n"));
        assert!(out.contains("  Navegador: (obligatorio)\n"));
    }
}
