use crate::config::Config;
use crate::pipeline::MeetingService;
use crate::reconcile::{spawn_session, HttpSessionClient, SessionState, POLL_INTERVAL};
use crate::search::highlight;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub mod args;

pub use args::{Cli, CliCommand, DiagramCliArgs, MeetingsCliArgs, SearchCliArgs, WatchCliArgs};

/// Longest transcript excerpt printed per recording in listings.
const PREVIEW_CHARS: usize = 100;

fn load_service() -> Result<(Config, MeetingService)> {
    let config = Config::load()?;
    let service = MeetingService::from_config(&config)?;
    Ok((config, service))
}

pub async fn handle_meetings_command(args: MeetingsCliArgs) -> Result<()> {
    let (_, service) = load_service()?;
    let meetings = service.list_meetings(args.limit).await?;

    if meetings.is_empty() {
        println!("No meetings found.");
        return Ok(());
    }

    println!("Found {} meeting(s):\n", meetings.len());
    for entry in meetings {
        let meeting = entry.meeting;
        println!("ID: {}", meeting.id);
        println!("Title: {}", meeting.title.as_deref().unwrap_or("-"));
        println!("Status: {}", meeting.status);
        println!("Created: {}", meeting.created_at);
        for recording in entry.recordings {
            let preview = recording
                .transcript_text
                .as_deref()
                .map(preview)
                .unwrap_or_else(|| "(no transcript)".to_string());
            println!("  - {} [{}] {}", recording.id, recording.status, preview);
        }
        println!("---");
    }

    Ok(())
}

pub async fn handle_diagram_command(args: DiagramCliArgs) -> Result<()> {
    let (_, service) = load_service()?;
    let outcome = service.build_diagram(Some(&args.meeting_id), None).await?;
    println!("{}", outcome.mermaid);
    Ok(())
}

pub async fn handle_cleanup_command() -> Result<()> {
    let (_, service) = load_service()?;
    let report = service.cleanup(Utc::now()).await?;
    println!("Cutoff: {}", report.cutoff);
    println!("Removed recordings: {}", report.removed_recordings);
    println!("Removed storage objects: {}", report.removed_storage_objects);
    println!("Removed diagrams: {}", report.removed_diagrams);
    Ok(())
}

pub async fn handle_search_command(args: SearchCliArgs) -> Result<()> {
    let (_, service) = load_service()?;
    let results = service
        .search_transcripts(Some(&args.meeting_id), &args.term)
        .await?;

    if results.is_empty() {
        println!("No matches for \"{}\".", args.term);
        return Ok(());
    }

    for result in results {
        println!("Recording {} ({} match(es))", result.recording_id, result.matches.len());
        for found in result.matches {
            let marked: String = highlight(&found.excerpt, &args.term)
                .into_iter()
                .map(|segment| {
                    if segment.matched {
                        format!("[{}]", segment.text)
                    } else {
                        segment.text
                    }
                })
                .collect();
            println!("  @{}: {}", found.index, marked);
        }
    }

    Ok(())
}

/// Follow a meeting on a running server until Ctrl+C.
pub async fn handle_watch_command(args: WatchCliArgs) -> Result<()> {
    let server = match args.server {
        Some(server) => server,
        None => format!("http://{}", Config::load()?.bind_address()),
    };
    info!("Watching meeting {} on {}", args.meeting_id, server);

    let client = Arc::new(HttpSessionClient::new(server));
    let handle = spawn_session(client, Some(args.meeting_id), POLL_INTERVAL);
    let mut updates = handle.subscribe();
    let mut last_printed = SessionState::default();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_changes(&last_printed, &state);
                last_printed = state;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                break;
            }
        }
    }

    handle.stop().await?;
    Ok(())
}

fn print_changes(previous: &SessionState, current: &SessionState) {
    if current.transcript.value != previous.transcript.value {
        println!("== Transcript ==\n{}\n", current.transcript.value);
    }
    if current.summary.value != previous.summary.value {
        match &current.summary.value {
            Some(summary) => {
                println!("== Summary ==\n{}", summary.overview);
                for decision in &summary.decisions {
                    println!("  * {}", decision);
                }
                for item in &summary.action_items {
                    println!("  [ ] {} ({})", item.description, item.assignee);
                }
                println!();
            }
            None => println!("== Summary ==\n(none yet)\n"),
        }
    }
    if current.refresh_error != previous.refresh_error {
        if let Some(error) = &current.refresh_error {
            eprintln!("Refresh error: {}", error);
        }
    }
    if current.save_error != previous.save_error {
        if let Some(error) = &current.save_error {
            eprintln!("Save error: {}", error);
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}
