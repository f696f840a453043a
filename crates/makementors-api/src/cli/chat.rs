//! Interactive chat loop.
//!
//! Drives the same relay engine as the HTTP endpoint; the in-memory
//! [`Conversation`] acts as the client-side session manager (hydrate once,
//! adopt the lazily created session id, feed prior turns back as history).

use std::io::Write;

use console::style;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use makementors_core::chat::conversation::Conversation;
use makementors_core::relay::{RelayEvent, RelayRequest};
use makementors_types::chat::MessageRole;
use makementors_types::mentor::MentorRef;

use crate::state::AppState;

/// Resolve a display name for the banner; falls back to a generic label.
async fn mentor_display_name(state: &AppState, mentor: &MentorRef) -> String {
    match mentor {
        MentorRef::Template(id) => state
            .mentor_service
            .get_template(id)
            .await
            .map(|t| t.display_name)
            .unwrap_or_else(|_| "Mentor".to_string()),
        MentorRef::Custom(id) => state
            .mentor_service
            .get_mentor(id)
            .await
            .map(|m| m.name)
            .unwrap_or_else(|_| "Mentor".to_string()),
    }
}

/// `mentors chat <mentor> --user <id> [--session <uuid>]`
pub async fn run_chat_loop(
    state: &AppState,
    mentor_arg: &str,
    user: &str,
    session: Option<Uuid>,
) -> anyhow::Result<()> {
    let mentor = MentorRef::classify(mentor_arg);
    let mentor_name = mentor_display_name(state, &mentor).await;

    let mut convo = Conversation::new(mentor, Some(user.to_string()), session);
    if let Err(e) = convo.hydrate(&state.chat_service).await {
        eprintln!(
            "  {} could not load session history: {e}",
            style("!").yellow()
        );
    }

    println!();
    println!(
        "  {} Chatting with {} (Ctrl+D or \"exit\" to quit)",
        style("◆").bold(),
        style(&mentor_name).cyan()
    );
    for turn in convo.turns() {
        let who = match turn.role {
            MessageRole::User => style("you").dim().to_string(),
            _ => style(mentor_name.as_str()).cyan().to_string(),
        };
        println!("  {who}: {}", turn.content);
    }
    println!();

    loop {
        let line = match read_line().await {
            Some(line) => line,
            None => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let request = RelayRequest {
            mentor: convo.mentor().clone(),
            history: convo.history(),
            user_message: line.clone(),
            profile: None,
            user_id: Some(user.to_string()),
            session_id: convo.session_id(),
        };
        convo.push_user(&line);

        let cancel = CancellationToken::new();
        let mut stream = state.relay.clone().send(request, cancel);

        print!("  {}: ", style(mentor_name.as_str()).cyan());
        let mut printed = 0usize;
        while let Some(event) = stream.next().await {
            match event {
                RelayEvent::Session {
                    session_id: Some(sid),
                    ..
                } => convo.adopt_session(sid),
                RelayEvent::Session { .. } => {}
                RelayEvent::Chunk { text } => {
                    if text.len() >= printed {
                        // Cumulative text only ever grows by whole deltas,
                        // so `printed` always lands on a char boundary.
                        print!("{}", &text[printed..]);
                    } else {
                        print!("\n  {}: {text}", style(mentor_name.as_str()).cyan());
                    }
                    printed = text.len();
                    let _ = std::io::stdout().flush();
                    convo.on_chunk(&text);
                }
                RelayEvent::Warning { message } => {
                    eprintln!("\n  {} {message}", style("!").yellow());
                }
                RelayEvent::Done => {}
            }
        }
        println!();
        println!();
    }

    if let Some(session_id) = convo.session_id() {
        println!(
            "  {} session saved: {session_id}",
            style("✓").green()
        );
    }
    Ok(())
}

/// Prompt for one line of input without blocking the runtime. `None` on EOF.
async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("  you")
            .allow_empty(true)
            .interact_text()
            .ok()
    })
    .await
    .ok()
    .flatten()
}
