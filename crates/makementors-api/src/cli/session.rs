//! Session listing CLI command.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};

use crate::state::AppState;

/// `mentors list sessions --user ...`
pub async fn list_sessions(state: &AppState, user: &str, json: bool) -> anyhow::Result<()> {
    let sessions = state
        .chat_service
        .list_sessions(user, Some(50), None)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("  No sessions yet for {user}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["id", "mentor", "kind", "name", "updated"]);
    for session in &sessions {
        table.add_row(vec![
            session.id.to_string(),
            session.mentor_id.clone(),
            session.mentor_kind.to_string(),
            session.name.clone().unwrap_or_default(),
            session.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
