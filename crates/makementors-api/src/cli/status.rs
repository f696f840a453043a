//! Store counts and configuration summary.

use console::style;
use makementors_core::chat::repository::ChatRepository;

use crate::state::AppState;

/// `mentors status`
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let repo = state.chat_service.chat_repo();
    let sessions = repo.count_sessions().await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let messages = repo.count_messages().await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let templates = state
        .mentor_service
        .list_templates()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .len();

    if json {
        let summary = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "model": state.config.llm.model,
            "templates": templates,
            "sessions": sessions,
            "messages": messages,
            "billing_configured": state.billing.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("  {} MakeMentors status", style("◆").bold());
    println!();
    println!("  data dir   {}", style(state.data_dir.display()).dim());
    println!("  model      {}", state.config.llm.model);
    println!("  templates  {templates}");
    println!("  sessions   {sessions}");
    println!("  messages   {messages}");
    println!(
        "  billing    {}",
        if state.billing.is_some() {
            style("configured").green().to_string()
        } else {
            style("not configured").yellow().to_string()
        }
    );
    println!();
    Ok(())
}
