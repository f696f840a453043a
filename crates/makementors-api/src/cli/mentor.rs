//! Mentor and template CLI commands.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use console::style;

use makementors_types::mentor::CreateMentorRequest;

use crate::state::AppState;

/// `mentors create mentor <name> --description ... --user ...`
pub async fn create_mentor(
    state: &AppState,
    name: String,
    description: String,
    user: String,
    color: Option<String>,
    icon: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mentor = state
        .mentor_service
        .create_mentor(CreateMentorRequest {
            user_id: user,
            name,
            description,
            color,
            icon,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&mentor)?);
    } else {
        println!();
        println!(
            "  {} Created mentor {} ({})",
            style("✓").green(),
            style(&mentor.name).cyan(),
            mentor.id
        );
        println!("  {}", style(&mentor.system_prompt).dim());
        println!();
    }
    Ok(())
}

/// `mentors list mentors --user ...`
pub async fn list_mentors(state: &AppState, user: &str, json: bool) -> anyhow::Result<()> {
    let mentors = state.mentor_service.list_mentors(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&mentors)?);
        return Ok(());
    }

    if mentors.is_empty() {
        println!("  No mentors yet. Create one with: mentors create mentor <name> --description ... --user {user}");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["id", "name", "description", "created"]);
    for mentor in &mentors {
        table.add_row(vec![
            mentor.id.to_string(),
            mentor.name.clone(),
            mentor.description.clone(),
            mentor.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// `mentors list templates`
pub async fn list_templates(state: &AppState, json: bool) -> anyhow::Result<()> {
    let templates = state
        .mentor_service
        .list_templates()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("  Template catalog is empty. Run: mentors seed");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["template id", "name", "category", "description"]);
    for template in &templates {
        table.add_row(vec![
            template.template_id.clone(),
            template.display_name.clone(),
            template.category.clone(),
            template.description.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}
