//! Tracker management commands

use colored::Colorize;

use crate::api::constants::SCRIPT_PATH;
use crate::interfaces::cli::CliError;
use crate::services::TrackerService;

/// 嵌入页面用的 `<script>` 片段
pub fn embed_snippet(public_url: Option<&str>, tracker_id: &str) -> String {
    let base = public_url
        .map(|u| u.trim().trim_end_matches('/'))
        .filter(|u| !u.is_empty())
        .unwrap_or("https://<your-scrolldepth-host>");
    format!(
        r#"<script src="{}{}?id={}" async></script>"#,
        base, SCRIPT_PATH, tracker_id
    )
}

pub async fn create_tracker(service: &TrackerService, owner: &str) -> Result<(), CliError> {
    let tracker = service.create(owner).await?;
    let config = crate::config::get_config();

    println!(
        "{} Created tracker {} for {}",
        "✓".bold().green(),
        tracker.id.cyan(),
        tracker.owner.magenta()
    );
    println!();
    println!("{}", "Embed snippet:".bold());
    println!(
        "  {}",
        embed_snippet(config.tracking.public_url.as_deref(), &tracker.id).blue()
    );
    Ok(())
}

pub async fn list_trackers(service: &TrackerService, owner: &str) -> Result<(), CliError> {
    let trackers = service.list(owner).await?;

    if trackers.is_empty() {
        println!("{} No trackers found for {}", "ℹ".bold().blue(), owner.magenta());
        return Ok(());
    }

    println!("{}", format!("Trackers of {}:", owner).bold().green());
    println!();
    for tracker in &trackers {
        println!(
            "  {} {}",
            tracker.id.cyan(),
            format!("(created: {})", tracker.created_at.format("%Y-%m-%d %H:%M:%S UTC"))
                .dimmed()
                .yellow()
        );
    }
    println!();
    println!(
        "{} Total {} trackers",
        "ℹ".bold().blue(),
        trackers.len().to_string().green()
    );
    Ok(())
}

pub async fn delete_tracker(service: &TrackerService, owner: &str, id: &str) -> Result<(), CliError> {
    service.delete(owner, id).await?;
    println!(
        "{} Deleted tracker {} and its events",
        "✓".bold().green(),
        id.cyan()
    );
    Ok(())
}
