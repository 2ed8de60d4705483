//! Stats command
//!
//! `--watch` 按 `dashboard.refresh_interval_secs` 重新查询；
//! 刷新失败时打印提示，上一次的输出保留在屏幕上。

use std::fmt::Write as _;
use std::time::Duration;

use colored::Colorize;

use crate::analytics::DashboardSummary;
use crate::interfaces::cli::CliError;
use crate::services::DashboardService;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// 渲染摘要为终端文本
pub fn render_summary(tracker_id: &str, summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let m = &summary.milestones;
    let o = &summary.overall;

    let _ = writeln!(out, "{} {}", "Tracker".bold(), tracker_id.cyan());
    let _ = writeln!(out, "  events: {}", summary.total_events);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Milestones".bold().green());
    for (label, value) in [("25%", m.p25), ("50%", m.p50), ("75%", m.p75), ("100%", m.p100)] {
        let _ = writeln!(out, "  {:>5}  {:>3}%", label, value);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Engagement".bold().green());
    let _ = writeln!(out, "  sessions:         {}", o.sessions);
    let _ = writeln!(out, "  avg time on page: {:.1}s", o.avg_time_on_page);
    let _ = writeln!(out, "  completion rate:  {}%", o.completion_rate);
    let _ = writeln!(out, "  active rate:      {}%", o.active_rate);
    let _ = writeln!(out, "  avg scroll speed: {:.1}ms", o.avg_scroll_speed);

    if !summary.devices.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Devices".bold().green());
        for d in &summary.devices {
            let _ = writeln!(
                out,
                "  {:<8} sessions {:>4}  completion {:>3}%  avg {:.1}s",
                d.device.as_ref(),
                d.engagement.sessions,
                d.engagement.completion_rate,
                d.engagement.avg_time_on_page
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {}",
        "Active visitors:".bold().green(),
        summary.visitors.len()
    );
    for c in &summary.countries {
        let _ = writeln!(out, "  {}  {}", c.country, c.visitors);
    }
    out
}

async fn print_once(
    dashboard: &DashboardService,
    owner: &str,
    tracker_id: &str,
    json: bool,
    clear: bool,
) -> Result<(), CliError> {
    let summary = dashboard.summary(owner, tracker_id).await?;
    let output = if json {
        serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::CommandError(format!("Failed to encode summary: {}", e)))?
    } else {
        render_summary(tracker_id, &summary)
    };

    if clear {
        print!("{}", CLEAR_SCREEN);
    }
    println!("{}", output);
    Ok(())
}

pub async fn show_stats(
    dashboard: &DashboardService,
    owner: &str,
    tracker_id: &str,
    watch: bool,
    json: bool,
) -> Result<(), CliError> {
    if !watch {
        return print_once(dashboard, owner, tracker_id, json, false).await;
    }

    let config = crate::config::get_config();
    let period = Duration::from_secs(config.dashboard.refresh_interval_secs.max(1));
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = print_once(dashboard, owner, tracker_id, json, true).await {
                    eprintln!(
                        "{} {} {}",
                        "Refresh failed:".yellow().bold(),
                        e.format_simple(),
                        "(showing previous output)".dimmed()
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}
