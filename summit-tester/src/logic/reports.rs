use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use summit_game::{HeightSource, MissionOutcome, PlayerStats, SlopePolicy};

use super::runner::MissionRecord;
use super::terrain::TrackSummary;

/// Everything a report renders.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub mode: &'static str,
    pub slope_policy: SlopePolicy,
    pub height_source: HeightSource,
    pub track: Option<TrackSummary>,
    pub missions: Vec<MissionRecord>,
    pub final_stats: Option<PlayerStats>,
}

impl RunSummary {
    #[must_use]
    pub fn summits(&self) -> usize {
        self.missions.iter().filter(|m| m.summited()).count()
    }

    #[must_use]
    pub fn timeouts(&self) -> usize {
        self.missions.iter().filter(|m| m.timed_out).count()
    }
}

fn outcome_label(record: &MissionRecord) -> String {
    match (record.outcome, &record.error) {
        (Some(outcome), _) if record.timed_out => format!("{outcome} (tick limit)"),
        (Some(outcome), _) => outcome.to_string(),
        (None, Some(_)) => "refused".to_string(),
        (None, None) => "not run".to_string(),
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    summary: &RunSummary,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Mission Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==========================".cyan())?;
    writeln!(writer, "Mode: {}", summary.mode)?;
    writeln!(
        writer,
        "Terrain: {} ({})",
        summary
            .track
            .as_ref()
            .map_or("flat", |track| track.label.as_str()),
        summary.slope_policy.as_str()
    )?;
    writeln!(writer, "Missions: {}", summary.missions.len())?;
    writeln!(writer, "Summits: {}", summary.summits().to_string().green())?;
    writeln!(writer, "Tick limit hit: {}", summary.timeouts().to_string().red())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for record in &summary.missions {
        let status = match record.outcome {
            Some(MissionOutcome::Summited) if !record.timed_out => "✅".green(),
            Some(_) if !record.timed_out => "⚠️ ".yellow(),
            _ => "❌".red(),
        };
        writeln!(
            writer,
            "{} {} (attempt {}): {}",
            status,
            record.level.bold(),
            record.attempt,
            outcome_label(record)
        )?;
        writeln!(
            writer,
            "   Height {:.1}/{:.1} in {} ticks, stamina left {:.2}",
            record.height_reached, record.target_height, record.ticks, record.stamina_left
        )?;
        writeln!(
            writer,
            "   Granted +{:.0} money, +{:.0} stamina; now money {:.0}, stamina cap {:.0}, level {}",
            record.money_granted,
            record.stamina_granted,
            record.money_after,
            record.max_stamina_after,
            record.max_level_after
        )?;
        if let Some(error) = &record.error {
            writeln!(writer, "   • {}", error.red())?;
        }
    }

    if let Some(stats) = &summary.final_stats {
        writeln!(writer)?;
        writeln!(writer, "{}", "🧗 Final Player".bright_yellow().bold())?;
        writeln!(writer, "{}", "===============".yellow())?;
        writeln!(writer, "Money: {:.0}", stats.money)?;
        writeln!(writer, "Stamina cap: {:.0}", stats.max_stamina)?;
        writeln!(writer, "Unlocked level: {}", stats.max_level)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(writer: &mut W, summary: &RunSummary) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summary)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    summary: &RunSummary,
) -> Result<()> {
    writeln!(writer, "# Summit Mission Results\n")?;
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Mode**: {}", summary.mode)?;
    writeln!(writer, "- **Generated**: {}", summary.generated_at)?;
    if let Some(track) = &summary.track {
        writeln!(
            writer,
            "- **Track**: {} ({} samples, {:.0} to {:.0} m over {:.0} m)",
            track.label,
            track.samples,
            track.min_elevation,
            track.max_elevation,
            track.total_distance
        )?;
    } else {
        writeln!(writer, "- **Track**: flat")?;
    }
    writeln!(writer, "- **Slope policy**: {}", summary.slope_policy.as_str())?;
    writeln!(writer, "- **Missions**: {}", summary.missions.len())?;
    writeln!(writer, "- **Summits**: {}", summary.summits())?;
    writeln!(writer, "- **Tick limit hit**: {}\n", summary.timeouts())?;

    writeln!(writer, "## Missions\n")?;
    writeln!(
        writer,
        "| Level | Attempt | Outcome | Ticks | Height | Money | Stamina cap | Level |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|")?;
    for record in &summary.missions {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {:.1}/{:.1} | {:.0} | {:.0} | {} |",
            record.level,
            record.attempt,
            outcome_label(record),
            record.ticks,
            record.height_reached,
            record.target_height,
            record.money_after,
            record.max_stamina_after,
            record.max_level_after
        )?;
    }
    Ok(())
}
