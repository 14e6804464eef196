use std::io::IsTerminal;

use owo_colors::OwoColorize;

use crate::scoring::{ScoreEnvelope, ScoreResult, SubScore, FIXED_FACTORS};

/// Width of the name column in breakdown tables
const NAME_WIDTH: usize = 26;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a number with at most two decimals, dropping trailing zeros
/// (12 -> "12", 2.5 -> "2.5", 1.333 -> "1.33")
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Truncate a name to fit the column, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn colorize_level(level: &str, use_colors: bool) -> String {
    if !use_colors {
        return level.to_string();
    }
    match level.to_ascii_lowercase().as_str() {
        "normal" | "minimal" | "none" => level.green().to_string(),
        "mild" => level.yellow().to_string(),
        "moderate" | "severe" => level.red().bold().to_string(),
        _ => level.bold().to_string(),
    }
}

/// Format sub-scores as a table: name, items, sum, mean and norm flag
pub fn format_breakdown_table(rows: &[SubScore], use_colors: bool) -> String {
    if rows.is_empty() {
        return "  (no dimensions)".to_string();
    }

    rows.iter()
        .map(|row| {
            let name = format!("{:<width$}", truncate_name(&row.name, NAME_WIDTH), width = NAME_WIDTH);
            let norm = match (row.norm_mean, row.above_norm) {
                (Some(norm), Some(true)) => {
                    let flag = format!("above norm {}", format_number(norm));
                    if use_colors {
                        format!("  {}", flag.red())
                    } else {
                        format!("  {}", flag)
                    }
                }
                (Some(norm), _) => format!("  norm {}", format_number(norm)),
                _ => String::new(),
            };
            format!(
                "  {} {:>3} items  sum {:>7}  mean {:>5}{}",
                name,
                row.item_count,
                format_number(row.sum),
                format_number(row.mean),
                norm
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a score result as a multi-line text report
pub fn format_result(result: &ScoreResult, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let title = format!("Scale: {}", result.scale_id);
    lines.push(if use_colors {
        title.bold().to_string()
    } else {
        title
    });
    lines.push(format!(
        "  Total: {}  Mean: {}  Final: {}  ({} items, method {})",
        format_number(result.total_score),
        format_number(result.mean_score),
        format_number(result.final_score),
        result.item_count,
        result.metadata.method
    ));

    if let Some(breadth) = result.symptom_breadth {
        lines.push(format!(
            "  Positive items: {}  Positive symptom mean: {}",
            breadth.positive_item_count,
            format_number(breadth.positive_symptom_mean)
        ));
    }

    if let Some(norm) = result.norm_comparison {
        lines.push(format!(
            "  Norm: mean {} sd {}  z = {}",
            format_number(norm.norm_mean),
            format_number(norm.norm_sd),
            format_number(norm.z_score)
        ));
    }

    lines.push(String::new());
    lines.push("Breakdown:".to_string());
    lines.push(format_breakdown_table(&result.breakdown, use_colors));

    lines.push(String::new());
    lines.push(format!(
        "Severity: {}",
        colorize_level(&result.severity.level, use_colors)
    ));
    if !result.severity.description.is_empty() {
        lines.push(format!("  {}", result.severity.description));
    }
    for item in &result.severity.guidance {
        lines.push(format!("  - {}", item));
    }

    lines.join("\n")
}

/// Format an envelope; failures render as a single error line
pub fn format_envelope(envelope: &ScoreEnvelope, use_colors: bool) -> String {
    match (&envelope.result, &envelope.error) {
        (Some(result), _) if envelope.success => format_result(result, use_colors),
        (_, Some(error)) => {
            if use_colors {
                format!("{} {}", "Scoring failed:".red().bold(), error)
            } else {
                format!("Scoring failed: {}", error)
            }
        }
        _ => "Scoring failed: no result".to_string(),
    }
}

/// Format the fixed 90-item factor table
pub fn format_factor_table(use_colors: bool) -> String {
    FIXED_FACTORS
        .iter()
        .enumerate()
        .map(|(idx, factor)| {
            let index_str = format!("{:>2}.", idx + 1);
            let range = format!("{:>2}-{:<2}", factor.first, factor.last);
            let name = format!("{:<width$}", factor.name, width = NAME_WIDTH);
            if use_colors {
                format!(
                    "{} {}  {}  norm {}",
                    index_str.dimmed(),
                    name.bold(),
                    range,
                    format_number(factor.norm_mean)
                )
            } else {
                format!(
                    "{} {}  {}  norm {}",
                    index_str,
                    name,
                    range,
                    format_number(factor.norm_mean)
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
