use colored::{ColoredString, Colorize};

use crate::renewal::UrgencyTier;

/// Days remaining as shown in listings, e.g. `12 days` or `expired 3 days ago`.
pub fn format_days(days: i64) -> String {
    match days {
        d if d < -1 => format!("expired {} days ago", -d),
        -1 => "expired 1 day ago".to_string(),
        1 => "1 day".to_string(),
        d => format!("{} days", d),
    }
}

/// Tier label coloured by severity.
pub fn format_tier(tier: UrgencyTier) -> ColoredString {
    let label = tier.to_string();
    match tier {
        UrgencyTier::Critical => label.red().bold(),
        UrgencyTier::High => label.red(),
        UrgencyTier::Medium => label.yellow(),
        UrgencyTier::Normal => label.green(),
    }
}

/// Truncate long text for fixed-width table columns.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Print a table row with columns
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    let mut row = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i < widths.len() {
            row.push_str(&format!("{:<width$}  ", col, width = widths[i]));
        }
    }
    println!("{}", row.trim_end());
}
