//! Text rendering helpers for command output

use chrono::{DateTime, Months, Utc};
use voxstats_core::domain::progression::experience_required;

const PROGRESS_SYMBOL: char = '■';
const PROGRESS_EMPTY: char = '□';
const PROGRESS_WIDTH: usize = 10;

/// Format an integer with comma thousands separators
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `DD/MM/YYYY (N units ago)`, using the largest whole calendar unit
pub fn started_on(started: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{} ({})", started.format("%d/%m/%Y"), time_ago(started, now))
}

fn time_ago(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if now <= past {
        return plural(0, "sec");
    }

    let mut months = 0u32;
    while past
        .checked_add_months(Months::new(months + 1))
        .is_some_and(|t| t <= now)
    {
        months += 1;
    }
    if months >= 12 {
        return plural(i64::from(months / 12), "year");
    }
    if months > 0 {
        return plural(i64::from(months), "month");
    }

    let rest = now - past;
    if rest.num_days() >= 7 {
        plural(rest.num_days() / 7, "week")
    } else if rest.num_days() > 0 {
        plural(rest.num_days(), "day")
    } else if rest.num_hours() > 0 {
        plural(rest.num_hours(), "hr")
    } else if rest.num_minutes() > 0 {
        plural(rest.num_minutes(), "min")
    } else {
        plural(rest.num_seconds(), "sec")
    }
}

fn plural(count: i64, unit: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, suffix)
}

/// `[4✫] [■■□□□□□□□□] [5✫]` for progress through the current level
pub fn level_progress_bar(level: u32, partial_experience: u32) -> String {
    let needed = experience_required(level);
    let filled = if partial_experience == 0 || needed == 0 {
        0
    } else {
        let ratio = f64::from(partial_experience) / f64::from(needed);
        ((PROGRESS_WIDTH as f64 * ratio) as usize).clamp(1, PROGRESS_WIDTH)
    };

    let bar: String = std::iter::repeat_n(PROGRESS_SYMBOL, filled)
        .chain(std::iter::repeat_n(PROGRESS_EMPTY, PROGRESS_WIDTH - filled))
        .collect();
    format!("[{}✫] [{}] [{}✫]", level, bar, level.saturating_add(1))
}

/// Signed delta with a leading `+` for gains
pub fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", thousands(value))
    } else {
        thousands(value)
    }
}
