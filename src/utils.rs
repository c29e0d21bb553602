use chrono::Duration;

pub fn suffix(num: u32) -> &'static str {
    let s = num.to_string();
    if s.ends_with('1') && !s.ends_with("11") {
        "st"
    } else if s.ends_with('2') && !s.ends_with("12") {
        "nd"
    } else if s.ends_with('3') && !s.ends_with("13") {
        "rd"
    } else {
        "th"
    }
}

pub fn format_rank(rank: u32) -> String {
    format!("{}{}", rank, suffix(rank))
}

/// Render an elapsed time as `MM:SS`. Minutes are not capped at 59, so 90
/// minutes renders as `90:00`. Negative durations render as `00:00`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// The standings feed reports elapsed time in nanoseconds.
pub fn format_elapsed_nanos(nanos: i64) -> String {
    format_elapsed(Duration::nanoseconds(nanos))
}

/// Feed scores are expressed in hundredths of a point.
pub fn format_score(raw: i64) -> String {
    let raw = raw.max(0);
    match raw % 100 {
        0 => format!("{}", raw / 100),
        cents => format!("{}.{:02}", raw / 100, cents),
    }
}

pub fn format_rating(rating: u32, kyu_rank: Option<&str>, is_provisional: bool) -> String {
    let mut formatted = rating.to_string();
    if is_provisional {
        formatted.push_str(" (Provisional)");
    }
    if let Some(kyu) = kyu_rank {
        formatted.push_str(" ― ");
        formatted.push_str(kyu);
    }
    formatted
}
