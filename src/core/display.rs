use crate::{
    core::{contests::ContestRow, profile::RatingSnapshot, standings::StandingEntry},
    utils::{format_rank, format_rating, format_score},
};
use itertools::Itertools;

// Display contest standings of the roster members
pub fn standings(entries: &[StandingEntry]) -> String {
    // width of the longest ordinal rank, plus one for ')'
    let width_rank = 1 + entries
        .iter()
        .map(|e| format_rank(e.rank).len())
        .max()
        .unwrap_or_default();

    let width_name = entries
        .iter()
        .map(|e| e.user_id.len())
        .max()
        .unwrap_or_default();

    let width_score = entries
        .iter()
        .map(|e| format_score(e.score).len())
        .max()
        .unwrap_or_default();

    entries
        .iter()
        .map(|entry| {
            format!(
                "{:>width_rank$} {:<width_name$}  {:>width_score$} pts  {}",
                format!("{})", format_rank(entry.rank)),
                entry.user_id,
                format_score(entry.score),
                entry.formatted_elapsed,
            )
        })
        .join("\n")
}

// Display roster ratings, already sorted by decreasing rating
pub fn ratings(snapshots: &[RatingSnapshot]) -> String {
    let width_pos = snapshots.len().to_string().len();

    let width_name = snapshots
        .iter()
        .map(|s| s.user_id.len())
        .max()
        .unwrap_or_default();

    let formatted_ratings = snapshots
        .iter()
        .map(|s| format_rating(s.numeric_rating, s.kyu_rank.as_deref(), s.is_provisional))
        .collect::<Vec<String>>();
    let width_rating = formatted_ratings
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or_default();

    let width_rank = snapshots
        .iter()
        .map(|s| s.competitive_rank.len())
        .max()
        .unwrap_or_default();

    snapshots
        .iter()
        .zip(formatted_ratings)
        .enumerate()
        .map(|(idx, (snapshot, rating))| {
            format!(
                "{:>width_pos$}) {:<width_name$}  {:<width_rating$}  {:>width_rank$}  {}",
                // idx is zero-based
                idx + 1,
                snapshot.user_id,
                rating,
                snapshot.competitive_rank,
                snapshot.affiliation,
            )
            .trim_end()
            .to_string()
        })
        .join("\n")
}

pub fn contests(rows: &[ContestRow]) -> String {
    let width_time = rows.iter().map(|r| r.time.len()).max().unwrap_or_default();

    rows.iter()
        .map(|row| format!("{:<width_time$}  {} <{}>", row.time, row.title, row.link))
        .join("\n")
}
