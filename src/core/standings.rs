use crate::{
    client::atcoder::AtCoder,
    core::roster::Roster,
    error::{TrackerError, TrackerResult},
    utils::format_elapsed_nanos,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::info;

/// Contest identifier as used in AtCoder URLs, e.g. `abc300`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContestId(String);

impl ContestId {
    /// Build an identifier from a contest type prefix (`abc`, `arc`, ...) and a
    /// contest number. The prefix is lowercased; both parts are validated so
    /// that an identifier never smuggles a path into the request URL.
    pub fn from_parts(contest_type: &str, contest_number: &str) -> TrackerResult<Self> {
        let prefix = contest_type.trim().to_lowercase();
        let number = contest_number.trim();

        let valid_prefix = !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric());
        let valid_number = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());

        match (valid_prefix, valid_number) {
            (true, true) => Ok(ContestId(format!("{prefix}{number}"))),
            _ => Err(TrackerError::InvalidContestId),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Split `abc300` into `("abc", "300")` at the trailing run of digits.
pub fn split_contest_id(id: &str) -> (&str, &str) {
    let id = id.trim();
    let prefix_len = id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    id.split_at(prefix_len)
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Response from the AtCoder standings JSON feed. Only the fields we use are
// declared, everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandingsFeed {
    pub standings_data: Vec<StandingsRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandingsRecord {
    pub rank: u32,
    pub user_screen_name: String,
    pub total_result: TotalResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TotalResult {
    /// Hundredths of a point.
    pub score: i64,
    /// Nanoseconds.
    pub elapsed: i64,
}

pub fn parse_standings_feed(feed: &str) -> TrackerResult<StandingsFeed> {
    Ok(serde_json::from_str::<StandingsFeed>(feed)?)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingEntry {
    pub user_id: String,
    pub rank: u32,
    pub raw_elapsed_nanos: i64,
    pub formatted_elapsed: String,
    pub score: i64,
}

impl From<&StandingsRecord> for StandingEntry {
    fn from(record: &StandingsRecord) -> Self {
        StandingEntry {
            user_id: record.user_screen_name.clone(),
            rank: record.rank,
            raw_elapsed_nanos: record.total_result.elapsed,
            formatted_elapsed: format_elapsed_nanos(record.total_result.elapsed),
            score: record.total_result.score,
        }
    }
}

/// Keep the roster members present in the feed, ordered by rank. Members
/// missing from the feed are logged and left out.
pub fn standings_for_roster(feed: &StandingsFeed, roster: &Roster) -> Vec<StandingEntry> {
    let records_by_user = feed
        .standings_data
        .iter()
        .map(|record| (record.user_screen_name.as_str(), record))
        .collect::<HashMap<&str, &StandingsRecord>>();

    roster
        .iter()
        .filter_map(|user_id| match records_by_user.get(user_id.as_str()) {
            Some(record) => Some(StandingEntry::from(*record)),
            None => {
                info!("{user_id}: not found in standings");
                None
            }
        })
        // stable, so equal ranks keep roster order
        .sorted_by_key(|entry| entry.rank)
        .collect()
}

pub struct StandingsClient {
    atcoder: Arc<AtCoder>,
    roster: Arc<Roster>,
}

impl StandingsClient {
    pub fn new(atcoder: Arc<AtCoder>, roster: Arc<Roster>) -> Self {
        Self { atcoder, roster }
    }

    pub async fn fetch_standings(
        &self,
        contest_id: &ContestId,
        session_cookie: &str,
    ) -> TrackerResult<Vec<StandingEntry>> {
        info!("Fetching standings for contest {contest_id}");
        let feed = self.atcoder.standings(contest_id, session_cookie).await?;
        let standings = standings_for_roster(&feed, &self.roster);
        info!(
            "{} of {} roster members found in standings of {contest_id}",
            standings.len(),
            self.roster.len()
        );
        Ok(standings)
    }
}
