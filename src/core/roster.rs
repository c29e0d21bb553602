use crate::{
    core::profile::{ProfileSource, RatingSnapshot},
    error::{TrackerError, TrackerResult},
};
use itertools::Itertools;
use std::cmp::Reverse;
use std::ops::Deref;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

/// Tracked user identifiers, in configuration order. Duplicates collapse to
/// their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster(Vec<String>);

impl Roster {
    pub fn new<I, S>(user_ids: I) -> Roster
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roster(user_ids.into_iter().map(Into::into).unique().collect())
    }
}

impl Deref for Roster {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Fetch every roster profile one after the other, waiting `request_interval`
/// between two requests, and sort the snapshots by decreasing rating.
///
/// A user whose profile cannot be fetched is logged and left out. The cycle
/// only fails when not a single profile could be fetched.
pub async fn build_roster_snapshot<S>(
    source: &S,
    roster: &Roster,
    request_interval: Duration,
) -> TrackerResult<Vec<RatingSnapshot>>
where
    S: ProfileSource + ?Sized,
{
    let mut snapshots = Vec::with_capacity(roster.len());

    for (idx, user_id) in roster.iter().enumerate() {
        if idx > 0 && !request_interval.is_zero() {
            time::sleep(request_interval).await;
        }
        match source.fetch_profile(user_id).await {
            Ok(snapshot) => {
                debug!("Fetched profile of {user_id}: {}", snapshot.rating_text);
                snapshots.push(snapshot);
            }
            Err(e) => warn!("Could not fetch profile of {user_id}, skipping. {e}"),
        }
    }

    if snapshots.is_empty() && !roster.is_empty() {
        return Err(TrackerError::Unexpected(format!(
            "none of the {} roster profiles could be fetched",
            roster.len()
        )));
    }

    // Stable sort: equal ratings keep roster order
    snapshots.sort_by_key(|snapshot| Reverse(snapshot.numeric_rating));

    info!(
        "Built rating snapshot for {} of {} roster members",
        snapshots.len(),
        roster.len()
    );
    Ok(snapshots)
}
