use crate::{
    core::{
        commands::Command,
        contests::ContestListing,
        events::Event,
        profile::RatingSnapshot,
        standings::{ContestId, StandingEntry, StandingsClient},
    },
    error::TrackerResult,
    storage::{MemoryCache, Published},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point of the read paths: on-demand standings and the two cached
/// aggregate views. Never writes to the caches.
pub struct Tracker {
    standings_client: StandingsClient,
    session_cookie: String,
    cache: MemoryCache,
}

impl Tracker {
    pub fn new(standings_client: StandingsClient, session_cookie: String, cache: MemoryCache) -> Self {
        Self {
            standings_client,
            session_cookie,
            cache,
        }
    }

    /// Roster standings for the contest `{contest_type}{contest_number}`.
    pub async fn standings(
        &self,
        contest_type: &str,
        contest_number: &str,
    ) -> TrackerResult<Vec<StandingEntry>> {
        let contest_id = ContestId::from_parts(contest_type, contest_number)?;
        self.standings_client
            .fetch_standings(&contest_id, &self.session_cookie)
            .await
    }

    /// Latest published roster ratings, empty until the first refresh.
    pub fn ratings(&self) -> Arc<Published<Vec<RatingSnapshot>>> {
        self.cache.ratings.load()
    }

    /// Latest published contest listing, empty until the first refresh.
    pub fn contests(&self) -> Arc<Published<ContestListing>> {
        self.cache.contests.load()
    }

    pub async fn respond(&self, command: Command) -> Event {
        info!("Answering {command:?}");
        match command {
            Command::Help => Event::Help,
            Command::Standings(contest_type, contest_number) => {
                let contest = format!("{contest_type}{contest_number}");
                match self.standings(&contest_type, &contest_number).await {
                    Ok(entries) => Event::Standings(contest, entries),
                    Err(e) => {
                        warn!("Could not fetch standings for {contest}. {e}");
                        Event::StandingsUnavailable(contest, e)
                    }
                }
            }
            Command::Ratings => Event::RosterRatings(self.ratings()),
            Command::Contests => Event::ContestListing(self.contests()),
        }
    }
}
