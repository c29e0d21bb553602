use crate::{
    core::{
        contests::ContestListing, display, profile::RatingSnapshot, standings::StandingEntry,
        templates::MessageTemplate,
    },
    error::TrackerError,
    storage::Published,
};

use chrono::{DateTime, Local, Utc};
use minijinja::context;
use std::{fmt, sync::Arc};

#[derive(Debug)]
pub enum Event {
    // Published by the refresh scheduler
    RosterRatingsUpdated(Arc<Published<Vec<RatingSnapshot>>>),
    ContestListingUpdated(Arc<Published<ContestListing>>),
    // Replies to commands
    Help,
    Standings(String, Vec<StandingEntry>),
    StandingsUnavailable(String, TrackerError),
    RosterRatings(Arc<Published<Vec<RatingSnapshot>>>),
    ContestListing(Arc<Published<ContestListing>>),
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> Option<String> {
    timestamp.map(|t| format!("{}", t.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S")))
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rendered = match self {
            Event::RosterRatingsUpdated(ratings) => MessageTemplate::RosterRatingsUpdated
                .render(context! { count => ratings.data.len() }),
            Event::ContestListingUpdated(listing) => MessageTemplate::ContestListingUpdated
                .render(context! {
                    upcoming => listing.data.upcoming.len(),
                    recent => listing.data.recent.len(),
                }),
            Event::Help => MessageTemplate::Help.render(context! {}),
            Event::Standings(contest, entries) => MessageTemplate::Standings.render(context! {
                contest => contest,
                standings => display::standings(entries),
            }),
            Event::StandingsUnavailable(contest, error) => MessageTemplate::StandingsUnavailable
                .render(context! {
                    contest => contest,
                    error => error.to_string(),
                }),
            Event::RosterRatings(ratings) => MessageTemplate::RosterRatings.render(context! {
                timestamp => format_timestamp(ratings.timestamp),
                ratings => display::ratings(&ratings.data),
            }),
            Event::ContestListing(listing) => MessageTemplate::ContestListing.render(context! {
                timestamp => format_timestamp(listing.timestamp),
                upcoming => display::contests(&listing.data.upcoming),
                recent => display::contests(&listing.data.recent),
            }),
        };
        write!(f, "{}", rendered.map_err(|_| fmt::Error)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contests::ContestRow;
    use crate::testing::snapshot;

    #[test]
    fn help_lists_commands() {
        let help = Event::Help.to_string();
        for cmd in ["!help", "!standings", "!ratings", "!contests"] {
            assert!(help.contains(cmd));
        }
    }

    #[test]
    fn standings_reply_shows_table_or_absence() {
        let entry = StandingEntry {
            user_id: "varun94".to_string(),
            rank: 12,
            raw_elapsed_nanos: 125_000_000_000,
            formatted_elapsed: "02:05".to_string(),
            score: 150000,
        };
        let reply = Event::Standings("abc300".to_string(), vec![entry]).to_string();
        assert!(reply.starts_with("🏁 Roster standings for *abc300*:\n```\n"));
        assert!(reply.contains("12th) varun94  1500 pts  02:05"));

        let empty = Event::Standings("abc300".to_string(), vec![]).to_string();
        assert!(empty.ends_with("No roster member took part in this contest."));
    }

    #[test]
    fn standings_failure_names_the_error() {
        let reply =
            Event::StandingsUnavailable("abc300".to_string(), TrackerError::InvalidCredential)
                .to_string();
        assert_eq!(
            reply,
            "⚠️ Could not fetch standings for *abc300*: Invalid session cookie"
        );
    }

    #[test]
    fn unpublished_caches_say_so() {
        let ratings = Event::RosterRatings(Arc::new(Published::default())).to_string();
        assert_eq!(ratings, "📈 Roster ratings are not available yet.");
        let contests = Event::ContestListing(Arc::new(Published::default())).to_string();
        assert_eq!(contests, "📅 Contest listing is not available yet.");
    }

    #[test]
    fn published_caches_are_rendered() {
        let ratings = Arc::new(Published {
            timestamp: Some(Utc::now()),
            data: vec![snapshot("krishankant05", 1500)],
        });
        let reply = Event::RosterRatings(ratings).to_string();
        assert!(reply.starts_with("📈 Roster ratings as of "));
        assert!(reply.contains("1) krishankant05  1500"));

        let listing = Arc::new(Published {
            timestamp: Some(Utc::now()),
            data: ContestListing {
                upcoming: vec![],
                recent: vec![ContestRow {
                    time: "2024-10-26 21:00:00+0900".to_string(),
                    title: "AtCoder Beginner Contest 377".to_string(),
                    link: "https://atcoder.jp/contests/abc377".to_string(),
                }],
            },
        });
        let reply = Event::ContestListing(listing.clone()).to_string();
        assert!(reply.contains("Upcoming:\n```\nnone\n```"));
        assert!(reply.contains("AtCoder Beginner Contest 377 <https://atcoder.jp/contests/abc377>"));

        let update = Event::ContestListingUpdated(listing).to_string();
        assert_eq!(update, "🔁 Contest listing refreshed (0 upcoming, 1 recent).");
    }
}
