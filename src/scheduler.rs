use tokio_cron_scheduler::{Job, JobScheduler};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tracing::{error, info, warn};

use crate::core::contests::ContestListingSource;
use crate::core::events::Event;
use crate::core::profile::ProfileSource;
use crate::core::roster::{build_roster_snapshot, Roster};
use crate::error::TrackerResult;
use crate::storage::MemoryCache;

/// Everything a refresh job needs. The scheduler is the only writer of the
/// caches it holds.
#[derive(Clone)]
pub struct RefreshContext {
    pub roster: Arc<Roster>,
    pub profiles: Arc<dyn ProfileSource>,
    pub listing: Arc<dyn ContestListingSource>,
    pub profile_request_interval: Duration,
    pub cache: MemoryCache,
    pub sender: Sender<Event>, // communication to the output loop
}

pub struct Scheduler {
    scheduler: JobScheduler,
    context: RefreshContext,
}

pub enum JobProcess<'schedule> {
    InitializeRosterRatings,  // only ran once, at startup.
    InitializeContestListing, // only ran once, at startup.
    RefreshRosterRatings(&'schedule str),
    RefreshContestListing(&'schedule str),
}

impl Scheduler {
    pub async fn new(context: RefreshContext) -> TrackerResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler { scheduler, context })
    }

    pub async fn add_job(&self, job_process: JobProcess<'_>) -> TrackerResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::InitializeRosterRatings => {
                initialize_roster_ratings_job(self.context.clone())?
            }
            JobProcess::InitializeContestListing => {
                initialize_contest_listing_job(self.context.clone())?
            }
            JobProcess::RefreshRosterRatings(schedule) => {
                refresh_roster_ratings_job(schedule, self.context.clone())?
            }
            JobProcess::RefreshContestListing(schedule) => {
                refresh_contest_listing_job(schedule, self.context.clone())?
            }
        };
        Ok(self.scheduler.add(job).await?)
    }

    pub async fn start(&self) -> TrackerResult<()> {
        Ok(self.scheduler.start().await?)
    }
}

//////////////////
// Refresh cycles
//////////////////

async fn notify(sender: &Sender<Event>, event: Event) {
    if let Err(e) = sender.send(event).await {
        error!("Could not send event to MPSC channel. {e}");
    }
}

/// Rebuild the roster ratings and publish them. On failure the previously
/// published snapshot stays in place.
pub async fn refresh_roster_ratings(context: &RefreshContext) -> TrackerResult<usize> {
    let snapshots = build_roster_snapshot(
        context.profiles.as_ref(),
        &context.roster,
        context.profile_request_interval,
    )
    .await?;

    let published = context.cache.ratings.publish(snapshots);
    let count = published.data.len();
    notify(&context.sender, Event::RosterRatingsUpdated(published)).await;
    Ok(count)
}

/// Scrape the contest listing and publish it. On failure the previously
/// published listing stays in place.
pub async fn refresh_contest_listing(context: &RefreshContext) -> TrackerResult<(usize, usize)> {
    let listing = context.listing.fetch_contest_listing().await?;

    let published = context.cache.contests.publish(listing);
    let counts = (published.data.upcoming.len(), published.data.recent.len());
    notify(&context.sender, Event::ContestListingUpdated(published)).await;
    Ok(counts)
}

// A failed cycle is logged and never escapes the job.
async fn run_roster_ratings_refresh(context: &RefreshContext) {
    match refresh_roster_ratings(context).await {
        Ok(count) => info!("Roster ratings refreshed for {count} members"),
        Err(e) => error!("Could not refresh roster ratings, keeping previous snapshot. {e}"),
    }
}

async fn run_contest_listing_refresh(context: &RefreshContext) {
    match refresh_contest_listing(context).await {
        Ok((upcoming, recent)) => {
            info!("Contest listing refreshed ({upcoming} upcoming, {recent} recent)")
        }
        Err(e) => error!("Could not refresh contest listing, keeping previous listing. {e}"),
    }
}

//////////////////
// Jobs definition
//////////////////

fn initialize_roster_ratings_job(context: RefreshContext) -> TrackerResult<Job> {
    let job = Job::new_one_shot_async(Duration::from_secs(0), move |_uuid, _l| {
        let context = context.clone();
        Box::pin(async move {
            run_roster_ratings_refresh(&context).await;
        })
    })?;
    Ok(job)
}

fn initialize_contest_listing_job(context: RefreshContext) -> TrackerResult<Job> {
    let job = Job::new_one_shot_async(Duration::from_secs(0), move |_uuid, _l| {
        let context = context.clone();
        Box::pin(async move {
            run_contest_listing_refresh(&context).await;
        })
    })?;
    Ok(job)
}

fn refresh_roster_ratings_job(schedule: &str, context: RefreshContext) -> TrackerResult<Job> {
    let job = Job::new_async(schedule, move |uuid, mut l| {
        let context = context.clone();
        Box::pin(async move {
            run_roster_ratings_refresh(&context).await;

            // Query the next execution time for this job
            match l.next_tick_for_job(uuid).await {
                Ok(Some(ts)) => info!("Next refresh for roster ratings at {:?}", ts),
                _ => warn!("Could not get next tick for roster ratings refresh job"),
            }
        })
    })?;
    Ok(job)
}

fn refresh_contest_listing_job(schedule: &str, context: RefreshContext) -> TrackerResult<Job> {
    let job = Job::new_async(schedule, move |uuid, mut l| {
        let context = context.clone();
        Box::pin(async move {
            run_contest_listing_refresh(&context).await;

            // Query the next execution time for this job
            match l.next_tick_for_job(uuid).await {
                Ok(Some(ts)) => info!("Next refresh for contest listing at {:?}", ts),
                _ => warn!("Could not get next tick for contest listing refresh job"),
            }
        })
    })?;
    Ok(job)
}
