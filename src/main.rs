use atcoder_tracker::cli::Cli;
use atcoder_tracker::client::{atcoder::AtCoder, browser::HeadlessBrowser};
use atcoder_tracker::config::Settings;
use atcoder_tracker::core::{commands::Command, events::Event, roster::Roster, standings::StandingsClient};
use atcoder_tracker::scheduler::{JobProcess, RefreshContext, Scheduler};
use atcoder_tracker::storage::MemoryCache;
use atcoder_tracker::tracker::Tracker;

use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// Single threaded: the refresh jobs and the command loop interleave on one
// thread, and the caches are only swapped between awaits.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(&cli)?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let roster = Arc::new(Roster::new(settings.roster.iter()));
    info!("Tracking {} roster members.", roster.len());

    let atcoder = Arc::new(AtCoder::new(
        settings.atcoder_base_url.clone(),
        settings.atcoder_api_timeout(),
    )?);
    let cache = MemoryCache::new();
    let tracker = Arc::new(Tracker::new(
        StandingsClient::new(Arc::clone(&atcoder), Arc::clone(&roster)),
        settings.atcoder_session_cookie.clone(),
        cache.clone(),
    ));

    // One shot mode: print the standings and leave.
    if let Some(contest) = cli.contest.as_deref() {
        let reply = tracker.respond(Command::standings_for(contest)).await;
        println!("{reply}");
        return match reply {
            Event::StandingsUnavailable(_, e) => Err(e.into()),
            _ => Ok(()),
        };
    }

    // Capacity of 64 should be more than plenty to handle all the messages
    let (tx, mut rx) = mpsc::channel::<Event>(64);

    let context = RefreshContext {
        roster,
        profiles: atcoder,
        listing: Arc::new(HeadlessBrowser::new(
            settings.webdriver_url.clone(),
            settings.atcoder_base_url.clone(),
            settings.browser_timeout(),
        )?),
        profile_request_interval: settings.profile_request_interval(),
        cache,
        sender: tx.clone(),
    };
    let sched = Scheduler::new(context).await?;

    let jobs = vec![
        JobProcess::InitializeRosterRatings,  // only ran once, at startup.
        JobProcess::InitializeContestListing, // only ran once, at startup.
        JobProcess::RefreshRosterRatings(&settings.ratings_refresh_schedule),
        JobProcess::RefreshContestListing(&settings.contests_refresh_schedule),
    ];
    for job in jobs {
        sched.add_job(job).await?;
    }

    info!("Starting scheduler.");
    sched.start().await?;

    // Commands are read line by line from stdin.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(command) = Command::parse(&line) else {
                        debug!("Ignoring input '{line}'");
                        continue;
                    };
                    let reply = tracker.respond(command).await;
                    if let Err(e) = tx.send(reply).await {
                        warn!("Could not send reply to MPSC channel. {e}");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Standard input closed, no more commands will be read.");
                    break;
                }
                Err(e) => {
                    warn!("Could not read command. {e}");
                    break;
                }
            }
        }
    });

    info!("Waiting for events.");
    while let Some(event) = rx.recv().await {
        println!("{event}");
    }

    Ok(())
}
