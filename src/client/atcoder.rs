use crate::{
    core::{
        profile::{parse_profile, ProfileSource, RatingSnapshot},
        standings::{parse_standings_feed, ContestId, StandingsFeed},
    },
    error::{TrackerError, TrackerResult},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &'static str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub(crate) enum Endpoint {
    Standings(ContestId),
    Profile(String),
    Contests,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::Standings(contest_id) => {
                write!(f, "/contests/{}/standings/json", contest_id)
            }
            Endpoint::Profile(user_id) => write!(f, "/users/{}", user_id),
            Endpoint::Contests => write!(f, "/contests/"),
        }
    }
}

impl Endpoint {
    pub(crate) fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self)
    }

    /// Map a non successful response status to our error taxonomy.
    fn error_for(&self, status: StatusCode) -> TrackerError {
        match (self, status) {
            // AtCoder answers FORBIDDEN when the session cookie is invalid or expired.
            (Endpoint::Standings(_), StatusCode::FORBIDDEN) => TrackerError::InvalidCredential,
            (Endpoint::Standings(_), StatusCode::NOT_FOUND) => TrackerError::InvalidContestId,
            (endpoint, status) => {
                TrackerError::Unexpected(format!("{} responded {}", endpoint, status))
            }
        }
    }
}

pub struct AtCoder {
    http_client: Client,
    base_url: String,
}

impl AtCoder {
    pub fn new(base_url: String, timeout: Duration) -> TrackerResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    async fn get(&self, endpoint: &Endpoint, session_cookie: Option<&str>) -> TrackerResult<String> {
        let url = endpoint.url(&self.base_url);
        debug!("GET {url}");

        let mut request = self.http_client.get(&url);

        if let Some(session) = session_cookie {
            request = request.header("cookie", format!("REVEL_SESSION={session}"))
        }
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            status => Err(endpoint.error_for(status)),
        }
    }

    pub async fn standings(
        &self,
        contest_id: &ContestId,
        session_cookie: &str,
    ) -> TrackerResult<StandingsFeed> {
        let endpoint = Endpoint::Standings(contest_id.clone());
        let resp = self.get(&endpoint, Some(session_cookie)).await?;
        parse_standings_feed(&resp)
    }

    pub async fn profile(&self, user_id: &str) -> TrackerResult<RatingSnapshot> {
        let endpoint = Endpoint::Profile(user_id.to_string());
        let resp = self.get(&endpoint, None).await?;
        parse_profile(user_id, &resp)
    }
}

#[async_trait]
impl ProfileSource for AtCoder {
    async fn fetch_profile(&self, user_id: &str) -> TrackerResult<RatingSnapshot> {
        self.profile(user_id).await
    }
}
