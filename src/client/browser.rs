use crate::{
    client::atcoder::Endpoint,
    core::contests::{parse_contest_listing, ContestListing, ContestListingSource},
    error::{TrackerError, TrackerResult},
};
use async_trait::async_trait;
use fantoccini::{wd::TimeoutConfiguration, Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

// Present once the listing script has rendered the page.
const RENDERED_LISTING_SELECTOR: &'static str = "#contest-table-recent tbody tr";

const HEADLESS_CHROME_ARGS: [&'static str; 4] = [
    "--headless",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

/// Scrapes the contests page through a WebDriver controlled headless browser.
/// One browser session is opened per listing fetch and released before
/// returning.
///
/// Opening the session is bounded by `timeout` too. If that bound fires after
/// the driver created the session but before it answered, the session id is
/// never learned and the driver reclaims the session on its own idle timeout.
pub struct HeadlessBrowser {
    webdriver_url: String,
    base_url: String,
    timeout: Duration,
    // Talks to the driver directly when fantoccini cannot.
    http_client: reqwest::Client,
}

impl HeadlessBrowser {
    pub fn new(webdriver_url: String, base_url: String, timeout: Duration) -> TrackerResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            webdriver_url,
            base_url,
            timeout,
            http_client,
        })
    }

    fn capabilities() -> Map<String, Value> {
        let mut capabilities = Map::new();
        // "normal" waits for the load event before navigation returns.
        capabilities.insert("pageLoadStrategy".to_string(), json!("normal"));
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": HEADLESS_CHROME_ARGS }),
        );
        capabilities
    }

    async fn open_session(&self) -> TrackerResult<Client> {
        let mut builder = ClientBuilder::rustls();
        builder.capabilities(HeadlessBrowser::capabilities());
        let client = builder.connect(&self.webdriver_url).await?;
        Ok(client)
    }

    async fn rendered_page(&self, client: &Client, url: &str) -> TrackerResult<String> {
        // The driver itself gives up on a page load slower than our own bound.
        client
            .update_timeouts(TimeoutConfiguration::new(None, Some(self.timeout), None))
            .await?;
        client.goto(url).await?;
        client
            .wait()
            .at_most(self.timeout)
            .for_element(Locator::Css(RENDERED_LISTING_SELECTOR))
            .await?;
        Ok(client.source().await?)
    }

    /// Release the browser session, within `timeout`.
    ///
    /// fantoccini queues the close command behind any request still pending,
    /// and a navigation abandoned by our timeout stays pending. In that case
    /// the session is deleted with a direct WebDriver call.
    async fn close_session(&self, client: Client, session_id: Option<String>) {
        match time::timeout(self.timeout, client.close()).await {
            Ok(Ok(())) => debug!("Browser session closed"),
            Ok(Err(e)) => warn!("Could not close browser session. {e}"),
            Err(_) => match session_id {
                Some(session_id) => {
                    warn!("Timed out closing browser session {session_id}, deleting it directly");
                    self.delete_session(&session_id).await;
                }
                None => warn!("Timed out closing browser session of unknown id"),
            },
        }
    }

    async fn delete_session(&self, session_id: &str) {
        let url = format!(
            "{}/session/{}",
            self.webdriver_url.trim_end_matches('/'),
            session_id
        );
        match self.http_client.delete(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Browser session {session_id} deleted")
            }
            Ok(response) => warn!(
                "Could not delete browser session {session_id}, driver responded {}",
                response.status()
            ),
            Err(e) => warn!("Could not delete browser session {session_id}. {e}"),
        }
    }
}

#[async_trait]
impl ContestListingSource for HeadlessBrowser {
    async fn fetch_contest_listing(&self) -> TrackerResult<ContestListing> {
        let url = Endpoint::Contests.url(&self.base_url);
        info!("Loading {url} in headless browser");

        let client = time::timeout(self.timeout, self.open_session())
            .await
            .map_err(|_| {
                TrackerError::Unexpected(format!(
                    "timed out opening a session on {}",
                    self.webdriver_url
                ))
            })??;
        // Answered by fantoccini itself, no request reaches the driver.
        let session_id = client.session_id().await.ok().flatten();

        let page = time::timeout(self.timeout, self.rendered_page(&client, &url)).await;

        // The session must be released whatever happened while navigating.
        self.close_session(client, session_id).await;

        let page = page
            .map_err(|_| TrackerError::Unexpected(format!("timed out loading {url}")))??;
        parse_contest_listing(&page, &self.base_url)
    }
}
