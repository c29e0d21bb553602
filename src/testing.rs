//! In-memory fakes shared by the unit tests.

use crate::{
    core::{
        contests::{ContestListing, ContestListingSource},
        profile::{ProfileSource, RatingSnapshot},
    },
    error::{TrackerError, TrackerResult},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub fn snapshot(user_id: &str, rating: u32) -> RatingSnapshot {
    RatingSnapshot {
        user_id: user_id.to_string(),
        rating_text: rating.to_string(),
        numeric_rating: rating,
        kyu_rank: None,
        is_provisional: false,
        competitive_rank: String::new(),
        affiliation: String::new(),
    }
}

/// Profiles with a `None` rating fail to fetch.
pub struct FakeProfiles {
    ratings: HashMap<String, Option<u32>>,
    requested: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProfiles {
    pub fn new(entries: &[(&str, Option<u32>)]) -> Self {
        FakeProfiles {
            ratings: entries
                .iter()
                .map(|(user_id, rating)| (user_id.to_string(), *rating))
                .collect(),
            requested: Mutex::new(vec![]),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for FakeProfiles {
    async fn fetch_profile(&self, user_id: &str) -> TrackerResult<RatingSnapshot> {
        self.requested.lock().unwrap().push(user_id.to_string());
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.ratings.get(user_id) {
            Some(Some(rating)) => Ok(snapshot(user_id, *rating)),
            _ => Err(TrackerError::Unexpected(format!("profile of {user_id} unavailable"))),
        }
    }
}

/// Hands out the queued results in order, then fails.
pub struct FakeListing {
    results: Mutex<VecDeque<TrackerResult<ContestListing>>>,
}

impl FakeListing {
    pub fn new(results: Vec<TrackerResult<ContestListing>>) -> Self {
        FakeListing {
            results: Mutex::new(results.into()),
        }
    }
}

#[async_trait]
impl ContestListingSource for FakeListing {
    async fn fetch_contest_listing(&self) -> TrackerResult<ContestListing> {
        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(TrackerError::Unexpected("navigation timed out".to_string())))
    }
}

/// Answer a single HTTP request with the given status line and body. The
/// handle resolves to the raw request that was received.
pub async fn serve_once(status: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 16 * 1024];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (format!("http://{addr}"), handle)
}

pub const FAKE_SESSION_ID: &str = "s1";

/// A WebDriver endpoint that serves `page` as the source of every navigation.
/// With `page` set to `None`, only session creation and deletion are answered
/// and every other command hangs. Every request is recorded as
/// `"METHOD /path"`.
pub async fn fake_webdriver(page: Option<&str>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(vec![]));
    let page = page.map(str::to_string);

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::spawn(webdriver_connection(socket, Arc::clone(&seen), page.clone()));
        }
    });

    (format!("http://{addr}"), requests)
}

async fn webdriver_connection(
    mut socket: TcpStream,
    requests: Arc<Mutex<Vec<String>>>,
    page: Option<String>,
) {
    let mut buf = Vec::new();
    loop {
        // Read the request head, then its body.
        let head_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        buf.drain(..head_end + content_length);

        let request = head
            .lines()
            .next()
            .unwrap_or_default()
            .rsplitn(2, ' ')
            .last()
            .unwrap_or_default()
            .to_string();
        requests.lock().unwrap().push(request.clone());

        let session = format!("/session/{FAKE_SESSION_ID}");
        let value = match (request.as_str(), &page) {
            ("POST /session", _) => json!({ "sessionId": FAKE_SESSION_ID, "capabilities": {} }),
            (r, _) if r == format!("DELETE {session}") => Value::Null,
            (_, None) => return std::future::pending().await,
            (r, _) if r == format!("GET {session}/url") => json!("about:blank"),
            (r, _) if r == format!("POST {session}/element") => {
                json!({ "element-6066-11e4-a52e-4f735466cecf": "e1" })
            }
            (r, Some(page)) if r == format!("GET {session}/source") => json!(page),
            _ => Value::Null,
        };

        let body = json!({ "value": value }).to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        if socket.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}
