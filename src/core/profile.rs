use crate::{
    core::rating::parse_rating,
    error::{TrackerError, TrackerResult},
};
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;

const RATING_LABEL: &'static str = "Rating";
const RANK_LABEL: &'static str = "Rank";
const AFFILIATION_LABEL: &'static str = "Affiliation";

static SELECTOR_PROFILE_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table.dl-table tr"#).unwrap());
static SELECTOR_HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static SELECTOR_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingSnapshot {
    pub user_id: String,
    pub rating_text: String,
    pub numeric_rating: u32,
    pub kyu_rank: Option<String>,
    pub is_provisional: bool,
    pub competitive_rank: String,
    pub affiliation: String,
}

/// Anything able to produce the rating snapshot of one user.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> TrackerResult<RatingSnapshot>;
}

fn collapsed_text(element: ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

/// Profile fields are laid out as `<tr><th>Label</th><td>Value</td></tr>` rows.
/// The first row wins when a label appears twice.
fn profile_fields(document: &Html) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for row in document.select(&SELECTOR_PROFILE_ROWS) {
        let header = row.select(&SELECTOR_HEADER).next();
        let cell = row.select(&SELECTOR_CELL).next();
        if let (Some(header), Some(cell)) = (header, cell) {
            fields
                .entry(collapsed_text(header))
                .or_insert_with(|| collapsed_text(cell));
        }
    }
    fields
}

pub fn parse_profile(user_id: &str, profile: &str) -> TrackerResult<RatingSnapshot> {
    let document = Html::parse_document(profile);
    let mut fields = profile_fields(&document);

    let rating_text = fields.remove(RATING_LABEL).ok_or_else(|| {
        TrackerError::Unexpected(format!("no {RATING_LABEL} field in profile of {user_id}"))
    })?;
    let parsed = parse_rating(&rating_text);

    Ok(RatingSnapshot {
        user_id: user_id.to_string(),
        rating_text,
        numeric_rating: parsed.rating,
        kyu_rank: parsed.kyu_rank,
        is_provisional: parsed.is_provisional,
        competitive_rank: fields.remove(RANK_LABEL).unwrap_or_default(),
        affiliation: fields.remove(AFFILIATION_LABEL).unwrap_or_default(),
    })
}
