use crate::error::{TrackerError, TrackerResult};
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

static SELECTOR_UPCOMING_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"#contest-table-upcoming tbody tr"#).unwrap());
static SELECTOR_RECENT_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"#contest-table-recent"#).unwrap());
static SELECTOR_RECENT_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"#contest-table-recent tbody tr"#).unwrap());
static SELECTOR_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static SELECTOR_TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static SELECTOR_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestRow {
    pub time: String,
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContestListing {
    pub upcoming: Vec<ContestRow>,
    pub recent: Vec<ContestRow>,
}

/// Anything able to produce the upcoming/recent contest listing. The listing
/// page is rendered client side, so the production source drives a browser.
#[async_trait]
pub trait ContestListingSource: Send + Sync {
    async fn fetch_contest_listing(&self) -> TrackerResult<ContestListing>;
}

fn collapsed_text(element: ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

fn absolute_link(href: &str, base_url: &str) -> String {
    match href.starts_with("http://") || href.starts_with("https://") {
        true => href.to_string(),
        false => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        ),
    }
}

impl ContestRow {
    /// Column 1 holds the start time, column 2 the contest link. Rows without
    /// a link are not contests (e.g. "no upcoming contest" placeholders).
    pub fn from_html(row: ElementRef, base_url: &str) -> Option<Self> {
        let cells = row.select(&SELECTOR_CELL).collect::<Vec<ElementRef>>();
        let (time_cell, title_cell) = (cells.first()?, cells.get(1)?);

        let time = time_cell
            .select(&SELECTOR_TIME)
            .next()
            .map_or_else(|| collapsed_text(*time_cell), collapsed_text);
        // Contest type and color badges come before the title link.
        let link = title_cell.select(&SELECTOR_LINK).last()?;
        let href = link.value().attr("href")?;

        Some(ContestRow {
            time,
            title: collapsed_text(link),
            link: absolute_link(href, base_url),
        })
    }
}

/// Extract both contest tables from the rendered contests page. The recent
/// table is always present on a correctly rendered page, the upcoming one is
/// omitted when nothing is scheduled.
pub fn parse_contest_listing(page: &str, base_url: &str) -> TrackerResult<ContestListing> {
    let document = Html::parse_document(page);

    if document.select(&SELECTOR_RECENT_TABLE).next().is_none() {
        return Err(TrackerError::Unexpected(
            "recent contests table not found in contests page".to_string(),
        ));
    }

    let rows = |selector: &Selector| {
        document
            .select(selector)
            .filter_map(|row| ContestRow::from_html(row, base_url))
            .collect::<Vec<ContestRow>>()
    };

    Ok(ContestListing {
        upcoming: rows(&*SELECTOR_UPCOMING_ROWS),
        recent: rows(&*SELECTOR_RECENT_ROWS),
    })
}
