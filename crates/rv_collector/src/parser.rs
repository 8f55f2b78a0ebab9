//! Extraction of review records from a listing page.
//!
//! Elements are located through structural markers (attribute selectors such
//! as `data-hook`) rather than presentation classes where the page allows it.

use chrono::{Month, NaiveDate};
use rv_core::{Error, Result, ReviewRecord, UNKNOWN_CATEGORY};
use scraper::{ElementRef, Html, Selector};

use crate::config::MarkerConfig;

/// Date format following the last `"on "` of a review date line.
pub const REVIEW_DATE_FORMAT: &str = "%B %d, %Y";

const DATE_PREFIX_END: &str = "on ";

#[derive(Debug, Clone)]
pub struct PageMarkers {
    review: Selector,
    body: Selector,
    date: Selector,
    category: Selector,
}

impl PageMarkers {
    pub fn new(config: &MarkerConfig) -> Result<Self> {
        Ok(Self {
            review: parse_selector(&config.review)?,
            body: parse_selector(&config.body)?,
            date: parse_selector(&config.date)?,
            category: parse_selector(&config.category)?,
        })
    }

    /// Parses a page body into records, skipping incomplete or undated reviews.
    pub fn parse_reviews(&self, html: &str) -> Vec<ReviewRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for container in document.select(&self.review) {
            let body = first_text(container, &self.body);
            let date = first_text(container, &self.date);
            let (Some(review_text), Some(date_text)) = (body, date) else {
                continue;
            };
            let Some(date) = parse_review_date(&date_text) else {
                continue;
            };

            records.push(ReviewRecord {
                review_text,
                date,
                category: self.extract_category(&document),
            });
        }

        records
    }

    /// Text of the page's category link, or the `Unknown` sentinel.
    pub fn extract_category(&self, document: &Html) -> String {
        document
            .select(&self.category)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            // Blank link text is treated the same as a missing link.
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}

/// Parses lines such as `"Reviewed in the United States on March 4, 2022"`.
///
/// Only the text after the last `"on "` is considered, so a line whose date
/// is followed by another `"on "` will not parse. The month must be spelled
/// out in full; `"Mar 4, 2022"` is rejected.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .rsplit_once(DATE_PREFIX_END)
        .map(|(_, date)| date)
        .unwrap_or(raw)
        .trim();
    let month = date_part.split_whitespace().next()?;
    if !is_full_month_name(month) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, REVIEW_DATE_FORMAT).ok()
}

fn is_full_month_name(word: &str) -> bool {
    (1..=12u8)
        .filter_map(|n| Month::try_from(n).ok())
        .any(|month| month.name().eq_ignore_ascii_case(word))
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {:?}", selector, e)))
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
