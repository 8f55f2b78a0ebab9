use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Category used when the page carries no usable category link.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Column order of every review export.
pub const REVIEW_COLUMNS: [&str; 3] = ["review_text", "date", "category"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_text: String,
    pub date: NaiveDate,
    pub category: String,
}

/// Reviews in fetch order: page ascending, then document order within a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewTable {
    rows: Vec<ReviewRecord>,
}

impl ReviewTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ReviewRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.rows.iter()
    }

    /// Writes the table as CSV with a header row, even when empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(REVIEW_COLUMNS)?;
        for record in &self.rows {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

impl From<Vec<ReviewRecord>> for ReviewTable {
    fn from(rows: Vec<ReviewRecord>) -> Self {
        Self { rows }
    }
}

impl FromIterator<ReviewRecord> for ReviewTable {
    fn from_iter<I: IntoIterator<Item = ReviewRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ReviewTable {
    type Item = ReviewRecord;
    type IntoIter = std::vec::IntoIter<ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReviewTable {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Labels a compound polarity score.
    pub fn from_compound(compound: f64) -> Self {
        if compound > 0.0 {
            Sentiment::Positive
        } else if compound < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_1" => Ok(Sentiment::Positive),
            "negative" | "neg" | "label_0" => Ok(Sentiment::Negative),
            "neutral" | "neu" => Ok(Sentiment::Neutral),
            other => Err(Error::Inference(format!("Unknown sentiment label: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub scores: BTreeMap<String, f64>,
}
