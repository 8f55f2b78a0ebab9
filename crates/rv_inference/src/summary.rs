use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use rv_core::Sentiment;

use crate::analysis::AnalyzedReview;

pub type SentimentCounts = BTreeMap<Sentiment, usize>;

/// Aggregates over a set of analyzed reviews.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentSummary {
    pub total: usize,
    pub counts: SentimentCounts,
    pub by_category: BTreeMap<String, SentimentCounts>,
    pub by_date: BTreeMap<NaiveDate, SentimentCounts>,
    pub top_terms: BTreeMap<Sentiment, Vec<(String, usize)>>,
}

impl SentimentSummary {
    pub const TOP_TERMS: usize = 10;

    pub fn from_reviews(reviews: &[AnalyzedReview]) -> Self {
        let mut summary = Self {
            total: reviews.len(),
            ..Default::default()
        };
        let mut terms: BTreeMap<Sentiment, HashMap<&str, usize>> = BTreeMap::new();

        for review in reviews {
            *summary.counts.entry(review.sentiment).or_default() += 1;
            *summary
                .by_category
                .entry(review.category.clone())
                .or_default()
                .entry(review.sentiment)
                .or_default() += 1;
            *summary
                .by_date
                .entry(review.date)
                .or_default()
                .entry(review.sentiment)
                .or_default() += 1;

            let bucket = terms.entry(review.sentiment).or_default();
            for term in review.processed_text.split_whitespace() {
                *bucket.entry(term).or_default() += 1;
            }
        }

        for (sentiment, counts) in terms {
            let mut ranked: Vec<(String, usize)> = counts
                .into_iter()
                .map(|(term, n)| (term.to_string(), n))
                .collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(Self::TOP_TERMS);
            summary.top_terms.insert(sentiment, ranked);
        }

        summary
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.counts.get(&sentiment).copied().unwrap_or_default()
    }

    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(sentiment) as f64 * 100.0 / self.total as f64
    }

    /// The most frequent label; ties go to the earlier of positive, negative, neutral.
    pub fn dominant(&self) -> Option<Sentiment> {
        Sentiment::ALL
            .into_iter()
            .filter(|s| self.count(*s) > 0)
            .fold(None, |best: Option<Sentiment>, s| match best {
                Some(b) if self.count(b) >= self.count(s) => Some(b),
                _ => Some(s),
            })
    }
}

impl fmt::Display for SentimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Summary ({} reviews)", self.total)?;
        for sentiment in Sentiment::ALL {
            writeln!(
                f,
                "  {:<9} {:>5} reviews  {:>5.1}%",
                sentiment,
                self.count(sentiment),
                self.percentage(sentiment)
            )?;
        }

        if !self.by_category.is_empty() {
            writeln!(f, "\n🗂  By category")?;
            for (category, counts) in &self.by_category {
                writeln!(f, "  {}: {}", category, format_counts(counts))?;
            }
        }

        if !self.by_date.is_empty() {
            writeln!(f, "\n📈 Trend")?;
            for (date, counts) in &self.by_date {
                writeln!(f, "  {}: {}", date, format_counts(counts))?;
            }
        }

        for (sentiment, terms) in &self.top_terms {
            if terms.is_empty() {
                continue;
            }
            let list = terms
                .iter()
                .map(|(t, n)| format!("{} ({})", t, n))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "\n🔤 Top {} terms: {}", sentiment, list)?;
        }
        Ok(())
    }
}

fn format_counts(counts: &SentimentCounts) -> String {
    Sentiment::ALL
        .iter()
        .map(|s| format!("{} {}", s, counts.get(s).copied().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(date: (i32, u32, u32), category: &str, sentiment: Sentiment, processed: &str) -> AnalyzedReview {
        AnalyzedReview {
            review_text: processed.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.to_string(),
            sentiment,
            processed_text: processed.to_string(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let reviews = vec![
            review((2022, 3, 4), "Electronics", Sentiment::Positive, "great sound great bass"),
            review((2022, 3, 4), "Electronics", Sentiment::Negative, "battery died"),
            review((2022, 3, 5), "Unknown", Sentiment::Positive, "great value"),
            review((2022, 3, 5), "Unknown", Sentiment::Neutral, "arrived tuesday"),
        ];
        let summary = SentimentSummary::from_reviews(&reviews);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(Sentiment::Positive), 2);
        assert_eq!(summary.percentage(Sentiment::Positive), 50.0);
        assert_eq!(summary.percentage(Sentiment::Negative), 25.0);
        assert_eq!(summary.dominant(), Some(Sentiment::Positive));

        let electronics = &summary.by_category["Electronics"];
        assert_eq!(electronics.get(&Sentiment::Negative), Some(&1));
        assert_eq!(electronics.get(&Sentiment::Neutral), None);

        let day = NaiveDate::from_ymd_opt(2022, 3, 5).unwrap();
        assert_eq!(summary.by_date[&day].values().sum::<usize>(), 2);

        assert_eq!(summary.top_terms[&Sentiment::Positive][0], ("great".to_string(), 3));
    }

    #[test]
    fn test_empty_summary() {
        let summary = SentimentSummary::from_reviews(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percentage(Sentiment::Neutral), 0.0);
        assert_eq!(summary.dominant(), None);
        assert!(summary.to_string().contains("0 reviews"));
    }

    #[test]
    fn test_display_sections() {
        let reviews = vec![review((2021, 1, 2), "Books", Sentiment::Negative, "boring plot")];
        let text = SentimentSummary::from_reviews(&reviews).to_string();
        assert!(text.contains("Books: positive 0, negative 1, neutral 0"));
        assert!(text.contains("2021-01-02: positive 0, negative 1, neutral 0"));
        assert!(text.contains("Top negative terms: boring (1), plot (1)"));
    }
}
