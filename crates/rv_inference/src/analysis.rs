use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use rv_core::{Result, ReviewTable, Sentiment, SentimentAnalyzer, TextPreprocessor};
use serde::Serialize;
use tracing::info;

pub const ANALYZED_COLUMNS: [&str; 4] = ["review_text", "date", "category", "sentiment"];

/// A collected review with its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedReview {
    pub review_text: String,
    pub date: NaiveDate,
    pub category: String,
    pub sentiment: Sentiment,
    #[serde(skip)]
    pub processed_text: String,
}

/// Preprocesses and classifies every review, keeping table order.
pub async fn analyze_reviews(
    table: &ReviewTable,
    preprocessor: &dyn TextPreprocessor,
    analyzer: &dyn SentimentAnalyzer,
) -> Result<Vec<AnalyzedReview>> {
    let processed: Vec<String> = table
        .iter()
        .map(|r| preprocessor.preprocess(&r.review_text))
        .collect();
    info!("🧠 Classifying {} reviews with {}", processed.len(), analyzer.name());
    let results = analyzer.analyze_batch(&processed).await?;

    Ok(table
        .iter()
        .zip(processed)
        .zip(results)
        .map(|((record, processed_text), result)| AnalyzedReview {
            review_text: record.review_text.clone(),
            date: record.date,
            category: record.category.clone(),
            sentiment: result.sentiment,
            processed_text,
        })
        .collect())
}

pub fn write_analyzed_csv<W: Write>(reviews: &[AnalyzedReview], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(ANALYZED_COLUMNS)?;
    for review in reviews {
        wtr.serialize(review)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_analyzed_csv(reviews: &[AnalyzedReview], path: impl AsRef<Path>) -> Result<()> {
    write_analyzed_csv(reviews, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LexiconAnalyzer;
    use crate::preprocess::BasicPreprocessor;
    use rv_core::ReviewRecord;

    fn table() -> ReviewTable {
        vec![
            ReviewRecord {
                review_text: "Absolutely love it, great sound".to_string(),
                date: NaiveDate::from_ymd_opt(2022, 3, 4).unwrap(),
                category: "Electronics".to_string(),
            },
            ReviewRecord {
                review_text: "Terrible. Broke after two days".to_string(),
                date: NaiveDate::from_ymd_opt(2022, 3, 5).unwrap(),
                category: "Electronics".to_string(),
            },
        ]
        .into()
    }

    #[tokio::test]
    async fn test_analyze_reviews_keeps_order() {
        let reviews = analyze_reviews(&table(), &BasicPreprocessor::new(), &LexiconAnalyzer::builtin())
            .await
            .unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].sentiment, Sentiment::Positive);
        assert_eq!(reviews[0].processed_text, "absolutely love great sound");
        assert_eq!(reviews[1].sentiment, Sentiment::Negative);
        assert_eq!(reviews[1].review_text, "Terrible. Broke after two days");
    }

    #[tokio::test]
    async fn test_analyzed_csv() {
        let reviews = analyze_reviews(&table(), &BasicPreprocessor::new(), &LexiconAnalyzer::builtin())
            .await
            .unwrap();
        let mut out = Vec::new();
        write_analyzed_csv(&reviews, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "review_text,date,category,sentiment");
        assert_eq!(lines[1], "\"Absolutely love it, great sound\",2022-03-04,Electronics,positive");
        assert_eq!(lines[2], "Terrible. Broke after two days,2022-03-05,Electronics,negative");
    }
}
