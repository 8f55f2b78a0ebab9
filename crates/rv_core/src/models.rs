use std::fmt;

use async_trait::async_trait;

use crate::types::SentimentResult;
use crate::Result;

/// Normalizes raw review text before classification.
pub trait TextPreprocessor: Send + Sync {
    fn preprocess(&self, text: &str) -> String;
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync + fmt::Debug {
    /// Short name shown to the user
    fn name(&self) -> &str;

    /// Classify a single piece of text
    async fn analyze_text(&self, text: &str) -> Result<SentimentResult>;

    /// Classify texts one after another, preserving input order
    async fn analyze_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.analyze_text(text).await?);
        }
        Ok(results)
    }
}
