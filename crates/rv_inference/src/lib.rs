pub mod analysis;
pub mod models;
pub mod preprocess;
pub mod summary;

pub use analysis::{analyze_reviews, save_analyzed_csv, write_analyzed_csv, AnalyzedReview};
pub use models::{create_analyzer, AnalyzerKind, Config, LexiconAnalyzer, RemoteModelAnalyzer};
pub use preprocess::BasicPreprocessor;
pub use summary::SentimentSummary;

pub mod prelude {
    pub use super::models::create_analyzer;
    pub use super::Config;
    pub use rv_core::{Error, Result, Sentiment, SentimentAnalyzer, TextPreprocessor};
}
