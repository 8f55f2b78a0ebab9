pub mod error;
pub mod models;
pub mod types;

pub use error::{Error, Result};
pub use models::{SentimentAnalyzer, TextPreprocessor};
pub use types::{
    ReviewRecord, ReviewTable, Sentiment, SentimentResult, REVIEW_COLUMNS, UNKNOWN_CATEGORY,
};
