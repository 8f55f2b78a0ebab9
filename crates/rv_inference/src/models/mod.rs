use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rv_core::{Error, Result, SentimentAnalyzer};

pub mod lexicon;
pub mod remote;

pub use lexicon::LexiconAnalyzer;
pub use remote::RemoteModelAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerKind {
    /// Fast rule-based scoring
    #[default]
    Lexicon,
    /// Transformer classifier behind an HTTP endpoint
    Model,
}

impl FromStr for AnalyzerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vader" | "lexicon" => Ok(AnalyzerKind::Lexicon),
            "bert" | "model" | "remote" => Ok(AnalyzerKind::Model),
            other => Err(Error::Config(format!(
                "Unknown model: {}. Available models: vader (default), bert",
                other
            ))),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::Lexicon => f.write_str("vader"),
            AnalyzerKind::Model => f.write_str("bert"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub kind: AnalyzerKind,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: AnalyzerKind::default(),
            model_url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

pub async fn create_analyzer(config: Option<Config>) -> Result<Arc<dyn SentimentAnalyzer>> {
    let kind = config.as_ref().map(|c| c.kind).unwrap_or_default();
    match kind {
        AnalyzerKind::Lexicon => Ok(Arc::new(LexiconAnalyzer::new(config).await?)),
        AnalyzerKind::Model => Ok(Arc::new(RemoteModelAnalyzer::new(config).await?)),
    }
}
