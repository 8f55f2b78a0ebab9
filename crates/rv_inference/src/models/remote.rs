use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rv_core::{Error, Result, Sentiment, SentimentAnalyzer, SentimentResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Config;

pub const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Prediction {
    label: String,
    score: f64,
}

/// Classifier served by a text-classification inference endpoint.
pub struct RemoteModelAnalyzer {
    client: Arc<Client>,
    api_key: Option<String>,
    model_url: String,
}

impl RemoteModelAnalyzer {
    pub async fn new(config: Option<Config>) -> Result<Self> {
        let config = config.unwrap_or_default();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key: config.api_key,
            model_url: config
                .model_url
                .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
        })
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }
}

impl fmt::Debug for RemoteModelAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModelAnalyzer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_url", &self.model_url)
            .finish()
    }
}

#[async_trait]
impl SentimentAnalyzer for RemoteModelAnalyzer {
    fn name(&self) -> &str {
        "BERT"
    }

    async fn analyze_text(&self, text: &str) -> Result<SentimentResult> {
        let mut request = self
            .client
            .post(&self.model_url)
            .json(&ClassifyRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: self.model_url.clone(),
            });
        }
        let body: Value = response.json().await?;
        prediction_to_result(top_prediction(body)?)
    }
}

/// Picks the highest scoring label from `[{..}]` or `[[{..}]]` responses.
fn top_prediction(body: Value) -> Result<Prediction> {
    let candidates = match body {
        Value::Array(items) if matches!(items.first(), Some(Value::Array(_))) => {
            match items.into_iter().next() {
                Some(Value::Array(inner)) => inner,
                _ => Vec::new(),
            }
        }
        Value::Array(items) => items,
        Value::Object(map) if map.contains_key("error") => {
            return Err(Error::Inference(format!("Model error: {}", map["error"])));
        }
        other => {
            return Err(Error::Inference(format!("Unexpected model response: {}", other)));
        }
    };

    candidates
        .into_iter()
        .map(serde_json::from_value::<Prediction>)
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| Error::Inference("Model returned no predictions".to_string()))
}

fn prediction_to_result(prediction: Prediction) -> Result<SentimentResult> {
    let sentiment: Sentiment = prediction.label.parse()?;
    let mut scores = BTreeMap::new();
    scores.insert("score".to_string(), prediction.score);
    Ok(SentimentResult { sentiment, scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_response() {
        let body = json!([[
            {"label": "NEGATIVE", "score": 0.0213},
            {"label": "POSITIVE", "score": 0.9787}
        ]]);
        let prediction = top_prediction(body).unwrap();
        assert_eq!(prediction.label, "POSITIVE");

        let result = prediction_to_result(prediction).unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.scores["score"], 0.9787);
    }

    #[test]
    fn test_flat_response() {
        let body = json!([{"label": "LABEL_0", "score": 0.91}]);
        let result = prediction_to_result(top_prediction(body).unwrap()).unwrap();
        assert_eq!(result.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_error_responses() {
        let loading = json!({"error": "Model is currently loading", "estimated_time": 20.0});
        assert!(matches!(top_prediction(loading), Err(Error::Inference(_))));
        assert!(matches!(top_prediction(json!([])), Err(Error::Inference(_))));
        assert!(matches!(top_prediction(json!("text")), Err(Error::Inference(_))));
        assert!(matches!(
            top_prediction(json!([{"label": "POSITIVE"}])),
            Err(Error::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_debug_redacts_key() {
        let analyzer = RemoteModelAnalyzer::new(Some(Config {
            api_key: Some("hf_secret".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();
        let debug = format!("{:?}", analyzer);
        assert!(!debug.contains("hf_secret"));
        assert_eq!(analyzer.model_url(), DEFAULT_MODEL_URL);
    }
}
