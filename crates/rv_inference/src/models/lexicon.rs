use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::BufRead;

use async_trait::async_trait;
use rv_core::{Error, Result, Sentiment, SentimentAnalyzer, SentimentResult};

use super::Config;

/// Valences on a -4..=4 scale for common review vocabulary.
const REVIEW_LEXICON: &[(&str, f64)] = &[
    ("love", 3.2), ("loved", 2.9), ("loves", 2.7), ("lovely", 2.8), ("great", 3.1),
    ("excellent", 3.2), ("amazing", 2.8), ("awesome", 3.1), ("good", 1.9), ("nice", 1.8),
    ("perfect", 2.7), ("perfectly", 2.7), ("best", 3.2), ("better", 1.9), ("happy", 2.7),
    ("glad", 2.0), ("recommend", 1.5), ("recommended", 1.5), ("fantastic", 2.6),
    ("wonderful", 2.7), ("like", 1.5), ("liked", 1.8), ("enjoy", 2.2), ("enjoyed", 2.3),
    ("beautiful", 2.9), ("comfortable", 1.5), ("easy", 1.9), ("sturdy", 1.2),
    ("reliable", 1.5), ("satisfied", 1.8), ("pleased", 1.9), ("worth", 0.9), ("fun", 2.3),
    ("impressive", 2.3), ("impressed", 2.1), ("favorite", 2.0), ("useful", 1.9),
    ("helpful", 1.8), ("cute", 2.0), ("superb", 3.1), ("outstanding", 3.0),
    ("brilliant", 2.8), ("ok", 0.9), ("okay", 0.9), ("fine", 0.8), ("cool", 1.3),
    ("solid", 0.6), ("thanks", 1.9), ("win", 2.8), ("works", 0.4), ("bad", -2.5),
    ("terrible", -2.1), ("awful", -2.0), ("horrible", -2.5), ("worst", -3.1),
    ("worse", -2.1), ("poor", -2.1), ("poorly", -2.1), ("broke", -1.8), ("broken", -2.0),
    ("disappointed", -1.9), ("disappointing", -2.2), ("disappointment", -2.3),
    ("hate", -2.7), ("hated", -3.2), ("useless", -1.8), ("waste", -1.8), ("wasted", -2.2),
    ("cheap", -0.6), ("junk", -1.8), ("defective", -1.9), ("annoying", -1.7),
    ("sad", -2.1), ("angry", -2.3), ("problem", -1.7), ("problems", -1.7),
    ("fail", -2.3), ("failed", -2.3), ("fails", -2.2), ("flimsy", -1.4),
    ("unhappy", -1.8), ("uncomfortable", -1.6), ("difficult", -1.5), ("wrong", -2.1),
    ("ugly", -2.3), ("garbage", -1.9), ("crap", -1.6), ("mess", -1.5), ("sucks", -1.5),
    ("regret", -1.9), ("frustrating", -1.9), ("frustrated", -2.4), ("avoid", -1.2),
    ("damaged", -2.2), ("fake", -2.1), ("scam", -2.4), ("misleading", -1.7),
    ("mediocre", -1.0), ("boring", -1.3), ("noisy", -0.7), ("leak", -1.4),
    ("leaks", -1.4), ("refund", -0.8), ("stopped", -0.9), ("died", -2.6),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "neither", "nor", "without",
    "cannot", "cant", "dont", "doesnt", "didnt", "isnt", "wasnt", "wont", "wouldnt",
    "shouldnt", "couldnt", "arent", "aint", "hardly", "barely",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293), ("completely", 0.293), ("extremely", 0.293),
    ("incredibly", 0.293), ("really", 0.293), ("so", 0.293), ("super", 0.293),
    ("totally", 0.293), ("very", 0.293), ("highly", 0.293), ("too", 0.293),
    ("slightly", -0.293), ("somewhat", -0.293), ("kinda", -0.293), ("marginally", -0.293),
];

const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Rule-based scorer in the style of VADER: lexicon valences adjusted for
/// negation, intensity words, capitalisation, contrast and exclamations.
pub struct LexiconAnalyzer {
    lexicon: HashMap<String, f64>,
}

impl fmt::Debug for LexiconAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexiconAnalyzer")
            .field("entries", &self.lexicon.len())
            .finish()
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconAnalyzer {
    pub async fn new(_config: Option<Config>) -> Result<Self> {
        Ok(Self::builtin())
    }

    pub fn builtin() -> Self {
        Self {
            lexicon: REVIEW_LEXICON
                .iter()
                .map(|(word, valence)| (word.to_string(), *valence))
                .collect(),
        }
    }

    /// Adds entries from a tab separated `token<TAB>mean[<TAB>...]` source,
    /// the layout of `vader_lexicon.txt`.
    pub fn extend_from_reader<R: BufRead>(mut self, reader: R) -> Result<Self> {
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let (Some(token), Some(mean)) = (fields.next(), fields.next()) else {
                return Err(Error::Config(format!("lexicon line {} has no valence", number + 1)));
            };
            let valence: f64 = mean.trim().parse().map_err(|e| {
                Error::Config(format!("lexicon line {}: bad valence {:?}: {}", number + 1, mean, e))
            })?;
            self.lexicon.insert(token.to_lowercase(), valence);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    pub fn polarity_scores(&self, text: &str) -> BTreeMap<String, f64> {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        let lowered: Vec<String> = tokens
            .iter()
            .map(|t| t.to_lowercase().replace('\'', ""))
            .collect();
        let shouting_allowed = tokens.iter().any(|t| !is_all_caps(t));

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, word) in lowered.iter().enumerate() {
            let Some(&base) = self.lexicon.get(word) else {
                valences.push(0.0);
                continue;
            };

            let mut valence = base;
            if shouting_allowed && is_all_caps(tokens[i]) {
                valence += CAPS_INCREMENT * base.signum();
            }
            for distance in 1..=3 {
                let Some(prev) = i.checked_sub(distance).map(|j| lowered[j].as_str()) else {
                    break;
                };
                let decay = 1.0 - 0.05 * (distance - 1) as f64;
                if let Some((_, boost)) = BOOSTERS.iter().find(|(b, _)| *b == prev) {
                    valence += boost.signum() * BOOSTER_INCREMENT * decay * base.signum();
                }
                if NEGATIONS.contains(&prev) {
                    valence *= NEGATION_SCALAR;
                }
            }
            valences.push(valence);
        }

        if let Some(pivot) = lowered.iter().position(|w| w == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        let exclamations = text.matches('!').count().min(4) as f64;
        if sum > 0.0 {
            sum += exclamations * EXCLAMATION_INCREMENT;
        } else if sum < 0.0 {
            sum -= exclamations * EXCLAMATION_INCREMENT;
        }

        let compound = if sum == 0.0 {
            0.0
        } else {
            (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
        };

        let (mut pos, mut neg, mut neu) = (0.0_f64, 0.0_f64, 0.0_f64);
        for v in &valences {
            if *v > 0.0 {
                pos += v + 1.0;
            } else if *v < 0.0 {
                neg += v - 1.0;
            } else {
                neu += 1.0;
            }
        }
        let total = pos + neg.abs() + neu;

        let mut scores = BTreeMap::new();
        let share = |part: f64| if total > 0.0 { round3(part / total) } else { 0.0 };
        scores.insert("pos".to_string(), share(pos));
        scores.insert("neg".to_string(), share(neg.abs()));
        scores.insert("neu".to_string(), share(neu));
        scores.insert("compound".to_string(), round4(compound));
        scores
    }
}

#[async_trait]
impl SentimentAnalyzer for LexiconAnalyzer {
    fn name(&self) -> &str {
        "VADER"
    }

    async fn analyze_text(&self, text: &str) -> Result<SentimentResult> {
        let scores = self.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or_default();
        Ok(SentimentResult {
            sentiment: Sentiment::from_compound(compound),
            scores,
        })
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic()) && !token.chars().any(|c| c.is_lowercase())
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10000.0).round() / 10000.0
}
