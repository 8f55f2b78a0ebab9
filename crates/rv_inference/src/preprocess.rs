use std::collections::HashSet;

use rv_core::TextPreprocessor;

/// English stopwords, as shipped with the NLTK corpus.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Lowercases, keeps letters only, drops stopwords and singularizes nouns.
#[derive(Debug, Clone)]
pub struct BasicPreprocessor {
    stopwords: HashSet<String>,
}

impl Default for BasicPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicPreprocessor {
    pub fn new() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter().copied())
    }

    pub fn with_stopwords<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            stopwords: words.into_iter().map(str::to_string).collect(),
        }
    }
}

impl TextPreprocessor for BasicPreprocessor {
    fn preprocess(&self, text: &str) -> String {
        let letters: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect();

        letters
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .map(lemmatize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Reduces a plural noun to its singular form with suffix rules.
pub fn lemmatize(token: &str) -> String {
    if token.len() > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    if token.ends_with("sses") {
        return token[..token.len() - 2].to_string();
    }
    for suffix in ["xes", "ches", "shes"] {
        if token.len() > suffix.len() + 1 && token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    let keeps_s = ["ss", "us", "is"].iter().any(|end| token.ends_with(end));
    if token.len() > 3 && token.ends_with('s') && !keeps_s {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
