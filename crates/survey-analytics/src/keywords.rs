//! Keyword frequency over comment text.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use survey_core::defaults::{KEYWORD_LIMIT, KEYWORD_MAX_IGNORED_LEN, STOP_WORDS};

/// A word and the number of times it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

static NON_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z\s]").expect("keyword pattern is valid"));

/// Lower-case `text`, strip everything but ASCII letters and whitespace, and
/// split into words. Stop words and short tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_LETTERS.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|w| w.len() > KEYWORD_MAX_IGNORED_LEN && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Top [`KEYWORD_LIMIT`] words across `texts`, most frequent first.
/// Ties keep the order in which words were first seen.
pub fn top_keywords<'a, I>(texts: I) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    top_keywords_limited(texts, KEYWORD_LIMIT)
}

pub fn top_keywords_limited<'a, I>(texts: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for text in texts {
        for word in tokenize(text) {
            match index.get(&word) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(word.clone(), counts.len());
                    counts.push(KeywordCount { word, count: 1 });
                }
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_digits() {
        assert_eq!(
            tokenize("Wifi-nya LAMBAT sekali!! 24 jam"),
            vec!["wifinya", "lambat", "sekali", "jam"]
        );
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        assert_eq!(tokenize("saya dan AC di kelas yang panas"), vec!["kelas", "panas"]);
    }

    #[test]
    fn test_tokenize_removes_non_ascii_letters() {
        assert_eq!(tokenize("café naïve"), vec!["caf", "nave"]);
    }

    #[test]
    fn test_top_keywords_orders_by_count_then_first_seen() {
        let texts = ["parkir sempit", "wifi lambat", "parkir mahal", "wifi mati"];
        let top = top_keywords(texts.iter().copied());

        let words: Vec<_> = top.iter().map(|k| (k.word.as_str(), k.count)).collect();
        assert_eq!(
            words,
            vec![
                ("parkir", 2),
                ("wifi", 2),
                ("sempit", 1),
                ("lambat", 1),
                ("mahal", 1),
                ("mati", 1)
            ]
        );
    }

    #[test]
    fn test_top_keywords_truncates() {
        let text = (0..30)
            .map(|i| format!("kata{}", "x".repeat(i)))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(top_keywords([text.as_str()]).len(), KEYWORD_LIMIT);
        assert_eq!(top_keywords_limited([text.as_str()], 3).len(), 3);
    }

    #[test]
    fn test_top_keywords_empty() {
        assert!(top_keywords(std::iter::empty()).is_empty());
    }
}
