//! Word-frequency summary over free-text review comments.

use crate::types::TermFrequency;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOP_N: usize = 10;

/// Tokens shorter than this many characters are ignored.
const MIN_TOKEN_LEN: usize = 3;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "it", "its", "this", "that", "these", "those", "i", "you", "he", "she", "we",
        "they", "me", "my", "our", "your", "their", "them", "his", "her", "what", "which", "who",
        "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most",
        "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
        "very", "just", "also", "now", "here", "there", "then", "once", "if", "while",
        "because", "until", "about", "into", "through", "during", "before", "after", "above",
        "below", "between", "under", "again", "further", "any", "am", "being", "get", "got",
        "really", "dont", "didnt", "wasnt", "isnt", "im", "ive",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased, punctuation-free tokens that survive the length and
/// stopword filters.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if word.chars().count() < MIN_TOKEN_LEN || STOP_WORDS.contains(word.as_str()) {
            None
        } else {
            Some(word)
        }
    })
}

/// The `top_n` most frequent terms across `comments`, most frequent first.
/// Ties keep the order in which the terms first appeared.
pub fn summarize<S: AsRef<str>>(comments: &[S], top_n: usize) -> Vec<TermFrequency> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TermFrequency> = Vec::new();

    for comment in comments {
        for term in tokens(comment.as_ref()) {
            match index.get(&term) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(term.clone(), counts.len());
                    counts.push(TermFrequency { term, count: 1 });
                }
            }
        }
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_nothing() {
        let comments: Vec<String> = Vec::new();
        assert!(summarize(&comments, 10).is_empty());
        assert!(summarize(&["", "   "], 10).is_empty());
    }

    #[test]
    fn punctuation_and_case_are_normalised() {
        let top = summarize(&["Staff!! were GREAT.", "great staff, great bar"], 3);
        assert_eq!(
            top,
            vec![
                TermFrequency {
                    term: "great".to_string(),
                    count: 3
                },
                TermFrequency {
                    term: "staff".to_string(),
                    count: 2
                },
                TermFrequency {
                    term: "bar".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn short_tokens_and_stopwords_are_dropped() {
        let top = summarize(&["It was ok and the wifi is so so"], 10);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["wifi"]);
    }

    #[test]
    fn ties_follow_first_occurrence() {
        let top = summarize(&["location breakfast", "shower location breakfast shower"], 10);
        let terms: Vec<&str> = top.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["location", "breakfast", "shower"]);
    }

    #[test]
    fn output_is_deterministic_and_truncated() {
        let comments = vec![
            "noisy dorm but friendly staff",
            "friendly staff, clean kitchen",
            "kitchen was clean, dorm noisy",
        ];
        let a = summarize(&comments, 4);
        let b = summarize(&comments, 4);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }
}
