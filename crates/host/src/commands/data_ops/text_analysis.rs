// crates/host/src/commands/data_ops/text_analysis.rs

//! Keyword, statistics, sentiment and extractive-summary analysis over plain
//! text. Everything here is lexical; no models are involved.

use std::collections::{HashMap, HashSet};

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const MODULE: CommandModule = CommandModule {
    name: "text_analysis",
    module_path: module_path!(),
    load,
};

const POSITIVE_THRESHOLD: f64 = 0.3;
const PREVIEW_CHARS: usize = 100;

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid regex"));
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "if", "because", "as", "what", "i", "me", "my",
        "myself", "we", "our", "ours", "ourselves", "you", "your", "yours", "yourself",
        "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself", "it", "its",
        "itself", "they", "them", "their", "theirs", "themselves", "this", "that", "these",
        "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "would", "should", "could", "ought", "i'm",
        "you're", "he's", "she's", "it's", "we're", "they're", "i've", "you've", "we've",
        "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd", "i'll", "you'll", "he'll",
        "she'll", "we'll", "they'll", "isn't", "aren't", "wasn't", "weren't", "hasn't", "haven't",
        "hadn't", "doesn't", "don't", "didn't", "won't", "wouldn't", "shan't", "shouldn't",
        "can't", "cannot", "couldn't", "mustn't", "let's", "that's", "who's", "what's", "here's",
        "there's", "when's", "where's", "why's", "how's", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    ]
    .into_iter()
    .collect()
});

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "great", "excellent", "positive", "wonderful", "fantastic", "amazing", "love",
        "happy", "joy", "success", "successful", "beautiful", "best", "better", "outstanding",
        "perfect", "impressive", "awesome", "superb", "brilliant", "delightful", "pleasant",
        "remarkable", "exceptional", "marvelous", "terrific", "enjoyable", "favorable", "nice",
        "satisfying", "valuable", "beneficial", "effective", "efficient", "reliable", "helpful",
        "useful", "innovative", "authentic", "genuine",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "poor", "negative", "awful", "horrible", "hate", "dislike", "sad",
        "failure", "worse", "worst", "disappointing", "disappoints", "disappointed", "difficult",
        "hard", "problem", "issue", "concern", "trouble", "fail", "fails", "failed", "failing",
        "inadequate", "inferior", "mediocre", "unsatisfactory", "useless", "ineffective",
        "inefficient", "unreliable", "harmful", "damage", "dangerous", "risky", "severe",
        "serious", "critical", "wrong", "error", "mistake", "fault", "flawed", "broken",
        "defective", "frustrating", "annoying", "irritating",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AnalysisType {
    Keywords,
    Statistics,
    Sentiment,
    Summary,
}

#[derive(Deserialize)]
struct Args {
    text: String,
    #[serde(default = "all_analyses")]
    analysis_types: Vec<AnalysisType>,
    #[serde(default = "default_max_keywords")]
    max_keywords: usize,
    #[serde(default = "default_summary_ratio")]
    summary_ratio: f64,
}

fn all_analyses() -> Vec<AnalysisType> {
    vec![
        AnalysisType::Keywords,
        AnalysisType::Statistics,
        AnalysisType::Sentiment,
        AnalysisType::Summary,
    ]
}

fn default_max_keywords() -> usize {
    10
}

fn default_summary_ratio() -> f64 {
    0.2
}

/// Lowercased, tag- and punctuation-free words of `text`.
fn words_of(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let untagged = TAGS.replace_all(&lowered, "");
    let cleaned = PUNCTUATION.replace_all(&untagged, "");
    WORD.find_iter(&cleaned)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn sentences_of(text: &str) -> Vec<&str> {
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Word counts ordered by frequency, ties kept in first-seen order.
fn ranked_counts<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for word in words {
        match index.get(word) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

fn statistics(text: &str, words: &[String], sentences: &[&str]) -> Value {
    let word_count = words.len();
    let sentence_count = sentences.len();
    let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    let unique: HashSet<&String> = words.iter().collect();

    json!({
        "word_count": word_count,
        "sentence_count": sentence_count,
        "paragraph_count": text.matches("\n\n").count() + 1,
        "average_word_length": round_to(total_chars as f64 / word_count.max(1) as f64, 1),
        "average_sentence_length": round_to(word_count as f64 / sentence_count.max(1) as f64, 1),
        "unique_word_count": unique.len(),
    })
}

fn keywords(words: &[String], max_keywords: usize) -> Value {
    let filtered = words
        .iter()
        .map(String::as_str)
        .filter(|w| !STOP_WORDS.contains(*w) && w.chars().count() > 2);
    let top: Vec<Value> = ranked_counts(filtered)
        .into_iter()
        .take(max_keywords)
        .map(|(word, frequency)| json!({ "word": word, "frequency": frequency }))
        .collect();

    json!({ "count": top.len(), "top_keywords": top })
}

fn sentiment(words: &[String]) -> Value {
    let positive = words
        .iter()
        .filter(|w| POSITIVE_WORDS.contains(w.as_str()))
        .count();
    let negative = words
        .iter()
        .filter(|w| NEGATIVE_WORDS.contains(w.as_str()))
        .count();

    let total = positive + negative;
    let score = if total > 0 {
        (positive as f64 - negative as f64) / total as f64
    } else {
        0.0
    };
    let category = if score > POSITIVE_THRESHOLD {
        "positive"
    } else if score < -POSITIVE_THRESHOLD {
        "negative"
    } else {
        "neutral"
    };

    json!({
        "score": round_to(score, 2),
        "category": category,
        "positive_word_count": positive,
        "negative_word_count": negative,
    })
}

/// Extractive summary: the highest scoring sentences, in their original order.
fn summarize(text: &str, words: &[String], sentences: &[&str], ratio: f64) -> Value {
    let ratio = ratio.clamp(0.1, 0.5);
    let wanted = ((sentences.len() as f64 * ratio).ceil() as usize).max(1);

    let summary = if sentences.len() <= 3 {
        sentences[0].to_string()
    } else {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for word in words {
            *frequency.entry(word.as_str()).or_default() += 1;
        }

        let mut scored: Vec<(usize, f64)> = Vec::new();
        for (idx, sentence) in sentences.iter().enumerate() {
            let sentence_words = words_of(sentence);
            // Fragments under three words are never picked.
            if sentence_words.len() < 3 {
                continue;
            }
            let score: usize = sentence_words
                .iter()
                .filter(|w| !STOP_WORDS.contains(w.as_str()))
                .map(|w| frequency.get(w.as_str()).copied().unwrap_or(0))
                .sum();
            scored.push((idx, score as f64 / sentence_words.len() as f64));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut chosen: Vec<usize> = scored.into_iter().take(wanted).map(|(i, _)| i).collect();
        chosen.sort_unstable();
        chosen
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" ")
    };

    let length = summary.chars().count();
    json!({
        "text": summary,
        "length": length,
        "ratio": round_to(length as f64 / text.chars().count() as f64, 2),
    })
}

fn text_analysis(args: Args) -> CommandResult {
    if args.text.trim().is_empty() {
        return Err(CommandError::invalid("Empty text provided for analysis"));
    }
    let text = args.text.as_str();
    let char_count = text.chars().count();

    let mut results = Map::new();
    results.insert("text_length".into(), json!(char_count));
    let preview = if char_count > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    };
    results.insert("text_preview".into(), json!(preview));

    let words = words_of(text);
    let sentences = sentences_of(text);
    let wants = |kind: AnalysisType| args.analysis_types.contains(&kind);

    if wants(AnalysisType::Statistics) {
        results.insert("statistics".into(), statistics(text, &words, &sentences));
    }
    if wants(AnalysisType::Keywords) {
        results.insert("keywords".into(), keywords(&words, args.max_keywords));
    }
    if wants(AnalysisType::Sentiment) {
        results.insert("sentiment".into(), sentiment(&words));
    }
    if wants(AnalysisType::Summary) && !sentences.is_empty() {
        results.insert(
            "summary".into(),
            summarize(text, &words, &sentences, args.summary_ratio),
        );
    }

    Ok(Value::Object(results))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "text_analysis",
        typed(text_analysis),
        json!({
            "type": "function",
            "function": {
                "name": "text_analysis",
                "description": "Analyze text to extract keywords, statistics, sentiment, and generate summaries",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "text": { "type": "string", "description": "The text to analyze" },
                        "analysis_types": {
                            "type": "array",
                            "description": "Types of analysis to perform",
                            "items": {
                                "type": "string",
                                "enum": ["keywords", "statistics", "sentiment", "summary"]
                            },
                            "default": ["keywords", "statistics", "sentiment", "summary"]
                        },
                        "max_keywords": {
                            "type": "integer",
                            "description": "Maximum number of keywords to extract",
                            "default": 10
                        },
                        "summary_ratio": {
                            "type": "number",
                            "description": "Ratio of original text length for summary (0.1-0.5)",
                            "default": 0.2
                        }
                    },
                    "required": ["text"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_commands_core::command::args;

    fn analyze(value: Value) -> Value {
        typed(text_analysis)(&args(value))
    }

    #[test]
    fn test_statistics() {
        let out = analyze(json!({
            "text": "The cat sat. The dog ran!\n\nBirds fly?",
            "analysis_types": ["statistics"]
        }));
        let stats = &out["statistics"];
        assert_eq!(stats["word_count"], json!(8));
        assert_eq!(stats["sentence_count"], json!(3));
        assert_eq!(stats["paragraph_count"], json!(2));
        assert_eq!(stats["unique_word_count"], json!(7));
        assert!(out.get("keywords").is_none());
    }

    #[test]
    fn test_keywords_skip_stop_words_and_short_words() {
        let out = analyze(json!({
            "text": "Rust is fast. Rust is safe. Cargo builds Rust. It is ok.",
            "analysis_types": ["keywords"],
            "max_keywords": 2
        }));
        let keywords = &out["keywords"];
        assert_eq!(keywords["count"], json!(2));
        assert_eq!(keywords["top_keywords"][0], json!({ "word": "rust", "frequency": 3 }));
        assert_eq!(keywords["top_keywords"][1], json!({ "word": "fast", "frequency": 1 }));
    }

    #[test]
    fn test_sentiment_categories() {
        let positive = analyze(json!({
            "text": "A great and wonderful result, truly excellent.",
            "analysis_types": ["sentiment"]
        }));
        assert_eq!(positive["sentiment"]["category"], json!("positive"));
        assert_eq!(positive["sentiment"]["score"], json!(1.0));

        let mixed = analyze(json!({
            "text": "Good food but a terrible wait.",
            "analysis_types": ["sentiment"]
        }));
        assert_eq!(mixed["sentiment"]["category"], json!("neutral"));
        assert_eq!(mixed["sentiment"]["score"], json!(0.0));

        let negative = analyze(json!({
            "text": "Broken build, failed tests.",
            "analysis_types": ["sentiment"]
        }));
        assert_eq!(negative["sentiment"]["category"], json!("negative"));
    }

    #[test]
    fn test_short_text_summary_is_first_sentence() {
        let out = analyze(json!({
            "text": "First point here. Second point there.",
            "analysis_types": ["summary"]
        }));
        assert_eq!(out["summary"]["text"], json!("First point here"));
    }

    #[test]
    fn test_long_text_summary_keeps_original_order() {
        let text = "Rust compilers check ownership rules. \
                    Weather was mild today. \
                    Ownership rules make Rust memory safe. \
                    Lunch was pasta. \
                    Rust ownership rules prevent data races.";
        let out = analyze(json!({
            "text": text,
            "analysis_types": ["summary"],
            "summary_ratio": 0.3
        }));
        assert_eq!(
            out["summary"]["text"],
            json!("Rust compilers check ownership rules Ownership rules make Rust memory safe")
        );
    }

    #[test]
    fn test_empty_text_rejected() {
        let out = analyze(json!({ "text": "   " }));
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error_kind"], json!("invalid_argument"));
    }

    #[test]
    fn test_preview_truncated() {
        let text = "word ".repeat(40);
        let out = analyze(json!({ "text": text, "analysis_types": [] }));
        assert_eq!(out["text_length"], json!(200));
        assert!(out["text_preview"].as_str().unwrap().ends_with("..."));
    }
}
