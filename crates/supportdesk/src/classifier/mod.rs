//! Keyword classification and contact extraction.
//!
//! Every function here is pure: the output depends only on the input text and
//! the static tables in [`keywords`].

pub mod extract;
pub mod keywords;

pub use extract::{extract_emails, extract_phones};

use crate::email::{Priority, Sentiment};

use keywords::{NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS, SUBJECT_KEYWORDS, TOPICS, URGENT_KEYWORDS};

/// Default word budget for [`summarize`].
pub const SUMMARY_WORDS: usize = 20;

/// All derived fields for one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub priority: Priority,
    pub topics: Vec<String>,
    pub extracted_emails: Vec<String>,
    pub extracted_phones: Vec<String>,
}

/// Classifies an email. Topics use subject and body; contact details come from the body.
pub fn classify(subject: &str, body: &str) -> Classification {
    Classification {
        sentiment: classify_sentiment(subject, body),
        priority: classify_priority(subject, body),
        topics: tag_topics(&combined_text(subject, body)),
        extracted_emails: extract_emails(body),
        extracted_phones: extract_phones(body),
    }
}

pub fn classify_sentiment(subject: &str, body: &str) -> Sentiment {
    let text = combined_text(subject, body);
    if contains_any(&text, NEGATIVE_KEYWORDS) {
        Sentiment::Negative
    } else if contains_any(&text, POSITIVE_KEYWORDS) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

pub fn classify_priority(subject: &str, body: &str) -> Priority {
    if contains_any(&combined_text(subject, body), URGENT_KEYWORDS) {
        Priority::Urgent
    } else {
        Priority::NotUrgent
    }
}

/// Returns matching topic labels in table order.
pub fn tag_topics(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|topic| contains_any(&text, topic.keywords))
        .map(|topic| topic.label.to_string())
        .collect()
}

/// Whether a subject passes the admission filter.
pub fn is_support_subject(subject: &str) -> bool {
    contains_any(&subject.to_lowercase(), SUBJECT_KEYWORDS)
}

/// First `max_words` words of `body`, with "..." appended when truncated.
pub fn summarize(body: &str, max_words: usize) -> String {
    let words: Vec<&str> = body.split_whitespace().collect();
    let mut summary = words
        .iter()
        .take(max_words)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > max_words {
        summary.push_str("...");
    }
    summary
}

fn combined_text(subject: &str, body: &str) -> String {
    format!("{} {}", subject, body).to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
