//! Helpers for keeping customer data out of span attributes.
//!
//! Log output may be shared when debugging a batch, so sender addresses are
//! reduced to their domain or a hash before they are recorded.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Reduces a sender to its domain.
///
/// - `Jane Doe <jane@example.com>` → `*@example.com`
/// - `support@corp.io` → `*@corp.io`
/// - `no address` → `<unknown>`
pub fn redact_sender(sender: &str) -> String {
    let address = match (sender.rfind('<'), sender.rfind('>')) {
        (Some(start), Some(end)) if start < end => &sender[start + 1..end],
        _ => sender,
    };

    match address.trim().rsplit_once('@') {
        Some((_, domain)) if !domain.is_empty() => format!("*@{}", domain),
        _ => "<unknown>".to_string(),
    }
}

/// Short deterministic hash for correlating log lines about one sender.
pub fn hash_sender(sender: &str) -> String {
    let mut hasher = DefaultHasher::new();
    sender.trim().to_lowercase().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Truncates a subject for span fields, on a char boundary.
pub fn truncate_subject(subject: &str, max_chars: usize) -> String {
    if subject.chars().count() <= max_chars {
        return subject.to_string();
    }
    let mut out: String = subject.chars().take(max_chars).collect();
    out.push('…');
    out
}
