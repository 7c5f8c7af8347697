//! Contact detail extraction.

use std::sync::LazyLock;

use regex::Regex;

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap());

// Digit groups, each optionally in parens, joined by at most one space or hyphen.
static RE_PHONE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d+\)?(?:[ \-]?\(?\d+\)?)*").unwrap());

static RE_PHONE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d+\)?").unwrap());

const MIN_PHONE_DIGITS: usize = 9;
// E.164 maximum.
const MAX_PHONE_DIGITS: usize = 15;

/// Returns email addresses in first-seen order without duplicates.
pub fn extract_emails(text: &str) -> Vec<String> {
    dedup_ordered(RE_EMAIL.find_iter(text).map(|m| m.as_str().to_string()))
}

/// Returns phone numbers reduced to digits and '+', in first-seen order without duplicates.
pub fn extract_phones(text: &str) -> Vec<String> {
    dedup_ordered(
        RE_PHONE_RUN
            .find_iter(text)
            .flat_map(|run| split_run(run.as_str())),
    )
}

/// Splits a run of digit groups into numbers.
///
/// A new number starts at a parenthesised group (unless it follows a bare
/// `+` country code), after the current number has reached the minimum
/// length, or where appending would exceed [`MAX_PHONE_DIGITS`].
fn split_run(run: &str) -> Vec<String> {
    let mut phones = Vec::new();
    let mut current = String::new();
    let mut groups = 0;

    for group in RE_PHONE_GROUP.find_iter(run).map(|m| m.as_str()) {
        let have = digit_count(&current);
        let after_country_code = groups == 1 && current.starts_with('+');
        let starts_new = groups > 0
            && ((group.starts_with('(') && !after_country_code)
                || have >= MIN_PHONE_DIGITS
                || have + digit_count(group) > MAX_PHONE_DIGITS);

        if starts_new {
            push_phone(&mut phones, &current);
            current.clear();
            groups = 0;
        }
        current.push_str(&normalize_phone(group));
        groups += 1;
    }
    push_phone(&mut phones, &current);
    phones
}

fn push_phone(phones: &mut Vec<String>, candidate: &str) {
    if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digit_count(candidate)) {
        phones.push(candidate.to_string());
    }
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn dedup_ordered(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
