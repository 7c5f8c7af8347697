//! Admission filter plus classification: raw batch in, enriched batch out.
//!
//! Nothing here touches the store or the network.

use tracing::{debug, info, info_span};

use crate::classifier::{self, is_support_subject};
use crate::email::{EnrichedEmail, RawEmail, SentDate, Status, WorkflowWrite};
use crate::sanitize;

/// Drops emails whose subject carries no support keyword and enriches the
/// rest. Survivors keep their input order.
pub fn process_and_enrich(raw: Vec<RawEmail>) -> Vec<EnrichedEmail> {
    let _span = info_span!("process_and_enrich", batch_size = raw.len()).entered();

    let total = raw.len();
    let enriched: Vec<EnrichedEmail> = raw
        .into_iter()
        .filter(|email| {
            let admitted = is_support_subject(&email.subject);
            if !admitted {
                debug!(
                    sender = %sanitize::redact_sender(&email.sender),
                    sender_hash = %sanitize::hash_sender(&email.sender),
                    subject = %sanitize::truncate_subject(&email.subject, 40),
                    "Subject has no support keyword, dropping"
                );
            }
            admitted
        })
        .map(|email| enrich_one(&email))
        .collect();

    info!(
        read = total,
        admitted = enriched.len(),
        dropped = total - enriched.len(),
        "Batch enriched"
    );

    enriched
}

/// Classifies one email without applying the admission filter.
pub fn enrich_one(email: &RawEmail) -> EnrichedEmail {
    let classification = classifier::classify(&email.subject, &email.body);

    EnrichedEmail {
        sender: email.sender.clone(),
        subject: email.subject.clone(),
        body: email.body.clone(),
        sent_date: SentDate::parse(&email.sent_date),
        priority: classification.priority,
        sentiment: classification.sentiment,
        topics: non_empty(classification.topics),
        extracted_emails: non_empty(classification.extracted_emails),
        extracted_phones: non_empty(classification.extracted_phones),
        ai_reply: None,
        status: Status::Pending,
        workflow: WorkflowWrite::InitialOnly,
    }
}

fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{Priority, Sentiment};

    #[test]
    fn test_admission_filter_keeps_order() {
        let raw = vec![
            RawEmail::new("a@x.com", "Support needed", "b", ""),
            RawEmail::new("b@x.com", "Hello", "b", ""),
            RawEmail::new("c@x.com", "HELP!", "b", ""),
        ];
        let enriched = process_and_enrich(raw);
        let senders: Vec<&str> = enriched.iter().map(|e| e.sender.as_str()).collect();
        assert_eq!(senders, vec!["a@x.com", "c@x.com"]);
    }

    #[test]
    fn test_all_filtered_gives_empty_batch() {
        let raw = vec![
            RawEmail::new("a@x.com", "Newsletter", "b", ""),
            RawEmail::new("b@x.com", "Invoice attached", "b", ""),
        ];
        assert!(process_and_enrich(raw).is_empty());
    }

    #[test]
    fn test_empty_batch() {
        assert!(process_and_enrich(Vec::new()).is_empty());
    }

    #[test]
    fn test_enrich_one_fields() {
        let email = RawEmail::new(
            "jane@example.com",
            "Urgent request: cannot access account",
            "I am locked out. Reach me at jane.alt@example.org or +1 (555) 123-4567.",
            "2024-03-01 09:30:00",
        );
        let enriched = enrich_one(&email);

        assert_eq!(enriched.priority, Priority::Urgent);
        assert_eq!(enriched.sentiment, Sentiment::Negative);
        assert_eq!(
            enriched.extracted_emails,
            Some(vec!["jane.alt@example.org".to_string()])
        );
        assert_eq!(enriched.extracted_phones, Some(vec!["+15551234567".to_string()]));
        assert!(enriched
            .topics
            .as_ref()
            .is_some_and(|t| t.contains(&"Login/Access".to_string())));
        assert!(matches!(enriched.sent_date, Some(SentDate::Parsed(_))));
        assert_eq!(enriched.ai_reply, None);
        assert_eq!(enriched.status, Status::Pending);
        assert_eq!(enriched.workflow, WorkflowWrite::InitialOnly);
    }

    #[test]
    fn test_enrich_one_empty_derivations_are_absent() {
        let enriched = enrich_one(&RawEmail::new("a@x.com", "Query", "Thanks", "not a date"));
        assert_eq!(enriched.topics, None);
        assert_eq!(enriched.extracted_emails, None);
        assert_eq!(enriched.extracted_phones, None);
        assert_eq!(
            enriched.sent_date,
            Some(SentDate::Unparsed("not a date".to_string()))
        );
    }

    #[test]
    fn test_enrichment_is_deterministic() {
        let raw = vec![RawEmail::new(
            "a@x.com",
            "Billing query",
            "I was charged twice, very frustrated",
            "2024-01-01",
        )];
        assert_eq!(process_and_enrich(raw.clone()), process_and_enrich(raw));
    }
}
