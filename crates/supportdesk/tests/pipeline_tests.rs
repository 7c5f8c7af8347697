//! Behavioural tests for the enrichment pipeline and the upsert store.

mod common;

use common::{RawEmailBuilder, TestHarness};

use supportdesk::classifier::classify;
use supportdesk::db::{email_repo, DatabaseError, FieldUpdate};
use supportdesk::email::{Priority, Sentiment, Status};
use supportdesk::pipeline::{process_and_enrich, PipelineError};
use supportdesk::reply::{ReplyGenerator, TemplateReplier};

#[test]
fn classification_is_deterministic() {
    let subject = "Urgent: billing error";
    let body = "Charged twice! Reach me at ops@example.com or +44 20 7946 0958. Thank you";
    assert_eq!(classify(subject, body), classify(subject, body));
}

#[test]
fn admission_filter_drops_non_support_subjects() {
    let batch = vec![
        RawEmailBuilder::new().subject("Meeting notes").build(),
        RawEmailBuilder::new()
            .subject("Support Request: login issue")
            .build(),
    ];
    let enriched = process_and_enrich(batch);
    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].subject, "Support Request: login issue");
}

#[test]
fn inaccessible_system_is_urgent() {
    let c = classify(
        "Help",
        "the system is completely inaccessible, please help asap",
    );
    assert_eq!(c.priority, Priority::Urgent);
}

#[test]
fn negative_sentiment_wins_over_positive() {
    let c = classify("Query", "Thank you, but I still get an error");
    assert_eq!(c.sentiment, Sentiment::Negative);
}

#[test]
fn contact_details_are_extracted() {
    let c = classify("Query", "contact me at a.b@example.com or (415) 555-0199");
    assert_eq!(c.extracted_emails, vec!["a.b@example.com".to_string()]);
    assert_eq!(c.extracted_phones, vec!["4155550199".to_string()]);
}

#[test]
fn login_topic_is_tagged() {
    let c = classify("Help", "I can't log in, password reset");
    assert!(c.topics.contains(&"Login/Access".to_string()));
}

#[test]
fn upsert_twice_creates_no_duplicates() {
    let harness = TestHarness::new();
    let batch = vec![
        RawEmailBuilder::new().sender("a@example.com").build(),
        RawEmailBuilder::new()
            .sender("b@example.com")
            .sent_date("")
            .build(),
    ];

    harness.pipeline.ingest_batch(batch.clone()).unwrap();
    let first: Vec<i64> = harness.records().iter().map(|r| r.id).collect();

    let report = harness.pipeline.ingest_batch(batch).unwrap();
    let second: Vec<i64> = harness.records().iter().map(|r| r.id).collect();

    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 2);
    assert_eq!(first, second);
}

#[test]
fn reingest_keeps_existing_reply_and_status() {
    let harness = TestHarness::new();
    let batch = vec![RawEmailBuilder::new().build()];

    harness.pipeline.ingest_batch(batch.clone()).unwrap();
    let id = harness.records()[0].id;
    harness.pipeline.save_reply(id, "X").unwrap();
    harness.pipeline.resolve(id).unwrap();

    harness.pipeline.ingest_batch(batch).unwrap();

    let record = harness.record(id);
    assert_eq!(record.ai_reply.as_deref(), Some("X"));
    assert_eq!(record.status, Status::Resolved);
}

#[test]
fn explicit_null_reply_clears_existing_reply() {
    let harness = TestHarness::new();
    harness
        .pipeline
        .ingest_batch(vec![RawEmailBuilder::new().build()])
        .unwrap();
    let record = harness.records().remove(0);
    harness.pipeline.save_reply(record.id, "X").unwrap();

    let cleared = record.to_enriched().with_workflow(None, Status::Pending);
    email_repo::upsert(harness.db(), &[cleared]).unwrap();

    assert_eq!(harness.record(record.id).ai_reply, None);
}

#[test]
fn reingest_refreshes_derived_fields() {
    let harness = TestHarness::new();
    let calm = RawEmailBuilder::new().body("Just a question").build();
    let angry = RawEmailBuilder::new()
        .body("The dashboard is down and I am frustrated")
        .build();

    harness.pipeline.ingest_batch(vec![calm]).unwrap();
    let before = harness.records().remove(0);
    harness.pipeline.ingest_batch(vec![angry]).unwrap();
    let after = harness.record(before.id);

    assert_eq!(before.priority, Priority::NotUrgent);
    assert_eq!(after.priority, Priority::Urgent);
    assert_eq!(after.sentiment, Sentiment::Negative);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn fallback_reply_mentions_subject() {
    let reply = TemplateReplier.generate("Can't log in", "...");
    assert!(reply.contains("Can't log in"));
}

#[test]
fn update_of_missing_id_is_not_found() {
    let harness = TestHarness::new();
    let err = email_repo::update_fields(harness.db(), 999, &FieldUpdate::reply("x")).unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { id: 999 }));

    let err = harness.pipeline.resolve(999).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Database(DatabaseError::NotFound { id: 999 })
    ));
}

#[test]
fn store_survives_reopen() {
    let harness = TestHarness::new();
    harness
        .pipeline
        .ingest_batch(vec![RawEmailBuilder::new().build()])
        .unwrap();

    let other = harness.reopen();
    assert_eq!(email_repo::count(&other).unwrap(), 1);

    let again = supportdesk::ensure_store(&harness.db_path).unwrap();
    assert_eq!(email_repo::count(&again).unwrap(), 1);
}
