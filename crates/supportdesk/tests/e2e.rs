//! End-to-end runs: CSV on disk through enrichment, the store and export.
//!
//! Adding a case means adding an entry to `TEST_CASES`.

mod common;

use common::{CsvBuilder, TestHarness};

use supportdesk::db::stats_repo;
use supportdesk::email::{Priority, Status};
use supportdesk::export;

struct TestCase {
    name: &'static str,
    header: &'static str,
    rows: &'static [&'static [&'static str]],
    expected_admitted: usize,
    expected_urgent: u64,
    expected_topics: &'static [&'static str],
}

const TEST_CASES: &[TestCase] = &[
    TestCase {
        name: "standard_columns",
        header: "sender,subject,body,sent_date",
        rows: &[
            &[
                "alice@example.com",
                "Support: cannot access account",
                "Locked out since this morning, call +1 415 555 0100",
                "2025-08-18 09:30:00",
            ],
            &["bob@example.com", "Lunch plans", "Pizza?", "2025-08-18 12:00:00"],
        ],
        expected_admitted: 1,
        expected_urgent: 1,
        expected_topics: &["Login/Access"],
    },
    TestCase {
        name: "alias_columns",
        header: "from,subject,message,date",
        rows: &[&[
            "carol@example.com",
            "Billing query",
            "Thanks, the invoice looks good",
            "2025-08-19",
        ]],
        expected_admitted: 1,
        expected_urgent: 0,
        expected_topics: &["Billing/Pricing"],
    },
    TestCase {
        name: "missing_body_column",
        header: "sender,subject",
        rows: &[&["dave@example.com", "Help with API keys"]],
        expected_admitted: 1,
        expected_urgent: 0,
        expected_topics: &["Integrations/API"],
    },
    TestCase {
        name: "nothing_admitted",
        header: "sender,subject,body,sent_date",
        rows: &[&["eve@example.com", "Newsletter", "Read all about it", ""]],
        expected_admitted: 0,
        expected_urgent: 0,
        expected_topics: &[],
    },
];

fn run_test_case(case: &TestCase) {
    let harness = TestHarness::new();
    let csv = case
        .rows
        .iter()
        .fold(CsvBuilder::with_header(case.header), |b, row| b.row(row))
        .build();
    let path = harness.write_file("inbox.csv", &csv);

    let report = harness
        .pipeline
        .ingest_csv(&path)
        .unwrap_or_else(|e| panic!("[{}] ingest failed: {}", case.name, e));

    assert_eq!(report.read, case.rows.len(), "[{}] read", case.name);
    assert_eq!(report.admitted, case.expected_admitted, "[{}] admitted", case.name);
    assert_eq!(report.inserted, case.expected_admitted, "[{}] inserted", case.name);

    let stats = stats_repo::queue_stats(harness.db()).unwrap();
    assert_eq!(stats.urgent, case.expected_urgent, "[{}] urgent", case.name);

    let records = harness.records();
    for topic in case.expected_topics {
        assert!(
            records
                .iter()
                .any(|r| r.topics.as_ref().is_some_and(|t| t.iter().any(|x| x == topic))),
            "[{}] expected topic {}",
            case.name,
            topic
        );
    }
}

#[test]
fn run_all_test_cases() {
    for case in TEST_CASES {
        run_test_case(case);
    }
}

#[test]
fn ingest_reply_resolve_export() {
    let harness = TestHarness::new();
    let csv = CsvBuilder::new()
        .row(&[
            "alice@example.com",
            "Urgent request: service down",
            "Outage since 9am. Escalate to ops@example.com",
            "2025-08-18 09:30:00",
        ])
        .row(&[
            "bob@example.com",
            "Query about pricing",
            "What does the pro plan cost?",
            "2025-08-17 10:00:00",
        ])
        .build();
    let path = harness.write_file("inbox.csv", &csv);
    harness.pipeline.ingest_csv(&path).unwrap();

    let records = harness.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].priority, Priority::Urgent);

    let reply = harness.pipeline.generate_reply(records[0].id).unwrap();
    assert!(reply.contains("Urgent request: service down"));
    harness.pipeline.resolve(records[0].id).unwrap();

    let stats = stats_repo::queue_stats(harness.db()).unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.pending, 1);

    let out = harness.temp_path().join("processed_emails.csv");
    export::write_csv_path(&out, &harness.records()).unwrap();
    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[11], "status");
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][11], "Resolved");
    assert_eq!(&rows[0][8], r#"["ops@example.com"]"#);
    assert_eq!(&rows[1][10], "");

    // Re-ingesting the same file must not disturb the workflow state.
    harness.pipeline.ingest_csv(&path).unwrap();
    let first = harness.record(records[0].id);
    assert_eq!(first.status, Status::Resolved);
    assert_eq!(first.ai_reply.as_deref(), Some(reply.as_str()));
}

#[test]
fn latin1_bytes_do_not_drop_a_support_email() {
    let harness = TestHarness::new();
    let path = harness.temp_path().join("latin1.csv");
    std::fs::write(
        &path,
        b"sender,subject,body,sent_date\n\
a@x.com,Support needed,caf\xE9 broken,2025-08-18\n\
b@x.com,Help,ok,2025-08-18\n",
    )
    .unwrap();

    let report = harness.pipeline.ingest_csv(&path).unwrap();
    assert_eq!(report.read, 2);
    assert_eq!(report.admitted, 2);

    let senders: Vec<String> = harness.records().into_iter().map(|r| r.sender).collect();
    assert_eq!(senders, vec!["a@x.com", "b@x.com"]);
}
