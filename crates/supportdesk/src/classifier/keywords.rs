//! Fixed keyword tables. All entries are lower-case and matched as substrings.

/// Subject keywords that admit a record into the pipeline.
pub const SUBJECT_KEYWORDS: &[&str] = &["support", "query", "request", "help"];

/// Checked before [`POSITIVE_KEYWORDS`]; a hit here wins.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "unable",
    "cannot",
    "can't",
    "error",
    "down",
    "inaccessible",
    "blocked",
    "urgent",
    "failure",
    "problem",
    "frustrat",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "thank you",
    "thanks",
    "appreciate",
    "great",
    "good",
    "excellent",
];

pub const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "asap",
    "as soon as possible",
    "critical",
    "emergency",
    "inaccessible",
    "cannot access",
    "can't access",
    "unable to",
    "locked out",
    "not working",
    "down",
    "outage",
    "blocked",
    "reset link",
    "charged twice",
    "billing error",
    "error",
];

/// A topic label and the keywords that select it.
pub struct TopicPattern {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

/// Topic labels in reporting order.
pub const TOPICS: &[TopicPattern] = &[
    TopicPattern {
        label: "Account Verification",
        keywords: &[
            "verify",
            "verification",
            "confirm my account",
            "confirmation email",
            "activate",
            "activation",
        ],
    },
    TopicPattern {
        label: "Login/Access",
        keywords: &[
            "login",
            "log in",
            "log-in",
            "sign in",
            "signin",
            "password",
            "reset link",
            "locked out",
            "access",
        ],
    },
    TopicPattern {
        label: "Billing/Pricing",
        keywords: &[
            "billing",
            "invoice",
            "charged",
            "refund",
            "payment",
            "pricing",
            "price",
            "subscription",
        ],
    },
    TopicPattern {
        label: "Downtime/Outage",
        keywords: &[
            "down",
            "outage",
            "inaccessible",
            "unavailable",
            "not loading",
            "server error",
        ],
    },
    TopicPattern {
        label: "Integrations/API",
        keywords: &[
            "api",
            "integration",
            "integrate",
            "webhook",
            "sdk",
            "third-party",
            "third party",
            "crm",
        ],
    },
];
