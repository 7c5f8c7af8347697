//! Conversion of raw RFC 822 messages into pipeline input.

use log::debug;
use mail_parser::{Address, Message, MessageParser};

use super::error::{EmailError, Result};
use super::types::RawEmail;

/// Parses a raw message into a [`RawEmail`].
///
/// The body is the concatenation of all text parts. Missing headers become
/// empty strings so the message can still be enriched.
pub fn parse_message(raw_email: &[u8]) -> Result<RawEmail> {
    let message = MessageParser::default()
        .parse(raw_email)
        .ok_or_else(|| EmailError::ParseError("Failed to parse email message".to_string()))?;

    let email = RawEmail {
        sender: format_sender(message.from()),
        subject: message.subject().unwrap_or_default().to_string(),
        body: collect_text_body(&message),
        sent_date: message.date().map(|d| d.to_rfc3339()).unwrap_or_default(),
    };

    debug!(
        "Parsed message subject={:?} body_len={}",
        email.subject,
        email.body.len()
    );

    Ok(email)
}

/// Renders the first From address as `Name <addr>`, or just the address.
fn format_sender(from: Option<&Address<'_>>) -> String {
    let Some(addr) = from.and_then(|a| a.first()) else {
        return String::new();
    };
    match (addr.name(), addr.address()) {
        (Some(name), Some(address)) => format!("{} <{}>", name, address),
        (None, Some(address)) => address.to_string(),
        (Some(name), None) => name.to_string(),
        (None, None) => String::new(),
    }
}

fn collect_text_body(message: &Message<'_>) -> String {
    let parts: Vec<String> = (0..)
        .map_while(|pos| message.body_text(pos))
        .map(|text| text.into_owned())
        .collect();
    parts.join("\n")
}
