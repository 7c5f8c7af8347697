//! Reply drafting for support emails.
//!
//! [`ReplyGenerator`] is the only thing the pipeline sees. Which
//! implementation backs it is decided once in [`from_config`].

pub mod openai;
pub mod template;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::schema::{ReplyConfig, ReplyProvider};

pub use openai::{OpenAiReplier, ReplyError};
pub use template::TemplateReplier;

/// Drafts a reply for one email. Never fails: implementations turn their
/// own errors into a visible fallback text.
pub trait ReplyGenerator: Send + Sync {
    fn generate(&self, subject: &str, body: &str) -> String;

    fn name(&self) -> &'static str;
}

pub type SharedReplyGenerator = Arc<dyn ReplyGenerator>;

/// Builds the generator selected by `config.provider`.
///
/// `Auto` and `OpenAi` both need a resolvable API key; without one the
/// offline template is used and no request is ever made.
pub fn from_config(config: &ReplyConfig) -> SharedReplyGenerator {
    if config.provider == ReplyProvider::Template {
        info!("Reply generator: offline template");
        return Arc::new(TemplateReplier);
    }

    let api_key = match config.secret_source().resolve_optional() {
        Ok(Some(key)) => key,
        Ok(None) => {
            if config.provider == ReplyProvider::OpenAi {
                warn!("OpenAI reply provider selected but no API key resolved, using template");
            } else {
                info!("No API key configured, using offline reply template");
            }
            return Arc::new(TemplateReplier);
        }
        Err(e) => {
            warn!(error = %e, "Failed to resolve API key, using offline reply template");
            return Arc::new(TemplateReplier);
        }
    };

    match OpenAiReplier::new(config, api_key) {
        Ok(replier) => {
            info!(model = %config.model, "Reply generator: OpenAI chat completions");
            Arc::new(replier)
        }
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client, using offline reply template");
            Arc::new(TemplateReplier)
        }
    }
}

/// Breaks up chat-template control tokens so customer text stays data.
pub(crate) fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}

pub(crate) fn build_prompt(subject: &str, body: &str) -> String {
    format!(
        "You are a helpful customer support agent. Write a concise, empathetic, and professional \
reply to the following customer email. Keep it actionable and ask for any missing info needed \
to resolve the issue.\n\nSubject: {subject}\n\nMessage:\n{body}\n\nReply:",
        subject = sanitize_for_prompt(subject),
        body = sanitize_for_prompt(body),
    )
}
