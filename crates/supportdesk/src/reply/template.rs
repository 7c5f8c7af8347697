use super::ReplyGenerator;

/// Offline reply. Deterministic and never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReplier;

impl ReplyGenerator for TemplateReplier {
    fn generate(&self, subject: &str, _body: &str) -> String {
        format!(
            "Hello,\n\nThanks for reaching out about \"{}\". We apologize for the trouble. \
Our team is looking into this and will get back to you shortly with next steps.\n\n\
Best regards,\nSupport Team",
            subject
        )
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
