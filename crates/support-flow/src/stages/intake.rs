//! Ticket intake: raw message → structured ticket.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::contracts::{SupportMessage, Ticket};
use crate::errors::FlowError;
use crate::extract::extract_or;
use crate::gateway::CompletionGateway;
use crate::prompts;

/// Turns an unstructured incident report into a [`Ticket`].
///
/// Single gateway attempt — the fallback IS the retry strategy. A parse
/// failure yields a conservative ticket (P3, escalate, truncated summary)
/// rather than blocking the flow.
pub struct IntakeStage {
    gateway: Arc<dyn CompletionGateway>,
}

impl IntakeStage {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    pub async fn run(&self, msg: &SupportMessage) -> Result<Ticket, FlowError> {
        let raw = self
            .gateway
            .generate(prompts::INTAKE_PREAMBLE, &prompts::intake_request(msg))
            .await?;

        let fallback = Ticket::fallback_for(&msg.message);
        let mut ticket = extract_or(&raw, fallback);
        if ticket.clarifying_questions.len() > crate::contracts::MAX_CLARIFYING_QUESTIONS {
            warn!(
                count = ticket.clarifying_questions.len(),
                "dropping excess clarifying questions"
            );
        }
        ticket.normalize();

        debug!(
            severity = %ticket.severity,
            needs_escalation = ticket.needs_escalation,
            "ticket extracted"
        );
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::Severity;
    use crate::errors::GatewayError;
    use crate::gateway::MockCompletionGateway;

    fn stage(mock: MockCompletionGateway) -> IntakeStage {
        IntakeStage::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_valid_response_becomes_ticket() {
        let mut mock = MockCompletionGateway::new();
        mock.expect_generate().returning(|_, _| {
            Ok(r#"{"summary": "DB down", "severity": "P1",
                   "needsEscalation": true, "clarifyingQuestions": []}"#
                .into())
        });

        let ticket = stage(mock)
            .run(&SupportMessage::new("the database is down"))
            .await
            .unwrap();
        assert_eq!(ticket.severity, Severity::P1);
        assert!(ticket.needs_escalation);
    }

    #[tokio::test]
    async fn test_prose_response_degrades_to_conservative_fallback() {
        let mut mock = MockCompletionGateway::new();
        mock.expect_generate()
            .returning(|_, _| Ok("I'm sorry, I can't produce JSON today.".into()));

        let msg = SupportMessage::new("printer jammed again");
        let ticket = stage(mock).run(&msg).await.unwrap();
        assert_eq!(ticket, Ticket::fallback_for("printer jammed again"));
        assert!(ticket.needs_escalation);
        assert_eq!(ticket.severity, Severity::P3);
    }

    #[tokio::test]
    async fn test_excess_clarifying_questions_are_capped() {
        let mut mock = MockCompletionGateway::new();
        mock.expect_generate().returning(|_, _| {
            Ok(r#"{"summary": "s", "severity": "P2", "needsEscalation": false,
                   "clarifyingQuestions": ["a", "b", "c", "d", "e"]}"#
                .into())
        });

        let ticket = stage(mock)
            .run(&SupportMessage::new("msg"))
            .await
            .unwrap();
        assert_eq!(ticket.clarifying_questions, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut mock = MockCompletionGateway::new();
        mock.expect_generate()
            .returning(|_, _| Err(GatewayError::Http { status: 503 }));

        let err = stage(mock)
            .run(&SupportMessage::new("msg"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Gateway(_)));
    }
}
