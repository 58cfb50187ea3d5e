//! End-to-end flow properties with a scripted gateway and recording sink.
//!
//! The gateway returns pre-canned responses in call order and records
//! every (system, user) prompt pair, so tests can assert both on the
//! assembled result and on what was actually sent to the model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use support_flow::contracts::{
    AssistantNotes, ExpertRouting, Severity, SupportMessage, Ticket,
};
use support_flow::directory::default_directory;
use support_flow::errors::{FlowError, GatewayError};
use support_flow::flow::FlowController;
use support_flow::gateway::CompletionGateway;
use support_flow::knowledge::KnowledgeSink;
use support_flow::meeting::SUGGESTED_TIME_HINT;
use support_flow::prompts::REDACTION_CLAUSE;

/// Gateway that replays scripted responses and records prompts.
struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    fn new(responses: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::EmptyCompletion))
    }
}

/// Sink that forwards every record to a channel for assertion.
struct ChannelSink {
    tx: mpsc::UnboundedSender<(Ticket, Option<AssistantNotes>)>,
}

impl ChannelSink {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(Ticket, Option<AssistantNotes>)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl KnowledgeSink for ChannelSink {
    async fn record(&self, ticket: &Ticket, notes: Option<&AssistantNotes>) -> anyhow::Result<()> {
        self.tx.send((ticket.clone(), notes.cloned()))?;
        Ok(())
    }
}

fn ok(s: &str) -> Result<String, GatewayError> {
    Ok(s.to_string())
}

fn controller(
    gateway: Arc<ScriptedGateway>,
    sink: Arc<ChannelSink>,
) -> FlowController {
    FlowController::new(gateway, default_directory(), sink)
}

const SELF_SERVICE_TICKET: &str = r#"{"summary": "password reset hint",
    "severity": "P3", "needsEscalation": false, "clarifyingQuestions": []}"#;

const P1_TICKET: &str = r#"{"summary": "production outage",
    "severity": "P1", "needsEscalation": true, "clarifyingQuestions": []}"#;

const ROUTING_RESPONSE: &str = r#"{"primaryExpert": "sap-hana-high-availability-oncall",
    "backupExperts": ["sap-basis-core"], "rationale": "replication expertise"}"#;

const NOTES_RESPONSE: &str = r#"{"summary": "failover completed",
    "decisions": ["promote secondary"], "actionItems": ["post-mortem Friday"]}"#;

#[tokio::test]
async fn self_service_result_has_only_ticket() {
    let gateway = ScriptedGateway::new(vec![ok(SELF_SERVICE_TICKET)]);
    let (sink, mut rx) = ChannelSink::new();
    let result = controller(Arc::clone(&gateway), sink)
        .run(&SupportMessage::new("how do I reset my password?"), "")
        .await
        .unwrap();

    assert!(!result.is_escalated());
    assert!(result.expert_routing.is_none());
    assert!(result.swarm_room.is_none());
    assert!(result.assistant_notes.is_none());
    assert_eq!(result.ticket.severity, Severity::P3);

    // Only the intake call happened.
    assert_eq!(gateway.calls().len(), 1);

    // Nothing reaches the knowledge sink on the self-service path.
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn escalated_result_populates_all_stages() {
    let gateway = ScriptedGateway::new(vec![
        ok(P1_TICKET),
        ok(ROUTING_RESPONSE),
        ok(NOTES_RESPONSE),
    ]);
    let (sink, mut rx) = ChannelSink::new();
    let result = controller(Arc::clone(&gateway), sink)
        .run(
            &SupportMessage::new("server down, critical outage"),
            "we promoted the secondary and traffic recovered",
        )
        .await
        .unwrap();

    assert!(result.is_escalated());
    let routing = result.expert_routing.unwrap();
    assert_eq!(routing.primary_expert, "sap-hana-high-availability-oncall");

    let room = result.swarm_room.unwrap();
    assert_eq!(
        room.invitees,
        vec!["sap-hana-high-availability-oncall", "sap-basis-core"]
    );
    assert_eq!(room.suggested_time, SUGGESTED_TIME_HINT);

    let notes = result.assistant_notes.unwrap();
    assert_eq!(notes.decisions, vec!["promote secondary"]);

    // The fire-and-forget knowledge write lands with ticket + notes.
    let (ticket, recorded_notes) = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("sink write timed out")
        .expect("sink channel closed");
    assert_eq!(ticket.summary, "production outage");
    assert_eq!(recorded_notes.unwrap().summary, "failover completed");
}

#[tokio::test]
async fn critical_outage_scenario_routes_within_directory() {
    // Routing stage returns prose: routing must be the exact fallback,
    // and the flow still completes end to end.
    let gateway = ScriptedGateway::new(vec![
        ok(P1_TICKET),
        ok("Hmm, tough one. Maybe the networking team?"),
        ok(NOTES_RESPONSE),
    ]);
    let (sink, _rx) = ChannelSink::new();
    let result = controller(gateway, sink)
        .run(
            &SupportMessage::new("server down, critical outage"),
            "transcript",
        )
        .await
        .unwrap();

    assert!(matches!(
        result.ticket.severity,
        Severity::P1 | Severity::P2
    ));
    let routing = result.expert_routing.unwrap();
    assert_eq!(routing, ExpertRouting::fallback());
    assert_eq!(routing.primary_expert, "sap-basis-core");
}

#[tokio::test]
async fn intake_garbage_degrades_but_still_escalates() {
    // Unparseable intake output produces the conservative fallback
    // ticket, which escalates (needs_escalation defaults to true).
    let gateway = ScriptedGateway::new(vec![
        ok("no json at all"),
        ok(ROUTING_RESPONSE),
        ok(NOTES_RESPONSE),
    ]);
    let (sink, _rx) = ChannelSink::new();
    let message = "everything is broken and nobody knows why";
    let result = controller(gateway, sink)
        .run(&SupportMessage::new(message), "transcript")
        .await
        .unwrap();

    assert_eq!(result.ticket, Ticket::fallback_for(message));
    assert!(result.is_escalated());
}

#[tokio::test]
async fn summarize_garbage_yields_fallback_notes() {
    let gateway = ScriptedGateway::new(vec![
        ok(P1_TICKET),
        ok(ROUTING_RESPONSE),
        ok("``` not even json fences done right"),
    ]);
    let (sink, _rx) = ChannelSink::new();
    let result = controller(gateway, sink)
        .run(&SupportMessage::new("outage"), "transcript")
        .await
        .unwrap();

    assert_eq!(result.assistant_notes.unwrap(), AssistantNotes::fallback());
}

#[tokio::test]
async fn info_down_flag_is_embedded_in_summary_instruction() {
    let gateway = ScriptedGateway::new(vec![
        ok(P1_TICKET),
        ok(ROUTING_RESPONSE),
        ok(NOTES_RESPONSE),
    ]);
    let (sink, _rx) = ChannelSink::new();
    let msg = SupportMessage::new("outage at a customer site").with_info_down(true);
    controller(Arc::clone(&gateway), sink)
        .run(&msg, "transcript mentioning Acme Corp")
        .await
        .unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    let (summary_system, summary_user) = &calls[2];
    assert!(summary_system.contains(REDACTION_CLAUSE));
    assert_eq!(summary_user, "transcript mentioning Acme Corp");

    // The intake and routing instructions never carry the clause.
    assert!(!calls[0].0.contains(REDACTION_CLAUSE));
    assert!(!calls[1].0.contains(REDACTION_CLAUSE));
}

#[tokio::test]
async fn transport_failure_at_intake_propagates_as_flow_error() {
    // Transport failures are NOT absorbed into fallback tickets — only
    // content failures are.
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Http { status: 503 })]);
    let (sink, _rx) = ChannelSink::new();
    let err = controller(gateway, sink)
        .run(&SupportMessage::new("outage"), "")
        .await
        .unwrap_err();

    match err {
        FlowError::Gateway(e) => assert!(e.is_transport()),
        other => panic!("expected gateway error, got {other}"),
    }
}

#[tokio::test]
async fn transport_failure_mid_flow_propagates() {
    let gateway = ScriptedGateway::new(vec![
        ok(P1_TICKET),
        Err(GatewayError::Cancelled),
    ]);
    let (sink, mut rx) = ChannelSink::new();
    let err = controller(gateway, sink)
        .run(&SupportMessage::new("outage"), "")
        .await
        .unwrap_err();

    assert!(!err.is_retriable());
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err(), "aborted flow must not record knowledge");
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    // Two flows through one controller; each consumes its own scripted
    // responses without interference on the shared directory.
    let gateway = ScriptedGateway::new(vec![
        ok(SELF_SERVICE_TICKET),
        ok(SELF_SERVICE_TICKET),
    ]);
    let (sink, _rx) = ChannelSink::new();
    let controller = Arc::new(controller(gateway, sink));

    let a = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.run(&SupportMessage::new("one"), "").await })
    };
    let b = {
        let c = Arc::clone(&controller);
        tokio::spawn(async move { c.run(&SupportMessage::new("two"), "").await })
    };

    assert!(!a.await.unwrap().unwrap().is_escalated());
    assert!(!b.await.unwrap().unwrap().is_escalated());
}
