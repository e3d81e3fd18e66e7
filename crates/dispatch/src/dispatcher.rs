//! The authorized dispatcher.

use policy::{Decision, IdentityProfile, RoleGate};
use serde_json::json;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::connector::{Connector, ToolSession};
use crate::error::{Error, Result};

/// Tool invoked on every dispatch.
const MATERIAL_SPECS_TOOL: &str = "get_material_specs";

/// Material every dispatch asks about.
// The caller's query is accepted and logged but does not select the tool or
// its arguments. TODO: route the query to a tool choice once the host
// exposes more than one lookup.
const DEFAULT_MATERIAL: &str = "Steel";

/// User-visible message for a failed role check.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized for engineering tool execution.";

/// Terminal result of a dispatch that did not error.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The role check failed. A normal outcome, not an error; no session was
    /// opened.
    Denied { reason: String },
    /// The tool call succeeded.
    Completed { analysis: String },
}

impl Outcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, Outcome::Denied { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Denied { .. } => f.write_str(UNAUTHORIZED_MESSAGE),
            Outcome::Completed { analysis } => f.write_str(analysis),
        }
    }
}

/// Gate-checks an identity, then performs exactly one tool call against a
/// freshly opened session.
///
/// Stateless across invocations; every call is independent. Concurrent calls
/// each get their own session.
pub struct Dispatcher<C> {
    gate: RoleGate,
    connector: C,
}

impl<C: Connector> Dispatcher<C> {
    pub fn new(gate: RoleGate, connector: C) -> Self {
        Self { gate, connector }
    }

    /// Execute one query on behalf of an identity.
    ///
    /// The role is checked first; only an authorized identity causes a
    /// session to be opened. The session is torn down on every exit path
    /// before the result is returned.
    pub async fn execute(&self, identity: &IdentityProfile, query: &str) -> Result<Outcome> {
        identity.validate()?;

        let dispatch_id = Uuid::new_v4();
        let span = info_span!("dispatch", id = %dispatch_id, role = %identity.role);

        async {
            debug!(query, "dispatch requested");

            match self.gate.check(identity) {
                Decision::Deny { reason } => {
                    warn!(%reason, "dispatch denied");
                    return Ok(Outcome::Denied { reason });
                }
                Decision::Allow => {}
            }

            let session = self.connector.connect().await.map_err(Error::connection)?;

            let result = session
                .call_tool(
                    MATERIAL_SPECS_TOOL,
                    Some(json!({ "material_name": DEFAULT_MATERIAL })),
                )
                .await;
            session.close().await;

            let reply = result.map_err(Error::tool_call)?;
            let content = reply
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .collect::<Vec<_>>()
                .join("\n");

            info!("dispatch completed");
            Ok(Outcome::Completed {
                analysis: format!("Expert Analysis: {content}"),
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp::{CallToolResult, ToolContent};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct TransportState {
        connects: usize,
        calls: usize,
        open: usize,
        last_call: Option<(String, Option<Value>)>,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Respond,
        RefuseConnection,
        TimeoutOnConnect,
        FailCall,
    }

    struct MockConnector {
        state: Arc<Mutex<TransportState>>,
        mode: Mode,
    }

    impl MockConnector {
        fn new(mode: Mode) -> (Self, Arc<Mutex<TransportState>>) {
            let state = Arc::new(Mutex::new(TransportState::default()));
            (
                Self {
                    state: state.clone(),
                    mode,
                },
                state,
            )
        }
    }

    struct MockSession {
        state: Arc<Mutex<TransportState>>,
        fail_call: bool,
    }

    impl Connector for MockConnector {
        type Session = MockSession;

        async fn connect(&self) -> mcp::Result<MockSession> {
            let mut state = self.state.lock().unwrap();
            state.connects += 1;
            match self.mode {
                Mode::RefuseConnection => Err(mcp::Error::Spawn(std::io::Error::other(
                    "connection refused",
                ))),
                Mode::TimeoutOnConnect => Err(mcp::Error::Timeout),
                Mode::Respond | Mode::FailCall => {
                    state.open += 1;
                    Ok(MockSession {
                        state: self.state.clone(),
                        fail_call: matches!(self.mode, Mode::FailCall),
                    })
                }
            }
        }
    }

    impl ToolSession for MockSession {
        async fn call_tool(
            &self,
            name: &str,
            arguments: Option<Value>,
        ) -> mcp::Result<CallToolResult> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.last_call = Some((name.to_string(), arguments));
            if self.fail_call {
                return Err(mcp::Error::ToolCallFailed("boom".into()));
            }
            Ok(CallToolResult {
                content: vec![ToolContent::Text {
                    text: "Spec for Steel: Yield Strength 250MPa, Thermal Cond: 50W/mK".into(),
                }],
                is_error: false,
            })
        }

        async fn close(self) {
            self.state.lock().unwrap().open -= 1;
        }
    }

    fn dispatcher(mode: Mode) -> (Dispatcher<MockConnector>, Arc<Mutex<TransportState>>) {
        let (connector, state) = MockConnector::new(mode);
        (Dispatcher::new(RoleGate::default(), connector), state)
    }

    fn senior_engineer() -> IdentityProfile {
        IdentityProfile::new(policy::DEFAULT_REQUIRED_ROLE)
    }

    #[tokio::test]
    async fn unauthorized_role_never_opens_a_session() {
        let (dispatcher, state) = dispatcher(Mode::Respond);
        let identity = IdentityProfile::new("Intern");

        let outcome = dispatcher.execute(&identity, "torque specs?").await.unwrap();

        assert!(outcome.is_denied());
        assert_eq!(outcome.to_string(), UNAUTHORIZED_MESSAGE);
        let state = state.lock().unwrap();
        assert_eq!(state.connects, 0);
        assert_eq!(state.calls, 0);
    }

    #[tokio::test]
    async fn authorized_role_makes_exactly_one_call_on_one_session() {
        let (dispatcher, state) = dispatcher(Mode::Respond);

        let outcome = dispatcher
            .execute(&senior_engineer(), "what can steel take?")
            .await
            .unwrap();

        match outcome {
            Outcome::Completed { analysis } => {
                assert!(analysis.starts_with("Expert Analysis: "));
                assert!(analysis.contains("Yield Strength 250MPa"));
            }
            other => panic!("expected completion, got {other:?}"),
        }

        let state = state.lock().unwrap();
        assert_eq!(state.connects, 1);
        assert_eq!(state.calls, 1);
        let (name, arguments) = state.last_call.clone().unwrap();
        assert_eq!(name, "get_material_specs");
        assert_eq!(arguments.unwrap()["material_name"], "Steel");
    }

    #[tokio::test]
    async fn connection_refusal_surfaces_as_connection_error() {
        let (dispatcher, state) = dispatcher(Mode::RefuseConnection);

        let err = dispatcher
            .execute(&senior_engineer(), "anything")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Connection(_)));
        assert_eq!(state.lock().unwrap().connects, 1);
    }

    #[tokio::test]
    async fn connect_timeout_maps_to_the_timeout_variant() {
        let (dispatcher, _state) = dispatcher(Mode::TimeoutOnConnect);

        let err = dispatcher
            .execute(&senior_engineer(), "anything")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn call_failure_propagates_and_still_closes_the_session() {
        let (dispatcher, state) = dispatcher(Mode::FailCall);

        let err = dispatcher
            .execute(&senior_engineer(), "anything")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ToolCall(_)));
        assert_eq!(state.lock().unwrap().open, 0);
    }

    #[tokio::test]
    async fn no_session_remains_open_after_success() {
        let (dispatcher, state) = dispatcher(Mode::Respond);

        dispatcher
            .execute(&senior_engineer(), "anything")
            .await
            .unwrap();

        assert_eq!(state.lock().unwrap().open, 0);
    }

    #[tokio::test]
    async fn empty_role_is_an_input_error_not_a_denial() {
        let (dispatcher, state) = dispatcher(Mode::Respond);
        let identity = IdentityProfile::new("");

        let err = dispatcher.execute(&identity, "anything").await.unwrap_err();

        assert!(matches!(err, Error::InvalidIdentity(_)));
        assert_eq!(state.lock().unwrap().connects, 0);
    }
}
