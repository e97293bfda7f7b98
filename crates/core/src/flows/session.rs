use async_trait::async_trait;
use tracing::{info, warn};

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::showcase::PaymentSchema;
use crate::domain::step::Step;
use crate::errors::ApplicationError;
use crate::flows::context::ShowcaseContext;
use crate::flows::request::StepRequest;
use crate::flows::states::{ShowcaseState, SubmissionOutcome};

/// Executes step requests and classifies the responses.
#[async_trait]
pub trait ShowcaseTransport<S>: Send + Sync
where
    S: Send,
{
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(&self, request: &StepRequest) -> Result<SubmissionOutcome<S>, Self::Error>;
}

/// Drives one context against one transport.
///
/// Every mutating call takes `&mut self`, which keeps at most one submission in flight per
/// session. Dropping a pending `submit` future leaves the context untouched.
pub struct ShowcaseSession<S, T, A> {
    context: ShowcaseContext<S>,
    transport: T,
    sink: A,
    audit: AuditContext,
    annotations: Option<S>,
}

impl<S, T, A> ShowcaseSession<S, T, A>
where
    S: PaymentSchema + Clone + Send,
    T: ShowcaseTransport<S>,
    A: AuditSink,
{
    pub fn new(context: ShowcaseContext<S>, transport: T, sink: A, audit: AuditContext) -> Self {
        Self { context, transport, sink, audit, annotations: None }
    }

    /// Submits the current step and folds the classified response into the context.
    pub async fn submit(&mut self) -> Result<ShowcaseState, ApplicationError> {
        let request = match self.context.create_request() {
            Ok(request) => request,
            Err(error) => {
                self.emit(
                    AuditEvent::new(
                        &self.audit,
                        "showcase.submit_rejected",
                        AuditCategory::Submission,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
                return Err(error.into());
            }
        };

        info!(
            event_name = "showcase.submit.started",
            session_id = %self.audit.session_id,
            correlation_id = %self.audit.correlation_id,
            submit_url = %request.url,
            parameter_count = request.parameters.len(),
            "submitting showcase step"
        );

        let outcome = match self.transport.execute(&request).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    event_name = "showcase.submit.failed",
                    session_id = %self.audit.session_id,
                    correlation_id = %self.audit.correlation_id,
                    submit_url = %request.url,
                    error = %error,
                    "showcase submission failed in transport"
                );
                self.emit(
                    AuditEvent::new(
                        &self.audit,
                        "showcase.submit_failed",
                        AuditCategory::Transport,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("submit_url", request.url.clone())
                    .with_metadata("error", error.to_string()),
                );
                return Err(ApplicationError::Transport(error.to_string()));
            }
        };

        let annotated = match &outcome {
            SubmissionOutcome::InvalidParams { annotated } => annotated.clone(),
            _ => None,
        };
        let state = match self.context.apply_outcome(outcome) {
            Ok(state) => state,
            Err(error) => {
                warn!(
                    event_name = "showcase.submit.rejected",
                    session_id = %self.audit.session_id,
                    correlation_id = %self.audit.correlation_id,
                    submit_url = %request.url,
                    error = %error,
                    "transport outcome could not be applied"
                );
                self.emit(
                    AuditEvent::new(
                        &self.audit,
                        "showcase.submit_rejected",
                        AuditCategory::Submission,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("submit_url", request.url.clone())
                    .with_metadata("error", error.to_string()),
                );
                return Err(error.into());
            }
        };
        self.annotations = annotated;

        let (event_type, audit_outcome) = match state {
            ShowcaseState::HasNextStep => ("showcase.step_advanced", AuditOutcome::Success),
            ShowcaseState::Completed => ("showcase.completed", AuditOutcome::Success),
            ShowcaseState::NotModified => ("showcase.not_modified", AuditOutcome::Success),
            ShowcaseState::InvalidParams => ("showcase.invalid_params", AuditOutcome::Rejected),
            ShowcaseState::Unknown => ("showcase.unknown", AuditOutcome::Failed),
        };
        info!(
            event_name = event_type,
            session_id = %self.audit.session_id,
            correlation_id = %self.audit.correlation_id,
            state = state.as_str(),
            history_size = self.context.history_size(),
            "showcase submission applied"
        );
        self.emit(
            AuditEvent::new(&self.audit, event_type, AuditCategory::Submission, audit_outcome)
                .with_metadata("submitted_url", request.url)
                .with_metadata("state", state.as_str())
                .with_metadata("history_size", self.context.history_size().to_string()),
        );

        Ok(state)
    }

    /// User back action, see [`ShowcaseContext::pop_step`].
    pub fn back(&mut self) -> &Step<S> {
        let undoing = !self.context.params().is_empty();
        let depth = self.context.history_size();
        self.annotations = None;
        self.context.pop_step();

        let event_type = if undoing {
            Some("showcase.completion_undone")
        } else if self.context.history_size() < depth {
            Some("showcase.step_popped")
        } else {
            None
        };
        if let Some(event_type) = event_type {
            info!(
                event_name = event_type,
                session_id = %self.audit.session_id,
                correlation_id = %self.audit.correlation_id,
                history_size = self.context.history_size(),
                "showcase navigated back"
            );
            self.emit(
                AuditEvent::new(
                    &self.audit,
                    event_type,
                    AuditCategory::Navigation,
                    AuditOutcome::Success,
                )
                .with_metadata("history_size", self.context.history_size().to_string()),
            );
        }

        self.context.current_step()
    }

    /// Form returned with error annotations by the last rejected submission.
    pub fn annotations(&self) -> Option<&S> {
        self.annotations.as_ref()
    }

    pub fn context(&self) -> &ShowcaseContext<S> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ShowcaseContext<S> {
        &mut self.context
    }

    pub fn into_context(self) -> ShowcaseContext<S> {
        self.context
    }

    fn emit(&self, event: AuditEvent) {
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use thiserror::Error;

    use super::{ShowcaseSession, ShowcaseTransport};
    use crate::audit::{AuditContext, InMemoryAuditSink, NoopAuditSink};
    use crate::domain::showcase::Showcase;
    use crate::domain::step::Step;
    use crate::errors::{ApplicationError, NavigationError};
    use crate::flows::context::ShowcaseContext;
    use crate::flows::request::StepRequest;
    use crate::flows::states::{ShowcaseState, SubmissionOutcome};

    #[derive(Debug, Error)]
    #[error("scripted transport exhausted")]
    struct Exhausted;

    #[derive(Clone, Default)]
    struct ScriptedTransport {
        outcomes: Arc<Mutex<VecDeque<SubmissionOutcome<Showcase>>>>,
        requests: Arc<Mutex<Vec<StepRequest>>>,
    }

    impl ScriptedTransport {
        fn with(outcomes: Vec<SubmissionOutcome<Showcase>>) -> Self {
            Self { outcomes: Arc::new(Mutex::new(outcomes.into())), ..Self::default() }
        }

        fn requests(&self) -> Vec<StepRequest> {
            self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ShowcaseTransport<Showcase> for ScriptedTransport {
        type Error = Exhausted;

        async fn execute(
            &self,
            request: &StepRequest,
        ) -> Result<SubmissionOutcome<Showcase>, Self::Error> {
            self.requests.lock().map_err(|_| Exhausted)?.push(request.clone());
            self.outcomes.lock().map_err(|_| Exhausted)?.pop_front().ok_or(Exhausted)
        }
    }

    fn session(
        transport: ScriptedTransport,
    ) -> (ShowcaseSession<Showcase, ScriptedTransport, InMemoryAuditSink>, InMemoryAuditSink) {
        let sink = InMemoryAuditSink::default();
        let context = ShowcaseContext::new(
            Showcase::new("A").with_hidden_field("scid", "5551"),
            "https://x/1",
            Utc::now(),
        );
        let session = ShowcaseSession::new(
            context,
            transport,
            sink.clone(),
            AuditContext::new("session-1", "req-1", "test"),
        );
        (session, sink)
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    #[tokio::test]
    async fn walks_forward_to_completion_and_back() {
        let transport = ScriptedTransport::with(vec![
            SubmissionOutcome::NextStep {
                showcase: Showcase::new("B"),
                submit_url: "https://x/2".to_owned(),
            },
            SubmissionOutcome::Completed { params: params(&[("sum", "10")]) },
        ]);
        let (mut session, sink) = session(transport.clone());

        assert_eq!(session.submit().await.expect("first submit"), ShowcaseState::HasNextStep);
        assert_eq!(session.submit().await.expect("second submit"), ShowcaseState::Completed);
        assert_eq!(session.context().params(), &params(&[("sum", "10")]));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://x/1");
        assert_eq!(requests[0].parameters, params(&[("scid", "5551")]));
        assert_eq!(requests[1].url, "https://x/2");

        let current = session.back().clone();
        assert_eq!(current, Step::new(Showcase::new("B"), "https://x/2"));
        assert_eq!(session.context().state(), ShowcaseState::HasNextStep);

        session.back();
        assert_eq!(session.context().history_size(), 0);
        // nothing left, no event
        session.back();

        assert_eq!(
            sink.event_types(),
            vec![
                "showcase.step_advanced".to_owned(),
                "showcase.completed".to_owned(),
                "showcase.completion_undone".to_owned(),
                "showcase.step_popped".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_params_keep_the_step_and_expose_annotations() {
        let mut annotated = Showcase::new("A").with_hidden_field("scid", "5551");
        annotated.error.push(serde_json::json!({ "name": "sum", "alert": "too small" }));
        let transport = ScriptedTransport::with(vec![SubmissionOutcome::InvalidParams {
            annotated: Some(annotated.clone()),
        }]);
        let (mut session, sink) = session(transport);

        let state = session.submit().await.expect("submit");

        assert_eq!(state, ShowcaseState::InvalidParams);
        assert_eq!(session.context().history_size(), 0);
        assert_eq!(session.context().current_step().submit_url.as_deref(), Some("https://x/1"));
        assert_eq!(session.annotations(), Some(&annotated));
        assert_eq!(sink.event_types(), vec!["showcase.invalid_params".to_owned()]);
    }

    #[tokio::test]
    async fn transport_failure_leaves_context_untouched() {
        let (mut session, sink) = session(ScriptedTransport::default());
        let before = session.context().clone();

        let error = session.submit().await.expect_err("transport exhausted");

        assert!(matches!(error, ApplicationError::Transport(_)));
        assert_eq!(session.context(), &before);
        assert_eq!(sink.event_types(), vec!["showcase.submit_failed".to_owned()]);
    }

    #[tokio::test]
    async fn unusable_step_is_rejected_before_the_transport_runs() {
        let transport = ScriptedTransport::with(vec![SubmissionOutcome::NotModified]);
        let sink = InMemoryAuditSink::default();
        let mut session = ShowcaseSession::new(
            ShowcaseContext::<Showcase>::placeholder(ShowcaseState::Unknown),
            transport.clone(),
            sink.clone(),
            AuditContext::new("session-2", "req-2", "test"),
        );

        let error = session.submit().await.expect_err("placeholder cannot submit");

        assert!(matches!(error, ApplicationError::Navigation(NavigationError::InvalidState(_))));
        assert!(transport.requests().is_empty());
        assert_eq!(sink.event_types(), vec!["showcase.submit_rejected".to_owned()]);
    }

    #[tokio::test]
    async fn not_modified_reuses_the_current_step() {
        let transport = ScriptedTransport::with(vec![SubmissionOutcome::NotModified]);
        let mut session = ShowcaseSession::new(
            ShowcaseContext::new(Showcase::new("A"), "https://x/1", Utc::now()),
            transport,
            NoopAuditSink,
            AuditContext::new("session-3", "req-3", "test"),
        );
        let before = session.context().current_step().clone();

        let state = session.submit().await.expect("submit");

        assert_eq!(state, ShowcaseState::NotModified);
        assert_eq!(session.into_context().current_step(), &before);
    }

    #[tokio::test]
    async fn unusable_outcome_keeps_annotations_and_context() {
        let annotated = Showcase::new("A").with_hidden_field("scid", "5551");
        let transport = ScriptedTransport::with(vec![
            SubmissionOutcome::InvalidParams { annotated: Some(annotated.clone()) },
            SubmissionOutcome::Completed { params: BTreeMap::new() },
        ]);
        let (mut session, sink) = session(transport);
        session.submit().await.expect("first submit");
        let before = session.context().clone();

        let error = session.submit().await.expect_err("empty completion is rejected");

        assert!(matches!(
            error,
            ApplicationError::Navigation(NavigationError::InvalidArgument(_))
        ));
        assert_eq!(session.context(), &before);
        assert_eq!(session.annotations(), Some(&annotated));
        assert_eq!(
            sink.event_types(),
            vec!["showcase.invalid_params".to_owned(), "showcase.submit_rejected".to_owned()]
        );
    }
}
