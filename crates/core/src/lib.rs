//! Step navigation for server-defined, multi-step payment forms ("showcases").
//!
//! A [`ShowcaseContext`] tracks the step on screen, the steps behind it and the outcome of
//! the last submission. [`ShowcaseSession`] drives a context against any
//! [`ShowcaseTransport`]; the HTTP implementation lives in `showcase-client`.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
    NoopAuditSink,
};
pub use domain::showcase::{PaymentSchema, Showcase};
pub use domain::step::Step;
pub use errors::{ApplicationError, NavigationError};
pub use flows::{
    extract_params, History, ShowcaseContext, ShowcaseSession, ShowcaseSnapshot, ShowcaseState,
    ShowcaseTransport, StepRequest, SubmissionOutcome, IF_MODIFIED_SINCE,
};
