pub mod context;
pub mod history;
pub mod request;
pub mod session;
pub mod states;

pub use context::{extract_params, ShowcaseContext, ShowcaseSnapshot};
pub use history::History;
pub use request::{StepRequest, IF_MODIFIED_SINCE};
pub use session::{ShowcaseSession, ShowcaseTransport};
pub use states::{ShowcaseState, SubmissionOutcome};
