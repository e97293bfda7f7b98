//! HTTP transport for showcase wizards.
//!
//! [`HttpTransport`] posts step answers with `reqwest` and classifies responses with the
//! rules in [`protocol`]:
//!
//! ```text
//! 300 + Location → next step        200 {"params"} → completed
//! 400 + form     → invalid params   304            → not modified
//! ```

pub mod error;
pub mod protocol;
pub mod transport;

pub use error::TransportError;
pub use transport::HttpTransport;
