/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public edutask adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    Backoff,
    ClientConfig,
    EdutaskClient,
    EdutaskError,
    PollPolicy,
    RemoteTask,
    Result,
};

// Re-export all types
pub use types::*;

// Callers hold the token that stops a poll loop
pub use tokio_util::sync::CancellationToken;
