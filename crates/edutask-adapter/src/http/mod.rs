/*
[INPUT]:  HTTP client configuration and compute service endpoints
[OUTPUT]: Task acknowledgements, poll outcomes and typed results
[POS]:    HTTP layer - compute service communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod policy;
pub mod poll;
pub mod service;
pub mod submit;
pub mod task;

pub use error::{EdutaskError, Result};
pub use policy::{Backoff, PollPolicy};
pub use task::RemoteTask;

pub use client::{ClientConfig, EdutaskClient};
