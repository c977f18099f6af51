//! Shared contracts for the Polyvox feature crates

mod error;
mod google;
pub mod operation;

pub use error::{ErrorBody, ErrorDetails, HttpError};
pub use google::{GoogleApiError, GoogleCredentials};
pub use operation::{PollOutcome, PollSchedule, WaitError, wait_for};
pub use tokio_util::sync::CancellationToken;
