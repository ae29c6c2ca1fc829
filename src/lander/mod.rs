pub mod error;
pub mod submitter;
pub mod transaction;

pub use error::{SubmissionFailure, SubmissionOutcome};
pub use submitter::{SubmissionPolicy, TransactionSubmitter};
