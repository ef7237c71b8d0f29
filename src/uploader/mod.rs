pub mod client;
pub mod outcome;

pub use client::{IndexRequest, Submission, Submit, Uploader, UrlEntry};
pub use outcome::{FailureReason, SubmitOutcome};
