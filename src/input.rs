//! Terminal input: query submissions and the password prompt.

pub mod password;
pub mod query;

pub use password::{apply_key, read_password, KeyOutcome};
pub use query::{read_submission, Submission};
