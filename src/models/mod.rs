//! Domain models
//!
//! Problems and test cases are read from the problem store; submissions are
//! written to the submission store.

pub mod language;
pub mod problem;
pub mod submission;
pub mod test_case;

pub use language::*;
pub use problem::*;
pub use submission::*;
pub use test_case::*;
