//! Code execution and grading engine
//!
//! Signature parsing feeds harness generation; the generated program runs in
//! a sandbox once per test case and the grader folds the outputs into a
//! report.

pub mod container;
pub mod grader;
pub mod harness;
pub mod languages;
pub mod sandbox;
pub mod signature;

pub use container::ContainerSandbox;
pub use grader::{CaseOutcome, GradedResult, HiddenSummary, ValidationReport};
pub use harness::{HarnessRequest, generate_harness};
pub use sandbox::{ExecutionResult, Sandbox};
