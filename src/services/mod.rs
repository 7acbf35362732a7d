//! Business logic services

pub mod execute_service;

pub use execute_service::{ExecuteService, Submission};
