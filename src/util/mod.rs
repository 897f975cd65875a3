//! Utility modules: retry and timeout for backend calls.

pub mod retry;
pub mod timeout;
