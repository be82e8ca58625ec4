//! Application layer orchestrating the payment lifecycle.
//!
//! This module defines the `PaymentService`, which threads an explicitly
//! passed repository through every operation and runs each domain transition
//! inside a single load/save cycle.

pub mod service;
