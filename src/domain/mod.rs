//! Domain layer: payment records, validation strategies and the state machine.
//!
//! Nothing in here performs I/O. Persistence is reached only through the
//! [`ports::PaymentRepository`] trait.

pub mod payment;
pub mod ports;
pub mod strategy;
pub mod transition;
