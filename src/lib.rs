//! Payment lifecycle management.
//!
//! Payments move through `REGISTERED -> PAID | FAILED -> ... -> CANCELED`
//! under per-method business rules. The crate is split the usual way:
//!
//! - [`domain`]: records, validation strategies and the state machine
//! - [`application`]: the [`PaymentService`] running one transition per load/save cycle
//! - [`infrastructure`]: repositories (in-memory, JSON file, optional RocksDB)
//! - [`interfaces`]: CSV batch input and listing output

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::service::PaymentService;
pub use domain::payment::{Amount, Payment, PaymentId, PaymentMethod, PaymentState};
pub use error::{PaymentError, Result};
