//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The cash repositories run their mutating operations inside
//! one database transaction each; the locked session fetch in
//! [`CashSessionRepository::resolve`] is the only concurrency primitive.

pub mod audit;
pub mod closing;
pub mod error;
pub mod opening;
pub mod order_guard;
pub mod rates;
pub mod session;

pub use audit::{AuditInput, AuditOutcome, CashAuditRepository};
pub use closing::{CashClosingRepository, CloseInput, ClosingFilter, ClosingOutcome};
pub use error::CashError;
pub use opening::{CashOpeningRepository, OpenSessionInput, OpenedSession};
pub use order_guard::OrderSessionGuard;
pub use rates::CurrencyRateRepository;
pub use session::{CashSessionRepository, NewLedgerEntry};
