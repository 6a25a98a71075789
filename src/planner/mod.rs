//! The bulk date planner: recurring-date generation, row editing, validation
//! and reconciliation of created dates with the rows that produced them.

pub mod flyer;
pub mod legacy;
pub mod matching;
pub mod recurrence;
pub mod session;
pub mod store;
pub mod validator;

pub use flyer::{FlyerReport, FlyerStatus, FlyerTarget};
pub use matching::{CompositeKeyMatcher, MatchOutcome, RecordMatcher, SubmittedRow};
pub use recurrence::{RecurrenceRequest, generate_weekly_rows};
pub use session::{MappedTarget, PlannerSession, SubmitReport, SubmitTicket};
pub use store::PlannerRowStore;
pub use validator::{ValidationErrors, validate_rows};
