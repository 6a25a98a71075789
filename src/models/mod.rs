pub mod date;
pub mod row;
pub mod template;

pub use date::{CreatedDateRecord, DatePatch, NewDatePayload, PublicationState};
pub use row::{NewRowRequest, PlannerRow, RowPatch};
pub use template::{DateTemplate, PriceItem, ScheduleItem};
