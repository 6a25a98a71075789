pub mod batch_reconciler;
pub mod bulk_patch;
pub mod date_mutations;
pub mod date_queries;
pub mod notifier;

pub use batch_reconciler::BatchReconciler;
pub use bulk_patch::{BulkPatchReport, BulkPatcher};
pub use date_mutations::DateMutations;
pub use date_queries::DateQueries;
pub use notifier::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
