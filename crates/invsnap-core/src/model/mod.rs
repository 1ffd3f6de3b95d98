pub mod index;
pub mod item;
pub mod quantity;
pub mod report;
pub mod snapshot;

pub use index::{IndexEntry, REPORTS_DIR, SNAPSHOTS_DIR};
pub use item::Item;
pub use quantity::{Quantity, QuantityError};
pub use report::{ChangeEntry, ItemChanges, Report, ReportCounts, ReportMeta, ReportTotals};
pub use snapshot::{format_timestamp, Snapshot, SnapshotMeta};
