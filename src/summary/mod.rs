//! Summary model: points, canonical form, stored encoding and edit handling.

pub mod canonical;
pub mod editable;
pub mod point;
pub mod sanitize;

pub use canonical::{to_persisted, to_summary, ActionItem, PersistedSummary, SummaryResult};
pub use editable::{ActionField, EditableActionItem, EditableSummary, PointSection};
pub use point::{normalize, SummaryPoint};
pub use sanitize::{clamp_confidence, sanitize_edited_summary};
