//! Meeting lifecycle types.

pub mod status;

pub use status::{ProcessingStatus, ACTION_ITEM_PENDING};
