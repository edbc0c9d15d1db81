//! Incremental search and faceted filtering over a legislative bill list.
//!
//! A [`FilterController`] owns the bill collection for a browsing session.
//! Free-text input is debounced, topic/sponsor/status selections apply
//! immediately, results are memoized per filter state and exposed through a
//! "load more" window.

pub mod cache;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod names;
pub mod paginator;
pub mod source;
pub mod types;

pub use cache::{CacheKey, CacheStats, FilteredResult, ResultCache};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use controller::{FacetOptions, FilterController, ResultsView};
pub use debounce::{Debouncer, TaskHandle};
pub use error::{Error, Result};
pub use filter::{retain_matching, BillFilter, Facet, FilterState};
pub use names::meaningful_name;
pub use paginator::Paginator;
pub use source::{bills_from_value, BillSource};
pub use types::{Bill, BillRecord, BillStatus, SharedBill, Sponsor};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{EngineConfig, EngineConfigBuilder};
    pub use crate::controller::{FilterController, ResultsView};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{Facet, FilterState};
    pub use crate::source::BillSource;
    pub use crate::types::{Bill, BillRecord, BillStatus, Sponsor};
}
