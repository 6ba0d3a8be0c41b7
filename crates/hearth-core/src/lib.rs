//! hearth-core
//!
//! Budget-period derivation, transaction classification, period aggregation and
//! recurring-series reconciliation. Depends on hearth-domain. No CLI, no terminal I/O,
//! no direct storage interactions beyond the [`storage::HouseholdStore`] seam.

pub mod access;
pub mod aggregation_service;
pub mod classifier;
pub mod error;
pub mod format;
pub mod household_service;
pub mod lifecycle_service;
pub mod period_service;
pub mod reconciliation_service;
pub mod storage;
pub mod time;


pub use access::AccessPolicy;
pub use aggregation_service::*;
pub use classifier::*;
pub use error::CoreError;
pub use format::*;
pub use household_service::HouseholdService;
pub use lifecycle_service::LifecycleService;
pub use period_service::PeriodService;
pub use reconciliation_service::ReconciliationService;
pub use storage::HouseholdStore;
pub use time::Clock;
