//! Service modules for the records review scan
//!
//! - Remote data access (eBird client, retrying wrapper)
//! - Review rule evaluation and scan orchestration
//! - Checkpoint, policy document and result file handling

pub mod checkpoint_store;
pub mod data_access;
pub mod ebird_client;
pub mod policy_loader;
pub mod report_writer;
pub mod review_rules;
pub mod scan_orchestrator;

pub use checkpoint_store::{CheckpointStore, ScanCheckpoint};
pub use data_access::{ObservationFilters, ObservationSource, RetryingDataAccess, SourceError};
pub use ebird_client::EbirdClient;
pub use policy_loader::{validate_policy, PolicyDocument, PolicyWarning};
pub use report_writer::{report_path, write_report};
pub use scan_orchestrator::{ScanOrchestrator, ScanWindow};
