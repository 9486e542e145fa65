//! Data models for the records review scan
//!
//! - Regions and region groups (query and grouping unit)
//! - Observations and checklists returned by the remote service
//! - Baseline species list and review policy
//! - Flagged records produced by classification

pub mod flagged_record;
pub mod observation;
pub mod policy;
pub mod region;

pub use flagged_record::{Classification, CountyRecords, FlaggedRecord};
pub use observation::{Checklist, ChecklistEntry, Observation, Taxon};
pub use policy::{BaselineSpeciesList, ReviewPolicy, ReviewRule, Species};
pub use region::{Region, RegionGroup};
