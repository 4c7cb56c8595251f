//! Pairs blob storage with the records that reference it.

pub mod cascade;
pub mod lifecycle;
pub mod record;
pub mod sweep;
pub mod tables;

#[cfg(test)]
pub(crate) mod testing;

pub use cascade::{CascadeFailure, CascadeReport, CategoryStore, FailureStage, delete_category};
pub use lifecycle::{
    AssetError, AssetLifecycle, Cleanup, abandon_draft_upload, release, spawn_release, stage_upload,
};
pub use record::{AssetRecord, RecordError, RecordStore};
pub use sweep::{SweepReport, sweep_bucket};
