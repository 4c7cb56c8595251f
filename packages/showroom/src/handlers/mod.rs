pub mod auth;
pub mod category;
pub mod contact;
pub mod draft;
pub mod gallery;
pub mod maintenance;
pub mod product;
pub mod promotion;
pub mod slide;
pub mod video;
pub mod website_image;

use common::storage::Bucket;

use crate::assets::{AssetLifecycle, RecordStore};
use crate::state::AppState;

/// Key prefixes of generated blob names, per record kind.
pub(crate) mod prefix {
    pub const PROMOTION: &str = "promotion";
    pub const PRODUCT: &str = "product";
    pub const CONTACT: &str = "qr";
    pub const GALLERY: &str = "gallery";
    pub const SLIDE: &str = "slide";
    pub const DRAFT: &str = "draft";
}

/// Lifecycle manager for `records` in `bucket`, bound to the shared blob store
/// and the configured upload limit.
pub(crate) fn lifecycle<'a, S: RecordStore>(
    state: &'a AppState,
    records: &'a S,
    bucket: Bucket,
    key_prefix: &'static str,
) -> AssetLifecycle<'a, S> {
    AssetLifecycle::new(state.blob_store.as_ref(), records, bucket, key_prefix)
        .with_max_upload_size(state.config.storage.max_upload_size)
}
