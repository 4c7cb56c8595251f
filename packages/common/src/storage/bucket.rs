use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// A named partition of the blob store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Products,
    Gallery,
    Contacts,
    Promotions,
    Logos,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Products,
        Bucket::Gallery,
        Bucket::Contacts,
        Bucket::Promotions,
        Bucket::Logos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Products => "products",
            Bucket::Gallery => "gallery",
            Bucket::Contacts => "contacts",
            Bucket::Promotions => "promotions",
            Bucket::Logos => "logos",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| StorageError::UnknownBucket(s.to_string()))
    }
}
