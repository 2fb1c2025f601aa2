use serde::{Deserialize, Serialize};

/// Data stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct CacheData {
    pub value: String,
}
