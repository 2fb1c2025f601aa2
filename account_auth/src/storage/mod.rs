mod cache_store;
mod data_store;
mod errors;
mod types;

pub async fn init() -> Result<(), StorageError> {
    GENERIC_CACHE_STORE.read().await.init().await?;
    let _ = &*GENERIC_DATA_STORE;

    Ok(())
}

pub(crate) use cache_store::GENERIC_CACHE_STORE;
pub(crate) use data_store::{DB_TABLE_PREFIX, GENERIC_DATA_STORE};
pub use errors::StorageError;
pub(crate) use types::CacheData;
