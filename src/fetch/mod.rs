pub mod error;
pub mod loader;
pub mod reshape;

use crate::fetch::error::FetchError;
use crate::types::reading::ReadingBatch;
use std::future::Future;

/// Something that can produce the latest [`ReadingBatch`] on demand.
///
/// [`loader::HumidityClient`] is the production source; the refresh loop only depends
/// on this trait.
pub trait ReadingSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<ReadingBatch, FetchError>> + Send;
}
