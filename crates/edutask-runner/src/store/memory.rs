/*
[INPUT]:  Store operations from the runner services
[OUTPUT]: Process-local store held behind an async mutex
[POS]:    Persistence layer - default backend for tests and one-shot CLI runs
[UPDATE]: When the Store trait changes
*/

use super::{StoreData, StoreResult, impl_store_for};
use tokio::sync::Mutex;

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<R>(&self, f: impl FnOnce(&StoreData) -> StoreResult<R>) -> StoreResult<R> {
        let data = self.data.lock().await;
        f(&data)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut StoreData) -> StoreResult<R>) -> StoreResult<R> {
        let mut data = self.data.lock().await;
        f(&mut data)
    }
}

impl_store_for!(MemoryStore);
