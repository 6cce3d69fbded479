pub mod collection;
pub mod event;
pub mod storage;
pub mod user;

use std::sync::Arc;

use log::{info, warn};

pub use collection::{Collection, Entity, OwnerFilter, Page};
use storage::{FileStorage, MemoryStorage, PgStorage, SnapshotStorage, StorageError};

use crate::{
    config::{Config, StorageKind},
    models::{
        Bill, CalendarEvent, CondoDocument, Condominium, MarketplaceItem, Poll, SupportTicket,
        User, Visitor,
    },
};

/// Every collection of the application, loaded from one snapshot backend.
pub struct Store {
    pub users: Collection<User>,
    pub condominiums: Collection<Condominium>,
    pub events: Collection<CalendarEvent>,
    pub bills: Collection<Bill>,
    pub visitors: Collection<Visitor>,
    pub marketplace: Collection<MarketplaceItem>,
    pub polls: Collection<Poll>,
    pub tickets: Collection<SupportTicket>,
    pub documents: Collection<CondoDocument>,
}

impl Store {
    pub async fn open(
        storage: Arc<dyn SnapshotStorage>,
        namespace: &str,
    ) -> Result<Self, StorageError> {
        let store = Store {
            users: Collection::load(storage.clone(), namespace).await?,
            condominiums: Collection::load(storage.clone(), namespace).await?,
            events: Collection::load(storage.clone(), namespace).await?,
            bills: Collection::load(storage.clone(), namespace).await?,
            visitors: Collection::load(storage.clone(), namespace).await?,
            marketplace: Collection::load(storage.clone(), namespace).await?,
            polls: Collection::load(storage.clone(), namespace).await?,
            tickets: Collection::load(storage.clone(), namespace).await?,
            documents: Collection::load(storage, namespace).await?,
        };
        info!(
            "store '{}' opened: {} users, {} condominiums, {} events",
            namespace,
            store.users.len().await,
            store.condominiums.len().await,
            store.events.len().await
        );
        Ok(store)
    }

    /// Empty store over a fresh [`MemoryStorage`].
    pub async fn in_memory() -> Result<Self, StorageError> {
        Store::open(Arc::new(MemoryStorage::new()), "condo").await
    }
}

/// Picks the snapshot backend named by the configuration.
pub async fn init_storage(config: &Config) -> Result<Arc<dyn SnapshotStorage>, StorageError> {
    match &config.storage {
        StorageKind::Memory => {
            warn!("using in-memory snapshots, data is lost on exit");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageKind::File(dir) => Ok(Arc::new(FileStorage::open(dir).await?)),
        StorageKind::Postgres(db_url) => {
            warn!("database url: {}", db_url);
            Ok(Arc::new(PgStorage::connect(db_url).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn reopened_store_reads_back_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn SnapshotStorage> =
            Arc::new(FileStorage::open(dir.path()).await.unwrap());
        let store = Store::open(storage.clone(), "condo").await.unwrap();
        let condo = store
            .condominiums
            .insert(Condominium {
                id: Uuid::new_v4(),
                name: "Residencial Aurora".into(),
                address: "Rua das Flores, 100".into(),
                resources: vec!["Churrasqueira".into()],
                syndic_id: None,
            })
            .await
            .unwrap();
        drop(store);

        let reopened = Store::open(storage, "condo").await.unwrap();
        assert_eq!(reopened.condominiums.get(condo.id()).await.unwrap(), condo);
        assert!(reopened.events.is_empty().await);
    }
}
