use std::sync::Arc;

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::storage::{SnapshotStorage, StorageError};
use crate::errors::AppError;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// A record kept in a [`Collection`].
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, also the suffix of the snapshot key.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn condominium_id(&self) -> Option<Uuid> {
        None
    }

    fn user_id(&self) -> Option<Uuid> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Offset-slices `items`; `page` is 1-based and both arguments are
    /// clamped to at least 1.
    pub fn slice(items: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let total = items.len();
        let data = items
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();
        Page {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Owner scoping shared by every collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    pub condominium_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl OwnerFilter {
    pub fn matches<T: Entity>(&self, item: &T) -> bool {
        let condo_ok = self
            .condominium_id
            .map_or(true, |id| item.condominium_id() == Some(id));
        let user_ok = self.user_id.map_or(true, |id| item.user_id() == Some(id));
        condo_ok && user_ok
    }
}

pub struct Collection<T: Entity> {
    key: String,
    items: RwLock<Vec<T>>,
    storage: Arc<dyn SnapshotStorage>,
}

impl<T: Entity> Collection<T> {
    /// Reads the collection back from its snapshot; a missing key is an
    /// empty collection.
    pub async fn load(
        storage: Arc<dyn SnapshotStorage>,
        namespace: &str,
    ) -> Result<Self, StorageError> {
        let key = format!("{}:{}", namespace, T::COLLECTION);
        let items: Vec<T> = match storage.load(&key).await? {
            Some(blob) => serde_json::from_str(&blob).map_err(|source| StorageError::Malformed {
                key: key.clone(),
                source,
            })?,
            None => Vec::new(),
        };
        debug!("loaded {} {} from '{}'", items.len(), T::COLLECTION, key);
        Ok(Collection {
            key,
            items: RwLock::new(items),
            storage,
        })
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn get(&self, id: Uuid) -> Result<T, AppError> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(T::COLLECTION, id))
    }

    pub async fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        self.items.read().await.iter().find(|item| pred(item)).cloned()
    }

    pub async fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| pred(item))
            .cloned()
            .collect()
    }

    pub async fn list(&self, filter: &OwnerFilter, page: usize, limit: usize) -> Page<T> {
        Page::slice(self.filter(|item| filter.matches(item)).await, page, limit)
    }

    /// Builds an entity from a JSON object payload, assigning a fresh id.
    pub async fn create(&self, payload: Value) -> Result<T, AppError> {
        let Value::Object(mut fields) = payload else {
            return Err(AppError::validation(format!(
                "{} payload must be a JSON object",
                T::COLLECTION
            )));
        };
        fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        let entity: T = serde_json::from_value(Value::Object(fields))
            .map_err(|err| AppError::validation(format!("invalid {}: {}", T::COLLECTION, err)))?;
        self.insert(entity).await
    }

    pub async fn insert(&self, entity: T) -> Result<T, AppError> {
        self.insert_checked(entity, |_| Ok(())).await
    }

    /// Runs `check` against the current contents and appends `entity` only
    /// if it passes; both happen under one write lock.
    pub async fn insert_checked(
        &self,
        entity: T,
        check: impl FnOnce(&[T]) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        let mut items = self.items.write().await;
        check(&items)?;
        let mut next = items.clone();
        next.push(entity.clone());
        self.persist(&next).await?;
        *items = next;
        Ok(entity)
    }

    /// Applies `change` to a copy of the record with `id`; `change` also
    /// sees the current contents. The copy only replaces the stored record
    /// after the snapshot is saved.
    pub async fn modify(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut T, &[T]) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| AppError::not_found(T::COLLECTION, id))?;
        let mut next = items.clone();
        change(&mut next[pos], &items)?;
        if next[pos].id() != id {
            return Err(AppError::validation("id cannot be changed"));
        }
        let updated = next[pos].clone();
        self.persist(&next).await?;
        *items = next;
        Ok(updated)
    }

    /// JSON merge of `patch` into the record with `id`.
    pub async fn update(&self, id: Uuid, patch: Value) -> Result<T, AppError> {
        self.update_checked(id, patch, |_, _| Ok(())).await
    }

    /// Like [`Collection::update`], but `check` sees the merged record and
    /// the current contents under the same write lock.
    pub async fn update_checked(
        &self,
        id: Uuid,
        patch: Value,
        check: impl FnOnce(&T, &[T]) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        let Value::Object(patch) = patch else {
            return Err(AppError::validation("patch must be a JSON object"));
        };
        self.modify(id, |item, existing| {
            let mut merged = serde_json::to_value(&*item).map_err(|_| AppError::Internal)?;
            if let Value::Object(fields) = &mut merged {
                for (field, value) in patch {
                    fields.insert(field, value);
                }
            }
            *item = serde_json::from_value(merged).map_err(|err| {
                AppError::validation(format!("invalid {} patch: {}", T::COLLECTION, err))
            })?;
            check(item, existing)
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<T, AppError> {
        let mut items = self.items.write().await;
        let pos = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| AppError::not_found(T::COLLECTION, id))?;
        let mut next = items.clone();
        let removed = next.remove(pos);
        self.persist(&next).await?;
        *items = next;
        Ok(removed)
    }

    async fn persist(&self, items: &[T]) -> Result<(), AppError> {
        let blob = serde_json::to_string(items).map_err(|_| AppError::Internal)?;
        self.storage.save(&self.key, &blob).await?;
        Ok(())
    }
}
