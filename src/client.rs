//! Client-side view of paginated data.
//!
//! [`PagedState`] keeps one page of a collection. Mutations are applied
//! locally right away through an [`OptimisticCommand`], which remembers the
//! slice it replaced so a failed call can put it back exactly.

use std::future::Future;

use async_trait::async_trait;
use log::debug;
use uuid::Uuid;

use crate::{
    db::{Entity, OwnerFilter, Page},
    errors::AppError,
    service::{records, records::Record, AppState},
};

#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, page: usize, limit: usize) -> Result<Page<T>, AppError>;
}

/// Pages of a plain record collection, read through the service layer.
pub struct RecordSource<'a> {
    pub state: &'a AppState,
    pub filter: OwnerFilter,
}

#[async_trait]
impl<T: Record> PageSource<T> for RecordSource<'_> {
    async fn fetch_page(&self, page: usize, limit: usize) -> Result<Page<T>, AppError> {
        Ok(records::list::<T>(self.state, &self.filter, page, limit).await)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Insert(T),
    Replace(T),
    Remove(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
struct Slice<T> {
    items: Vec<T>,
    total: usize,
}

/// A change that is already visible locally and not yet confirmed.
#[must_use = "an optimistic command must be committed or rolled back"]
#[derive(Debug)]
pub struct OptimisticCommand<T> {
    prior: Slice<T>,
    target: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagedState<T> {
    items: Vec<T>,
    page: usize,
    limit: usize,
    total: usize,
}

impl<T: Entity> PagedState<T> {
    pub fn from_page(page: Page<T>) -> Self {
        PagedState {
            items: page.data,
            page: page.page,
            limit: page.limit,
            total: page.total,
        }
    }

    pub async fn load<S: PageSource<T> + ?Sized>(
        source: &S,
        page: usize,
        limit: usize,
    ) -> Result<Self, AppError> {
        Ok(PagedState::from_page(source.fetch_page(page, limit).await?))
    }

    /// Re-fetches the current page, replacing whatever is held locally.
    pub async fn reload<S: PageSource<T> + ?Sized>(&mut self, source: &S) -> Result<(), AppError> {
        *self = PagedState::load(source, self.page, self.limit).await?;
        Ok(())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit.max(1))
    }

    fn slice(&self) -> Slice<T> {
        Slice {
            items: self.items.clone(),
            total: self.total,
        }
    }

    /// Applies `change` locally and returns the command that can undo it.
    pub fn apply(&mut self, change: Change<T>) -> OptimisticCommand<T> {
        let prior = self.slice();
        let target = match change {
            Change::Insert(item) => {
                let id = item.id();
                self.items.insert(0, item);
                self.items.truncate(self.limit.max(1));
                self.total += 1;
                Some(id)
            }
            Change::Replace(item) => {
                let id = item.id();
                if let Some(slot) = self.items.iter_mut().find(|i| i.id() == id) {
                    *slot = item;
                }
                Some(id)
            }
            Change::Remove(id) => {
                let before = self.items.len();
                self.items.retain(|i| i.id() != id);
                if self.items.len() < before {
                    self.total = self.total.saturating_sub(1);
                }
                None
            }
        };
        OptimisticCommand { prior, target }
    }

    /// Confirms `command`, swapping the optimistic copy for the one the
    /// server returned, if any.
    pub fn commit(&mut self, command: OptimisticCommand<T>, confirmed: Option<T>) {
        if let (Some(target), Some(confirmed)) = (command.target, confirmed) {
            if let Some(slot) = self.items.iter_mut().find(|i| i.id() == target) {
                *slot = confirmed;
            }
        }
    }

    pub fn rollback(&mut self, command: OptimisticCommand<T>) {
        debug!("rolling back optimistic change on page {}", self.page);
        self.items = command.prior.items;
        self.total = command.prior.total;
    }

    /// Applies `change`, awaits `call`, then commits or rolls back.
    pub async fn run_optimistic<F, Fut>(
        &mut self,
        change: Change<T>,
        call: F,
    ) -> Result<Option<T>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, AppError>>,
    {
        let command = self.apply(change);
        match call().await {
            Ok(confirmed) => {
                self.commit(command, confirmed.clone());
                Ok(confirmed)
            }
            Err(err) => {
                self.rollback(command);
                Err(err)
            }
        }
    }
}
