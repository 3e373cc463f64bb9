//! Fetch-on-mount collections whose failures degrade to "nothing new shown".

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::ApiClientError;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    /// The fetch failed; previous items were kept.
    Failed,
    /// The owner unmounted before the fetch resolved.
    Discarded,
    /// A later load started before this one resolved.
    Superseded,
}

struct ListInner<T> {
    state: ListState<T>,
    mounted: bool,
    generation: u64,
}

pub struct ListController<T> {
    label: &'static str,
    inner: Mutex<ListInner<T>>,
}

impl<T: Clone> ListController<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: Mutex::new(ListInner {
                state: ListState::default(),
                mounted: true,
                generation: 0,
            }),
        }
    }

    pub async fn snapshot(&self) -> ListState<T> {
        self.inner.lock().await.state.clone()
    }

    pub async fn is_mounted(&self) -> bool {
        self.inner.lock().await.mounted
    }

    /// After this, every pending or future load result is dropped.
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        inner.mounted = false;
        inner.state = ListState::default();
    }

    pub async fn load<F, Fut>(&self, fetch: F) -> LoadOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiClientError>>,
    {
        let generation = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted {
                return LoadOutcome::Discarded;
            }
            inner.generation += 1;
            inner.state.loading = true;
            inner.generation
        };

        let result = fetch().await;

        let mut inner = self.inner.lock().await;
        if !inner.mounted {
            debug!(list = self.label, "dropping load result after unmount");
            return LoadOutcome::Discarded;
        }
        if inner.generation != generation {
            debug!(list = self.label, generation, "dropping superseded load result");
            return LoadOutcome::Superseded;
        }

        inner.state.loading = false;
        match result {
            Ok(items) => {
                let count = items.len();
                inner.state.items = items;
                debug!(list = self.label, count, "list loaded");
                LoadOutcome::Loaded { count }
            }
            Err(err) => {
                warn!(list = self.label, error = %err, "list load failed; keeping previous items");
                LoadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
