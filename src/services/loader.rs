//! Request-scoped batching loaders.
//!
//! Lookups issued while the same resolution pass is in progress are collected
//! and served by one multi-key fetch. Results are cached for the lifetime of
//! the loader, which is a single request.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

use crate::database::Store;
use crate::database::models::{Employee, User};
use crate::error::AppError;

/// Multi-key fetch behind a [`BatchLoader`]. Unknown keys are left out of the map.
#[async_trait]
pub trait BatchFetch: Send + Sync {
    type Value: Clone + Send + Sync + 'static;

    async fn fetch(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, AppError>;
}

type Waiter<V> = oneshot::Sender<Result<Option<V>, ()>>;

struct LoaderState<V> {
    cache: HashMap<String, Option<V>>,
    pending: Vec<String>,
    in_flight: HashSet<String>,
    waiters: HashMap<String, Vec<Waiter<V>>>,
    scheduled: bool,
}

impl<V> Default for LoaderState<V> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            pending: Vec::new(),
            in_flight: HashSet::new(),
            waiters: HashMap::new(),
            scheduled: false,
        }
    }
}

/// Held by the caller that dispatches a batch. Dropping it before the batch
/// completes fails the waiters on every key it left unresolved.
struct LeadGuard<'a, V> {
    state: &'a Mutex<LoaderState<V>>,
    claimed: Vec<String>,
    finished: bool,
}

impl<V> Drop for LeadGuard<'_, V> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.scheduled = false;
        let mut abandoned = std::mem::take(&mut state.pending);
        abandoned.append(&mut self.claimed);
        log::warn!("Batch load abandoned with {} key(s) unresolved", abandoned.len());
        for key in abandoned {
            state.in_flight.remove(&key);
            for waiter in state.waiters.remove(&key).unwrap_or_default() {
                let _ = waiter.send(Err(()));
            }
        }
    }
}

enum Slot<V> {
    Ready(Option<V>),
    Waiting(oneshot::Receiver<Result<Option<V>, ()>>),
}

pub struct BatchLoader<F: BatchFetch> {
    fetcher: F,
    state: Mutex<LoaderState<F::Value>>,
}

impl<F: BatchFetch> BatchLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            state: Mutex::new(LoaderState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoaderState<F::Value>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn load(&self, key: &str) -> Result<Option<F::Value>, AppError> {
        let mut values = self.load_many(&[key.to_string()]).await?;
        Ok(values.pop().flatten())
    }

    /// Values in the order of `keys`; duplicates share one lookup.
    pub async fn load_many(&self, keys: &[String]) -> Result<Vec<Option<F::Value>>, AppError> {
        let (slots, lead) = {
            let mut state = self.state();
            let mut slots = Vec::with_capacity(keys.len());
            for key in keys {
                if let Some(value) = state.cache.get(key) {
                    slots.push(Slot::Ready(value.clone()));
                    continue;
                }
                let (tx, rx) = oneshot::channel();
                state.waiters.entry(key.clone()).or_default().push(tx);
                if !state.in_flight.contains(key) && !state.pending.contains(key) {
                    state.pending.push(key.clone());
                }
                slots.push(Slot::Waiting(rx));
            }
            let lead = !state.pending.is_empty() && !state.scheduled;
            if lead {
                state.scheduled = true;
            }
            (slots, lead)
        };

        if lead {
            let mut guard = LeadGuard {
                state: &self.state,
                claimed: Vec::new(),
                finished: false,
            };
            // Let sibling lookups in the same pass enqueue their keys first.
            tokio::task::yield_now().await;
            self.dispatch(&mut guard).await;
        }

        let mut values = Vec::with_capacity(slots.len());
        for slot in slots {
            values.push(match slot {
                Slot::Ready(value) => value,
                Slot::Waiting(rx) => rx
                    .await
                    .map_err(|_| AppError::internal_server_error())?
                    .map_err(|_| AppError::internal_server_error())?,
            });
        }
        Ok(values)
    }

    async fn dispatch(&self, guard: &mut LeadGuard<'_, F::Value>) {
        let keys = {
            let mut state = self.state();
            state.scheduled = false;
            let keys = std::mem::take(&mut state.pending);
            state.in_flight.extend(keys.iter().cloned());
            keys
        };
        guard.claimed = keys.clone();
        if keys.is_empty() {
            guard.finished = true;
            return;
        }

        log::debug!("Batch loading {} key(s)", keys.len());
        let fetched = self.fetcher.fetch(&keys).await;

        let mut state = self.state();
        match fetched {
            Ok(found) => {
                for key in keys {
                    state.in_flight.remove(&key);
                    let value = found.get(&key).cloned();
                    state.cache.insert(key.clone(), value.clone());
                    for waiter in state.waiters.remove(&key).unwrap_or_default() {
                        let _ = waiter.send(Ok(value.clone()));
                    }
                }
            }
            Err(e) => {
                log::error!("Batch load of {} key(s) failed: {}", keys.len(), e);
                for key in keys {
                    state.in_flight.remove(&key);
                    for waiter in state.waiters.remove(&key).unwrap_or_default() {
                        let _ = waiter.send(Err(()));
                    }
                }
            }
        }
        guard.finished = true;
    }
}

pub struct EmployeesById(pub Arc<dyn Store>);

#[async_trait]
impl BatchFetch for EmployeesById {
    type Value = Employee;

    async fn fetch(&self, keys: &[String]) -> Result<HashMap<String, Employee>, AppError> {
        self.0.find_employees_by_ids(keys).await
    }
}

pub struct UsersById(pub Arc<dyn Store>);

#[async_trait]
impl BatchFetch for UsersById {
    type Value = User;

    async fn fetch(&self, keys: &[String]) -> Result<HashMap<String, User>, AppError> {
        self.0.find_users_by_ids(keys).await
    }
}

/// Keyed by the employee a user is linked to.
pub struct UsersByEmployeeId(pub Arc<dyn Store>);

#[async_trait]
impl BatchFetch for UsersByEmployeeId {
    type Value = User;

    async fn fetch(&self, keys: &[String]) -> Result<HashMap<String, User>, AppError> {
        self.0.find_users_by_employee_ids(keys).await
    }
}

pub type EmployeeLoader = BatchLoader<EmployeesById>;
pub type UserLoader = BatchLoader<UsersById>;
pub type EmployeeUserLoader = BatchLoader<UsersByEmployeeId>;
