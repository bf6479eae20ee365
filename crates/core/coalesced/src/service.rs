use std::{collections::HashMap, future::Future, hash::Hash, sync::Arc};

use tokio::sync::{
    watch::{channel as watch_channel, Receiver},
    RwLock,
};

use crate::Error;

type Settled<Value, E> = Result<Arc<Value>, Error<E>>;

/// Per-key slot: either a call in flight or the outcome of the last one.
enum Entry<Value, E> {
    /// A call is running; waiters park on the receiver.
    Pending(Receiver<Option<Settled<Value, E>>>),
    /// Outcome of the last call, kept until invalidation. Failures are
    /// memoized too: a settled error is handed out again and again and the
    /// call is never re-issued for this key until [`MemoizeService::invalidate`].
    Settled(Settled<Value, E>),
}

/// Coalesces and memoizes calls by key.
///
/// Concurrent [`MemoizeService::execute`] calls for the same id during an
/// in-flight call are collapsed into that one call and all receive the same
/// result; once settled, the result (success or failure) is returned
/// immediately to every later caller until the key is invalidated.
#[derive(Clone)]
#[allow(clippy::type_complexity)]
pub struct MemoizeService<Id: Hash + Eq, Value, E> {
    entries: Arc<RwLock<HashMap<Id, Entry<Value, E>>>>,
}

impl<Id: Hash + Eq + Clone, Value, E: Clone> MemoizeService<Id, Value, E> {
    pub fn new() -> Self {
        Self::default()
    }

    async fn wait_for(
        &self,
        mut receiver: Receiver<Option<Settled<Value, E>>>,
    ) -> Settled<Value, E> {
        receiver
            .wait_for(|v| v.is_some())
            .await
            .map_err(|_| Error::Recv)
            .and_then(|r| r.clone().unwrap())
    }

    /// Return the memoized result for `id`, joining an in-flight call if one
    /// exists, or issuing `func` exactly once otherwise.
    pub async fn execute<F: FnOnce() -> Fut, Fut: Future<Output = Result<Value, E>>>(
        &self,
        id: Id,
        func: F,
    ) -> Settled<Value, E> {
        // Single critical section: hand out a settled result, adopt the
        // in-flight attempt, or claim the slot for this caller. Holding the
        // write guard across check-and-insert keeps at most one call in
        // flight per id.
        let (sender, receiver) = {
            let mut entries = self.entries.write().await;

            if let Some(entry) = entries.get(&id) {
                match entry {
                    Entry::Settled(result) => return result.clone(),
                    Entry::Pending(receiver) => {
                        let receiver = receiver.clone();
                        drop(entries);
                        return self.wait_for(receiver).await;
                    }
                }
            }

            let (sender, receiver) = watch_channel(None);
            entries.insert(id.clone(), Entry::Pending(receiver.clone()));
            (sender, receiver)
        };

        let result = func().await.map(Arc::new).map_err(Error::Failed);

        {
            let mut entries = self.entries.write().await;

            // An invalidation may have reset the slot while the call ran;
            // only settle the entry if it still belongs to this attempt.
            let owns_slot = matches!(
                entries.get(&id),
                Some(Entry::Pending(current)) if current.same_channel(&receiver)
            );

            if owns_slot {
                entries.insert(id.clone(), Entry::Settled(result.clone()));
            }
        }

        sender.send_modify(|opt| {
            opt.replace(result.clone());
        });

        result
    }

    /// Forget everything known about `id`. Waiters of an in-flight call
    /// still receive that call's result; the next `execute` starts fresh.
    pub async fn invalidate(&self, id: &Id) {
        self.entries.write().await.remove(id);
    }

    pub async fn pending_count(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| matches!(entry, Entry::Pending(_)))
            .count()
    }
}

impl<Id: Hash + Eq + Clone, Value, E: Clone> Default for MemoizeService<Id, Value, E> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
