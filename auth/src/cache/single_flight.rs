use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;

use super::errors::CacheError;

/// Default lifetime of a resolved entry.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

type Outcome<V, E> = Option<Result<V, E>>;

enum Slot<V, E> {
    Ready { value: V, expires_at: Instant },
    Pending(watch::Receiver<Outcome<V, E>>),
}

enum Lookup<V, E> {
    Hit(V),
    Wait(watch::Receiver<Outcome<V, E>>),
    Miss,
}

/// Time-bounded, single-flight cache of resolved tokens.
///
/// Concurrent lookups of the same key share one resolver call. Successful
/// results are kept for the configured TTL; failures are handed to every
/// waiter and then forgotten, so the next lookup resolves again.
///
/// The resolver runs on its own task: it completes and populates the cache
/// even when every caller that was waiting on it has gone away. A flight
/// only writes back while its own pending slot is still in place, so an
/// `invalidate` issued mid-flight is never undone.
pub struct TokenCache<V, E> {
    ttl: Duration,
    slots: Arc<DashMap<String, Slot<V, E>>>,
}

impl<V, E> TokenCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    ///
    /// # Arguments
    /// * `ttl` - How long a resolved entry stays fresh
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Arc::new(DashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh cached value for `key`, or resolve it.
    ///
    /// `resolve` is invoked at most once per key at a time; callers arriving
    /// while it runs wait for the same outcome.
    ///
    /// # Arguments
    /// * `key` - Literal token string, used without normalization
    /// * `resolve` - Produces the value for a key that is not cached
    ///
    /// # Errors
    /// * `Resolve` - The resolver failed (not cached)
    /// * `Interrupted` - The resolver task panicked or was aborted
    pub async fn validate<F, Fut>(&self, key: &str, resolve: F) -> Result<V, CacheError<E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        // The entry guard holds the shard lock, so the check and the pending
        // insert are one step. It is dropped before anything is awaited.
        let (mut receiver, flight) = {
            let entry = self.slots.entry(key.to_owned());

            let lookup = match &entry {
                Entry::Occupied(occupied) => match occupied.get() {
                    Slot::Ready { value, expires_at } if *expires_at > Instant::now() => {
                        Lookup::Hit(value.clone())
                    }
                    // A closed channel with no outcome means the resolver task died.
                    Slot::Pending(receiver) if receiver.has_changed().is_ok() => {
                        Lookup::Wait(receiver.clone())
                    }
                    _ => Lookup::Miss,
                },
                Entry::Vacant(_) => Lookup::Miss,
            };

            match lookup {
                Lookup::Hit(value) => {
                    tracing::trace!("Token cache hit");
                    return Ok(value);
                }
                Lookup::Wait(receiver) => {
                    tracing::trace!("Joining in-flight token resolution");
                    (receiver, None)
                }
                Lookup::Miss => {
                    let (sender, receiver) = watch::channel(None);
                    entry.insert(Slot::Pending(receiver.clone()));
                    (receiver, Some(sender))
                }
            }
        };

        if let Some(sender) = flight {
            tokio::spawn(Self::complete(
                Arc::clone(&self.slots),
                key.to_owned(),
                self.ttl,
                resolve(key.to_owned()),
                sender,
            ));
        }

        let outcome = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| CacheError::Interrupted)?;

        match &*outcome {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(CacheError::Resolve(e.clone())),
            None => Err(CacheError::Interrupted),
        }
    }

    async fn complete<Fut>(
        slots: Arc<DashMap<String, Slot<V, E>>>,
        key: String,
        ttl: Duration,
        resolution: Fut,
        sender: watch::Sender<Outcome<V, E>>,
    ) where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let outcome = resolution.await;
        let flight = sender.subscribe();

        if let Entry::Occupied(mut occupied) = slots.entry(key) {
            let current = matches!(
                occupied.get(),
                Slot::Pending(receiver) if receiver.same_channel(&flight)
            );

            if !current {
                tracing::trace!("Token cache slot replaced during resolution");
            } else {
                match &outcome {
                    Ok(value) => {
                        occupied.insert(Slot::Ready {
                            value: value.clone(),
                            expires_at: Instant::now() + ttl,
                        });
                    }
                    Err(_) => {
                        occupied.remove();
                    }
                }
            }
        }

        sender.send_replace(Some(outcome));
    }

    /// Drop the entry for `key`, if any. An in-flight resolution still
    /// completes for the callers already waiting on it, but its result is
    /// not stored.
    pub fn invalidate(&self, key: &str) {
        self.slots.remove(key);
    }

    /// Remove every expired entry.
    ///
    /// # Returns
    /// Number of entries removed
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.slots.retain(|_, slot| match slot {
            Slot::Ready { expires_at, .. } if *expires_at <= now => {
                evicted += 1;
                false
            }
            _ => true,
        });
        evicted
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<V, E> Default for TokenCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
