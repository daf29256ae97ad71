// ── Read coalescing ──
//
// Every attribute read goes through `ReadCoalescer::admit`. Fresh cache
// hits are answered on the spot; everything else is queued behind a
// single in-flight status fetch. The cache and the fetch state share one
// mutex so a read can never observe "stale" and then miss the completion
// that would have answered it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cache::StatusCache;
use crate::error::CoreError;
use crate::model::{Attribute, StoveSnapshot};

/// Outcome delivered to every queued read.
pub type ReadResult = Result<Arc<StoveSnapshot>, CoreError>;

/// A read waiting for the in-flight fetch.
struct PendingRead {
    /// `None` for whole-snapshot reads.
    attribute: Option<Attribute>,
    reply: oneshot::Sender<ReadResult>,
}

enum FetchState {
    Idle,
    FetchInFlight {
        waiters: Vec<PendingRead>,
        started: Instant,
        /// Invalidation epoch the fetch was started under.
        epoch: u64,
        /// Reads admitted after an invalidation; they wait for the next fetch.
        deferred: Vec<PendingRead>,
    },
}

struct State {
    cache: StatusCache,
    fetch: FetchState,
    /// Bumped by every invalidation. A fetch started under an older epoch may
    /// have read the stove before a write landed.
    epoch: u64,
}

/// How a read was admitted.
#[derive(Debug)]
pub enum Admission {
    /// The cache was fresh; here is the snapshot.
    Cached(Arc<StoveSnapshot>),
    /// The read was queued. If `start_fetch` is set, the caller is the one
    /// that moved the state to in-flight and must run the fetch and report
    /// back through [`ReadCoalescer::complete`].
    Queued {
        reply: oneshot::Receiver<ReadResult>,
        start_fetch: bool,
    },
}

/// What [`ReadCoalescer::complete`] did with a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Reads answered with the result.
    pub answered: usize,
    /// Deferred reads now wait on a new fetch, which the caller must run and
    /// report back through [`ReadCoalescer::complete`].
    pub refetch: bool,
}

/// Status cache plus the `Idle` / `FetchInFlight` state machine.
///
/// Guarantees at most one status fetch in flight, and that every queued
/// read is answered exactly once. A read admitted after [`invalidate`]
/// never receives the result of a fetch started before it.
///
/// [`invalidate`]: ReadCoalescer::invalidate
pub struct ReadCoalescer {
    state: Mutex<State>,
}

impl ReadCoalescer {
    pub fn new(freshness: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                cache: StatusCache::new(freshness),
                fetch: FetchState::Idle,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a read: serve it from cache or queue it behind a fetch.
    pub fn admit(&self, attribute: Option<Attribute>) -> Admission {
        let mut state = self.lock();

        if let Some(snapshot) = state.cache.get_fresh() {
            trace!(?attribute, "served from cache");
            return Admission::Cached(snapshot);
        }

        let (tx, rx) = oneshot::channel();
        let pending = PendingRead {
            attribute,
            reply: tx,
        };
        let current = state.epoch;

        match &mut state.fetch {
            FetchState::FetchInFlight {
                waiters,
                epoch,
                deferred,
                ..
            } => {
                if *epoch == current {
                    waiters.push(pending);
                    trace!(?attribute, queued = waiters.len(), "joined in-flight fetch");
                } else {
                    deferred.push(pending);
                    trace!(
                        ?attribute,
                        deferred = deferred.len(),
                        "waiting for fetch after invalidation"
                    );
                }
                Admission::Queued {
                    reply: rx,
                    start_fetch: false,
                }
            }
            FetchState::Idle => {
                debug!(?attribute, "cache stale, starting status fetch");
                state.fetch = FetchState::FetchInFlight {
                    waiters: vec![pending],
                    started: Instant::now(),
                    epoch: current,
                    deferred: Vec::new(),
                };
                Admission::Queued {
                    reply: rx,
                    start_fetch: true,
                }
            }
        }
    }

    /// Resolve the in-flight fetch and drain its queue.
    ///
    /// On success the cache is replaced before any waiter is answered,
    /// unless an invalidation happened while the fetch was running. On
    /// failure every waiter receives a clone of the error, so no reader is
    /// left pending. Deferred reads move to a new in-flight fetch.
    pub fn complete(&self, result: ReadResult) -> Completion {
        let (waiters, refetch) = {
            let mut state = self.lock();
            let current = state.epoch;
            match std::mem::replace(&mut state.fetch, FetchState::Idle) {
                FetchState::FetchInFlight {
                    waiters,
                    started,
                    epoch,
                    deferred,
                } => {
                    let superseded = epoch != current;
                    if let (Ok(snapshot), false) = (&result, superseded) {
                        state.cache.update(Arc::clone(snapshot));
                    }
                    debug!(
                        elapsed_ms = started.elapsed().as_millis(),
                        ok = result.is_ok(),
                        superseded,
                        waiters = waiters.len(),
                        deferred = deferred.len(),
                        "status fetch resolved"
                    );
                    let refetch = !deferred.is_empty();
                    if refetch {
                        state.fetch = FetchState::FetchInFlight {
                            waiters: deferred,
                            started: Instant::now(),
                            epoch: current,
                            deferred: Vec::new(),
                        };
                    }
                    (waiters, refetch)
                }
                FetchState::Idle => (Vec::new(), false),
            }
        };

        let answered = waiters.len();
        for pending in waiters {
            trace!(attribute = ?pending.attribute, "answering queued read");
            // A dropped receiver means the reader gave up; nothing to do.
            let _ = pending.reply.send(result.clone());
        }
        Completion { answered, refetch }
    }

    /// `true` while a status fetch is outstanding.
    pub fn is_fetch_in_flight(&self) -> bool {
        matches!(self.lock().fetch, FetchState::FetchInFlight { .. })
    }

    /// Number of reads queued behind the in-flight fetch.
    pub fn pending(&self) -> usize {
        match &self.lock().fetch {
            FetchState::FetchInFlight {
                waiters, deferred, ..
            } => waiters.len() + deferred.len(),
            FetchState::Idle => 0,
        }
    }

    /// The cached snapshot regardless of age.
    pub fn cached(&self) -> Option<Arc<StoveSnapshot>> {
        self.lock().cache.get()
    }

    /// Force the next read to fetch, and keep a fetch already in flight
    /// from answering reads admitted from now on.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.cache.invalidate();
        state.epoch += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::model::{HeaterCoolerState, TargetHeaterCoolerState};

    fn snapshot(temp: f64) -> Arc<StoveSnapshot> {
        Arc::new(StoveSnapshot {
            name: None,
            active: true,
            current_state: HeaterCoolerState::Idle,
            target_state: TargetHeaterCoolerState::Auto,
            current_temperature: temp,
            target_temperature: 21.0,
            main_state: 6,
            sub_state: 0,
            revision: Value::from(7),
        })
    }

    fn queued(admission: Admission) -> (oneshot::Receiver<ReadResult>, bool) {
        match admission {
            Admission::Queued { reply, start_fetch } => (reply, start_fetch),
            Admission::Cached(_) => panic!("expected a queued read"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_stale_read_starts_the_only_fetch() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));

        let (_rx1, start1) = queued(reads.admit(Some(Attribute::Active)));
        let (_rx2, start2) = queued(reads.admit(Some(Attribute::CurrentTemperature)));
        let (_rx3, start3) = queued(reads.admit(None));

        assert!(start1);
        assert!(!start2);
        assert!(!start3);
        assert!(reads.is_fetch_in_flight());
        assert_eq!(reads.pending(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn success_answers_every_waiter_once() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let receivers: Vec<_> = (0..5)
            .map(|_| queued(reads.admit(Some(Attribute::CurrentTemperature))).0)
            .collect();

        assert_eq!(reads.complete(Ok(snapshot(20.5))).answered, 5);
        assert!(!reads.is_fetch_in_flight());

        for rx in receivers {
            let snap = rx.await.unwrap().unwrap();
            assert_eq!(snap.current_temperature, 20.5);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reads_after_success_hit_the_cache_until_it_expires() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let (rx, _) = queued(reads.admit(None));
        reads.complete(Ok(snapshot(20.5)));
        rx.await.unwrap().unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(matches!(reads.admit(None), Admission::Cached(_)));

        tokio::time::advance(Duration::from_millis(600)).await;
        let (_rx, start) = queued(reads.admit(None));
        assert!(start);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_drains_with_the_error() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let rx1 = queued(reads.admit(Some(Attribute::Active))).0;
        let rx2 = queued(reads.admit(Some(Attribute::Active))).0;

        let drained = reads.complete(Err(CoreError::RemoteServer {
            status: 500,
            message: "stove not linked".into(),
        }));
        assert_eq!(drained.answered, 2);
        assert!(!drained.refetch);

        for rx in [rx1, rx2] {
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err, CoreError::RemoteServer { status: 500, .. }));
        }

        // Back to idle: the next read starts a new fetch.
        assert!(!reads.is_fetch_in_flight());
        assert!(reads.cached().is_none());
        let (_rx, start) = queued(reads.admit(None));
        assert!(start);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_reader_does_not_disturb_the_rest() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let rx1 = queued(reads.admit(None)).0;
        drop(queued(reads.admit(None)).0);

        assert_eq!(reads.complete(Ok(snapshot(19.0))).answered, 2);
        assert!(rx1.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_keeps_data_but_forces_fetch() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let _ = queued(reads.admit(None));
        reads.complete(Ok(snapshot(19.0)));

        reads.invalidate();
        assert!(reads.cached().is_some());
        let (_rx, start) = queued(reads.admit(None));
        assert!(start);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_started_before_invalidate_does_not_answer_later_reads() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let (before, start) = queued(reads.admit(None));
        assert!(start);

        reads.invalidate();
        let (after, start_after) = queued(reads.admit(None));
        assert!(!start_after);
        assert_eq!(reads.pending(), 2);

        let done = reads.complete(Ok(snapshot(19.0)));
        assert_eq!(done, Completion { answered: 1, refetch: true });
        assert_eq!(before.await.unwrap().unwrap().current_temperature, 19.0);

        // The superseded result is not cached; the deferred read waits on
        // the follow-up fetch.
        assert!(reads.cached().is_none());
        assert!(reads.is_fetch_in_flight());
        assert_eq!(reads.pending(), 1);

        let done = reads.complete(Ok(snapshot(22.0)));
        assert_eq!(done, Completion { answered: 1, refetch: false });
        assert_eq!(after.await.unwrap().unwrap().current_temperature, 22.0);
        assert_eq!(reads.cached().unwrap().current_temperature, 22.0);
        assert!(matches!(reads.admit(None), Admission::Cached(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_with_no_later_reads_only_skips_the_cache() {
        let reads = ReadCoalescer::new(Duration::from_secs(1));
        let (rx, _) = queued(reads.admit(None));
        reads.invalidate();

        let done = reads.complete(Ok(snapshot(19.0)));
        assert_eq!(done, Completion { answered: 1, refetch: false });
        assert!(rx.await.unwrap().is_ok());
        assert!(!reads.is_fetch_in_flight());
        assert!(reads.cached().is_none());
    }
}
