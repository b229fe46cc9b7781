//! In-memory return cache with whole-table TTL invalidation.
//!
//! Memoizes `(ticker, reference date) -> ReturnResult` in a bounded LRU
//! table. Expiry is not per entry: once `ttl` has elapsed since the last
//! reset, the next call clears the entire table before looking anything up.
//! There is no background timer.
//!
//! Concurrency:
//! - The table and the reset timestamp sit behind one mutex, so
//!   check-expire-lookup and populate are each atomic.
//! - Fetches run outside that mutex, serialized per key through an
//!   in-flight table, so two callers asking for the same pair trigger one
//!   fetch while different pairs fetch in parallel.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::data::PriceProvider;
use crate::domain::{parse_reference_date, ReturnResult, Ticker};
use crate::error::{GemError, ValidationFailure};
use crate::returns::TrailingWindow;

pub const DEFAULT_CAPACITY: usize = 32;
pub const DEFAULT_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Time after the last reset at which the whole table is dropped.
    pub ttl: Duration,
    /// Maximum number of distinct `(ticker, date)` entries.
    pub capacity: usize,
    /// Window used to compute each cached return.
    pub window: TrailingWindow,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
            window: TrailingWindow::default(),
        }
    }
}

/// Memo key: the exact strings the caller passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub reference_date: String,
}

impl CacheKey {
    pub fn new(ticker: &str, reference_date: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            reference_date: reference_date.to_string(),
        }
    }
}

/// Counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub rejected: u64,
    pub resets: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    rejected: AtomicU64,
    resets: AtomicU64,
}

struct CacheState {
    memo: LruCache<CacheKey, ReturnResult>,
    last_reset: Instant,
}

type Slot = Arc<Mutex<()>>;

/// Memoizing front for a [`PriceProvider`] that returns trailing returns.
pub struct ReturnCache {
    provider: Arc<dyn PriceProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: NonZeroUsize,
    window: TrailingWindow,
    state: Mutex<CacheState>,
    inflight: Mutex<HashMap<CacheKey, Slot>>,
    counters: Counters,
}

impl ReturnCache {
    pub fn new(provider: Arc<dyn PriceProvider>, config: CacheConfig) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        provider: Arc<dyn PriceProvider>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        let last_reset = clock.now();

        tracing::info!(
            provider = provider.name(),
            ttl_secs = config.ttl.as_secs(),
            capacity = capacity.get(),
            "return cache initialized"
        );

        Self {
            provider,
            clock,
            ttl: config.ttl,
            capacity,
            window: config.window,
            state: Mutex::new(CacheState {
                memo: LruCache::new(capacity),
                last_reset,
            }),
            inflight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Trailing return for `ticker` at `reference_date` (`YYYY-MM-DD`).
    ///
    /// Never fails: invalid input, fetch failures and empty windows all come
    /// back as [`ReturnResult::Unavailable`]. Invalid input is not memoized;
    /// everything that reached the provider is, until the next reset.
    pub fn get_return(&self, ticker: &str, reference_date: &str) -> ReturnResult {
        let key = CacheKey::new(ticker, reference_date);

        if let Some(hit) = self.lookup(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(ticker, reference_date, "return cache hit");
            return hit;
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let (symbol, date) = match validate(ticker, reference_date) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                return ReturnResult::from_outcome(ticker, Err(e.into()));
            }
        };

        let slot = self.slot_for(&key);
        let _guard = slot.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have populated the entry while we waited.
        if let Some(hit) = self.lookup(&key) {
            self.release_slot(&key, &slot);
            return hit;
        }

        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let outcome = self
            .provider
            .fetch(&symbol)
            .map(|series| self.window.compute(&series, date))
            .map_err(GemError::from);
        let result = ReturnResult::from_outcome(ticker, outcome);

        if let Some(pct) = result.percentage_return() {
            tracing::info!(ticker, reference_date, percentage_return = pct, "computed return");
        }

        self.lock_state().memo.put(key.clone(), result.clone());
        self.release_slot(&key, &slot);
        result
    }

    /// Drop every entry and restart the TTL clock.
    pub fn clear(&self) {
        let now = self.clock.now();
        let mut state = self.lock_state();
        state.memo.clear();
        state.last_reset = now;
        self.counters.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of memoized entries (without applying expiry).
    pub fn len(&self) -> usize {
        self.lock_state().memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn window(&self) -> TrailingWindow {
        self.window
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            resets: self.counters.resets.load(Ordering::Relaxed),
        }
    }

    /// Apply TTL expiry, then look the key up (refreshing its LRU position).
    fn lookup(&self, key: &CacheKey) -> Option<ReturnResult> {
        let now = self.clock.now();
        let mut state = self.lock_state();
        if now.saturating_duration_since(state.last_reset) > self.ttl {
            state.memo.clear();
            state.last_reset = now;
            self.counters.resets.fetch_add(1, Ordering::Relaxed);
            tracing::info!(ttl_secs = self.ttl.as_secs(), "return cache expired and was reset");
        }
        state.memo.get(key).cloned()
    }

    fn slot_for(&self, key: &CacheKey) -> Slot {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.entry(key.clone()).or_default().clone()
    }

    fn release_slot(&self, key: &CacheKey, slot: &Slot) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if inflight.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            inflight.remove(key);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn validate(ticker: &str, reference_date: &str) -> Result<(Ticker, NaiveDate), ValidationFailure> {
    let symbol = Ticker::parse(ticker)?;
    let date = parse_reference_date(reference_date)?;
    Ok((symbol, date))
}
