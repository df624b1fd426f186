use std::fmt;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::loader::AssetLoader;
use crate::foundation::error::{CardError, CardResult};
use crate::resolve::parts::PartKey;

/// One tracked visual layer: a body part or the per-kind background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotKey {
    /// Per-kind card background.
    Background,
    /// A body part layer.
    Part(PartKey),
}

impl SlotKey {
    /// Number of slots.
    pub const COUNT: usize = 1 + PartKey::ALL.len();

    /// Background first, then parts in logical order.
    pub const ALL: [SlotKey; Self::COUNT] = [
        SlotKey::Background,
        SlotKey::Part(PartKey::LeftArm),
        SlotKey::Part(PartKey::RightArm),
        SlotKey::Part(PartKey::Torso),
        SlotKey::Part(PartKey::Head),
        SlotKey::Part(PartKey::LeftLeg),
        SlotKey::Part(PartKey::RightLeg),
    ];

    /// Position in [`SlotKey::ALL`].
    pub fn index(self) -> usize {
        match self {
            SlotKey::Background => 0,
            SlotKey::Part(p) => 1 + p.index(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Background => f.write_str("background"),
            SlotKey::Part(p) => f.write_str(p.as_str()),
        }
    }
}

/// Sequence number of a reset. Every [`AssetTracker::reset_all`] starts a new generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

/// Identity of one issued load. A completion only lands if the slot still waits on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LoadTicket {
    generation: Generation,
    seq: u64,
}

/// Load state of one slot.
///
/// At most one of `loading`, `error_path` and `image` describes the current request.
#[derive(Clone, Debug, Default)]
pub struct AssetSlot {
    image: Option<PreparedImage>,
    loading: bool,
    error_path: Option<String>,
    pending: Option<LoadTicket>,
}

impl AssetSlot {
    /// Decoded image, once loaded.
    pub fn image(&self) -> Option<&PreparedImage> {
        self.image.as_ref()
    }

    /// `true` while a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Path of the failed load, if the last load failed.
    pub fn error_path(&self) -> Option<&str> {
        self.error_path.as_deref()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// All seven slots, indexed by [`SlotKey`].
#[derive(Clone, Debug, Default)]
pub struct SlotTable {
    slots: [AssetSlot; SlotKey::COUNT],
}

impl SlotTable {
    /// Slot for `key`.
    pub fn get(&self, key: SlotKey) -> &AssetSlot {
        &self.slots[key.index()]
    }

    pub(crate) fn get_mut(&mut self, key: SlotKey) -> &mut AssetSlot {
        &mut self.slots[key.index()]
    }

    /// `(key, slot)` pairs in [`SlotKey::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &AssetSlot)> {
        SlotKey::ALL.into_iter().zip(self.slots.iter())
    }

    /// No slot is loading.
    pub fn is_settled(&self) -> bool {
        self.slots.iter().all(|s| !s.loading)
    }

    /// Some slot recorded a failed load.
    pub fn has_any_error(&self) -> bool {
        self.slots.iter().any(|s| s.error_path.is_some())
    }
}

/// Counters for applied and discarded completions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Loads issued by [`AssetTracker::begin_load`].
    pub issued: u64,
    /// Completions written into a slot.
    pub applied: u64,
    /// Completions dropped because their slot was reset or reloaded since.
    pub discarded: u64,
}

struct LoadCompletion {
    key: SlotKey,
    ticket: LoadTicket,
    path: String,
    result: CardResult<PreparedImage>,
}

/// Drives fetch-and-decode for each slot on a worker pool and owns all slot state.
///
/// Workers never touch slots: they send completions over a channel, and the owner applies them in
/// [`AssetTracker::pump`]. That keeps a single writer per slot without locking.
pub struct AssetTracker {
    loader: Arc<dyn AssetLoader>,
    pool: rayon::ThreadPool,
    tx: mpsc::Sender<LoadCompletion>,
    rx: mpsc::Receiver<LoadCompletion>,
    slots: SlotTable,
    generation: Generation,
    next_seq: u64,
    stats: TrackerStats,
}

impl AssetTracker {
    /// Create a tracker fetching through `loader`. `threads = None` uses rayon's default.
    pub fn new(loader: Arc<dyn AssetLoader>, threads: Option<usize>) -> CardResult<Self> {
        let pool = build_load_pool(threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            loader,
            pool,
            tx,
            rx,
            slots: SlotTable::default(),
            generation: Generation::default(),
            next_seq: 0,
            stats: TrackerStats::default(),
        })
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Read-only view of every slot.
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// Slot for `key`.
    pub fn slot(&self, key: SlotKey) -> &AssetSlot {
        self.slots.get(key)
    }

    /// Issue/apply counters.
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Start a new generation and clear `keys` to the unloaded state.
    ///
    /// In-flight loads for those slots keep running; their completions are discarded.
    pub fn reset_all(&mut self, keys: &[SlotKey]) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        for &key in keys {
            self.slots.get_mut(key).clear();
        }
        tracing::debug!(generation = self.generation.0, slots = keys.len(), "reset slots");
        self.generation
    }

    /// Mark `key` loading and fetch + decode `path` on the worker pool.
    pub fn begin_load(&mut self, key: SlotKey, path: impl Into<String>) {
        let path = path.into();
        let ticket = LoadTicket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.stats.issued += 1;

        let slot = self.slots.get_mut(key);
        slot.image = None;
        slot.error_path = None;
        slot.loading = true;
        slot.pending = Some(ticket);

        tracing::debug!(slot = %key, generation = ticket.generation.0, %path, "loading");

        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            let result = loader.load(&path).and_then(|bytes| decode_image(&bytes));
            // The receiver only goes away with the tracker; nobody is left to care.
            let _ = tx.send(LoadCompletion {
                key,
                ticket,
                path,
                result,
            });
        });
    }

    /// Apply every completion that has arrived so far. Never blocks. Returns how many were taken
    /// off the channel (applied or discarded).
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.apply(done);
            n += 1;
        }
        n
    }

    /// Block until settled or `timeout` elapses, applying completions as they arrive.
    pub fn wait_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.is_settled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(done) => self.apply(done),
                Err(_) => return self.is_settled(),
            }
        }
    }

    /// No slot is loading.
    pub fn is_settled(&self) -> bool {
        self.slots.is_settled()
    }

    /// Some slot recorded a failed load.
    pub fn has_any_error(&self) -> bool {
        self.slots.has_any_error()
    }

    fn apply(&mut self, done: LoadCompletion) {
        let LoadCompletion {
            key,
            ticket,
            path,
            result,
        } = done;

        let slot = self.slots.get_mut(key);
        if slot.pending != Some(ticket) {
            self.stats.discarded += 1;
            tracing::debug!(
                slot = %key,
                generation = ticket.generation.0,
                current = self.generation.0,
                %path,
                "discarding stale completion"
            );
            return;
        }

        slot.pending = None;
        slot.loading = false;
        match result {
            Ok(img) => {
                tracing::debug!(slot = %key, %path, w = img.width, h = img.height, "loaded");
                slot.image = Some(img);
                slot.error_path = None;
            }
            Err(e) => {
                tracing::warn!(slot = %key, %path, error = %e, "failed to load asset");
                slot.image = None;
                slot.error_path = Some(path);
            }
        }
        self.stats.applied += 1;
    }
}

fn build_load_pool(threads: Option<usize>) -> CardResult<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("monstercard-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CardError::render(format!("failed to build load thread pool: {e}")))
}

#[cfg(test)]
impl AssetSlot {
    pub(crate) fn loaded_for_test(image: PreparedImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub(crate) fn loading_for_test() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub(crate) fn failed_for_test(path: &str) -> Self {
        Self {
            error_path: Some(path.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/tracker.rs"]
mod tests;
