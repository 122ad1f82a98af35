//! The transient data-point store. Scans and chromatograms keep their large
//! numeric buffers here, addressed by opaque handles, so that the backing
//! storage can later be swapped for an out-of-core implementation without
//! touching call sites.
//!
//! Lists are copied on the way in and on the way out, never aliased: a
//! caller can keep mutating its own list after storing it without affecting
//! what a later read returns. A single mutex guards the whole store; every
//! operation is an O(buffer size) copy, so coarse locking is sufficient and
//! makes the store safe to share across threads.

use std::fmt::Display;

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

use crate::spectrum::{ChromatogramDataPoints, FeatureDataPoints, SpectrumDataPoints};

/// An opaque identifier for one stored data-point list.
///
/// Handles are strictly increasing per store instance and are never reused,
/// even after the entry they named is removed. A handle is only meaningful
/// to the store that issued it, and only until that store is disposed or the
/// entry is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageHandle(u64);

/// The shape of list stored under a handle. One store may hold a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPointKind {
    Spectrum,
    Chromatogram,
    Feature,
}

impl Display for DataPointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Handle {0:?} not found in storage")]
    NotFound(StorageHandle),
    #[error("Handle {handle:?} holds a {found} list, expected {expected}")]
    TypeMismatch {
        handle: StorageHandle,
        expected: DataPointKind,
        found: DataPointKind,
    },
    #[error("The data point store has been disposed")]
    Disposed,
}

#[derive(Debug, Clone)]
enum StoredList {
    Spectrum(SpectrumDataPoints),
    Chromatogram(ChromatogramDataPoints),
    Feature(FeatureDataPoints),
}

impl StoredList {
    fn kind(&self) -> DataPointKind {
        match self {
            StoredList::Spectrum(_) => DataPointKind::Spectrum,
            StoredList::Chromatogram(_) => DataPointKind::Chromatogram,
            StoredList::Feature(_) => DataPointKind::Feature,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    last_id: u64,
    entries: IndexMap<StorageHandle, StoredList>,
}

/// An in-memory data-point store with copy-in/copy-out semantics.
///
/// Disposal (`dispose`) irreversibly frees every entry; all further
/// operations on a disposed store fail with [`StoreError::Disposed`], which
/// indicates a logic error in the caller rather than a transient condition.
#[derive(Debug)]
pub struct DataPointStore {
    // None once disposed. The handle counter lives under the same lock as
    // the map, which is what guarantees handle uniqueness.
    state: Mutex<Option<StoreState>>,
}

impl Default for DataPointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPointStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Some(StoreState::default())),
        }
    }

    fn with_state<T>(
        &self,
        body: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.lock();
        match guard.as_mut() {
            Some(state) => body(state),
            None => Err(StoreError::Disposed),
        }
    }

    fn insert(&self, list: StoredList) -> Result<StorageHandle, StoreError> {
        self.with_state(|state| {
            state.last_id += 1;
            let handle = StorageHandle(state.last_id);
            state.entries.insert(handle, list);
            Ok(handle)
        })
    }

    /// Store a deep copy of a spectrum list, returning its handle.
    pub fn store_spectrum(&self, points: &SpectrumDataPoints) -> Result<StorageHandle, StoreError> {
        self.insert(StoredList::Spectrum(points.clone()))
    }

    /// Store a deep copy of a chromatogram list, returning its handle.
    pub fn store_chromatogram(
        &self,
        points: &ChromatogramDataPoints,
    ) -> Result<StorageHandle, StoreError> {
        self.insert(StoredList::Chromatogram(points.clone()))
    }

    /// Store a deep copy of a feature list, returning its handle.
    pub fn store_feature(&self, points: &FeatureDataPoints) -> Result<StorageHandle, StoreError> {
        self.insert(StoredList::Feature(points.clone()))
    }

    /// Copy the spectrum list stored under `handle` into `into`.
    pub fn read_spectrum(
        &self,
        handle: StorageHandle,
        into: &mut SpectrumDataPoints,
    ) -> Result<(), StoreError> {
        self.with_state(|state| match state.entries.get(&handle) {
            Some(StoredList::Spectrum(stored)) => {
                into.copy_from(stored);
                Ok(())
            }
            Some(other) => Err(StoreError::TypeMismatch {
                handle,
                expected: DataPointKind::Spectrum,
                found: other.kind(),
            }),
            None => Err(StoreError::NotFound(handle)),
        })
    }

    /// Copy the chromatogram list stored under `handle` into `into`.
    pub fn read_chromatogram(
        &self,
        handle: StorageHandle,
        into: &mut ChromatogramDataPoints,
    ) -> Result<(), StoreError> {
        self.with_state(|state| match state.entries.get(&handle) {
            Some(StoredList::Chromatogram(stored)) => {
                into.copy_from(stored);
                Ok(())
            }
            Some(other) => Err(StoreError::TypeMismatch {
                handle,
                expected: DataPointKind::Chromatogram,
                found: other.kind(),
            }),
            None => Err(StoreError::NotFound(handle)),
        })
    }

    /// Copy the feature list stored under `handle` into `into`.
    pub fn read_feature(
        &self,
        handle: StorageHandle,
        into: &mut FeatureDataPoints,
    ) -> Result<(), StoreError> {
        self.with_state(|state| match state.entries.get(&handle) {
            Some(StoredList::Feature(stored)) => {
                into.copy_from(stored);
                Ok(())
            }
            Some(other) => Err(StoreError::TypeMismatch {
                handle,
                expected: DataPointKind::Feature,
                found: other.kind(),
            }),
            None => Err(StoreError::NotFound(handle)),
        })
    }

    /// Remove the entry under `handle` if present. Removing an absent handle
    /// is a silent no-op.
    pub fn remove(&self, handle: StorageHandle) -> Result<(), StoreError> {
        self.with_state(|state| {
            state.entries.shift_remove(&handle);
            Ok(())
        })
    }

    /// The number of live entries.
    pub fn len(&self) -> Result<usize, StoreError> {
        self.with_state(|state| Ok(state.entries.len()))
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Irreversibly free all entries. Idempotent; every operation after this
    /// fails with [`StoreError::Disposed`].
    pub fn dispose(&self) {
        let mut guard = self.state.lock();
        if let Some(state) = guard.take() {
            log::debug!("Disposing data point store with {} entries", state.entries.len());
        }
    }
}
