// SPDX-FileCopyrightText: 2025 Contributors to the DMO resampler shim project.
// SPDX-License-Identifier: Apache-2.0

//! Registry of live handles.
//!
//! Every handle handed out across the boundary is recorded here. Destroying a
//! handle retires it: the object behind it is released, but the small cell at
//! the handle's address stays allocated for the life of the process. An
//! address is therefore never handed out twice, and a stale handle can never
//! alias a newer object. Calls with a null, foreign or retired handle are
//! rejected instead of touching someone else's memory.

use std::collections::BTreeSet;
use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Why a handle was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejected {
    Null,
    /// Destroyed earlier through this registry.
    Retired,
    /// Never handed out by this registry.
    Unknown,
}

#[derive(Default)]
struct Handles {
    live: BTreeSet<usize>,
    retired: BTreeSet<usize>,
}

pub(crate) struct HandleRegistry {
    handles: Mutex<Handles>,
}

impl HandleRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            handles: Mutex::new(Handles {
                live: BTreeSet::new(),
                retired: BTreeSet::new(),
            }),
        }
    }

    pub(crate) fn insert(&self, handle: *mut c_void) {
        let mut handles = self.lock();
        // Retired cells are never freed, so the allocator cannot return one.
        debug_assert!(!handles.retired.contains(&(handle as usize)));
        handles.live.insert(handle as usize);
    }

    /// Moves a live `handle` to the retired set and runs `release` on it while
    /// the registry is locked. `release` must free the payload but keep the
    /// cell at `handle` allocated.
    pub(crate) fn retire(
        &self,
        handle: *mut c_void,
        release: impl FnOnce(*mut c_void),
    ) -> Result<(), Rejected> {
        if handle.is_null() {
            return Err(Rejected::Null);
        }
        let mut handles = self.lock();
        if !handles.live.remove(&(handle as usize)) {
            return Err(handles.rejection(handle));
        }
        handles.retired.insert(handle as usize);
        release(handle);
        Ok(())
    }

    /// Runs `f` if `handle` is live, holding the registry lock so the handle
    /// cannot be retired meanwhile.
    pub(crate) fn access<R>(
        &self,
        handle: *mut c_void,
        f: impl FnOnce() -> R,
    ) -> Result<R, Rejected> {
        if handle.is_null() {
            return Err(Rejected::Null);
        }
        let handles = self.lock();
        if !handles.live.contains(&(handle as usize)) {
            return Err(handles.rejection(handle));
        }
        Ok(f())
    }

    fn lock(&self) -> MutexGuard<'_, Handles> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Handles {
    fn rejection(&self, handle: *mut c_void) -> Rejected {
        if self.retired.contains(&(handle as usize)) {
            Rejected::Retired
        } else {
            Rejected::Unknown
        }
    }
}
