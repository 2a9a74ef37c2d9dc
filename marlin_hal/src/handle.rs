// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::{HandleKind, NativeBackend, RawHandle};
use crate::error::Status;
use crate::{Error, Result};

/// Sole owner of one native handle.
///
/// The stored value is swapped to zero on release, so the backend sees a
/// release call at most once no matter how often [`release`](Self::release)
/// runs, and a released handle is never passed to the backend again. Dropping
/// the owner releases the handle if that hasn't happened yet.
pub struct NativeHandle {
    // Atomic so that release works through a shared reference, which lets an
    // explicit release and the drop path race safely.
    raw: AtomicU64,
    kind: HandleKind,
    backend: Arc<dyn NativeBackend>,
}

static_assertions::assert_impl_all!(NativeHandle: Send, Sync);

impl NativeHandle {
    /// Take ownership of the result of a native creation call.
    ///
    /// A failure status or a null handle becomes an error, so a
    /// `NativeHandle` always starts out live.
    pub fn from_creation(
        backend: &Arc<dyn NativeBackend>,
        kind: HandleKind,
        call: &'static str,
        result: core::result::Result<RawHandle, Status>,
    ) -> Result<Self> {
        let raw = result.map_err(|status| {
            log::warn!("{call} failed: {status}");
            Error::Native { call, status }
        })?;
        if raw.is_none() {
            return Err(Error::NullHandle(call));
        }
        log::debug!("{call}: {kind:?} {:#x}", raw.0);
        Ok(Self {
            raw: AtomicU64::new(raw.0),
            kind,
            backend: backend.clone(),
        })
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn backend(&self) -> &Arc<dyn NativeBackend> {
        &self.backend
    }

    /// The live handle value.
    pub fn raw(&self) -> Result<RawHandle> {
        self.live().ok_or(Error::Released(self.kind))
    }

    /// The live handle value, or `None` after release.
    #[inline]
    pub fn live(&self) -> Option<RawHandle> {
        match self.raw.load(Ordering::Acquire) {
            0 => None,
            raw => Some(RawHandle(raw)),
        }
    }

    /// Like [`live`](Self::live), but logs when the handle is gone.
    pub(crate) fn live_for(&self, call: &str) -> Option<RawHandle> {
        let raw = self.live();
        if raw.is_none() {
            log::warn!("{call}: {:?} handle already released", self.kind);
        }
        raw
    }

    /// The value to pass for an optional resource argument.
    ///
    /// An absent resource maps to [`RawHandle::NONE`]. A released one maps
    /// to `None`, and the call should be refused.
    pub(crate) fn optional(handle: Option<&Self>, call: &str) -> Option<RawHandle> {
        match handle {
            None => Some(RawHandle::NONE),
            Some(handle) => handle.live_for(call),
        }
    }

    pub fn is_released(&self) -> bool {
        self.live().is_none()
    }

    /// Release the handle. Returns whether this call did the release.
    pub fn release(&self) -> bool {
        match self.raw.swap(0, Ordering::AcqRel) {
            0 => false,
            raw => {
                log::debug!("release {:?} {raw:#x}", self.kind);
                self.backend.release(self.kind, RawHandle(raw));
                true
            }
        }
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &self.kind)
            .field("raw", &self.live())
            .finish_non_exhaustive()
    }
}
