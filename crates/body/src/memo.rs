//! Once-only memoized retrieval.
//!
//! [`Memo`] is the single-execution barrier shared by every representation of a
//! [`Body`](crate::Body). The first caller runs the fetch, concurrent callers block until it
//! completes, and everybody observes the same outcome afterwards. Failures are cached just like
//! values: a slot never retries.

use once_cell::sync::OnceCell;
use std::fmt;

use crate::HostCallError;

/// A once-only slot holding either a fetched value or the failure of its fetch.
pub struct Memo<T> {
    cell: OnceCell<Result<T, HostCallError>>,
}

impl<T> Memo<T> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Returns the cached outcome, running `fetch` if this is the first call.
    ///
    /// `fetch` runs at most once per `Memo` even when many threads race on the first call. If
    /// `fetch` panics the slot stays uncomputed and the panic propagates to its caller.
    pub fn get_or_fetch<F>(&self, fetch: F) -> Result<&T, HostCallError>
    where
        F: FnOnce() -> Result<T, HostCallError>,
    {
        match self.cell.get_or_init(fetch) {
            Ok(value) => Ok(value),
            Err(e) => Err(e.clone()),
        }
    }

    /// Returns the cached outcome without fetching.
    pub fn get(&self) -> Option<Result<&T, HostCallError>> {
        self.cell.get().map(|result| result.as_ref().map_err(Clone::clone))
    }

    #[inline]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("Memo").field("state", &state).finish()
    }
}
