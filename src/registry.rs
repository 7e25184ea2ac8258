// src/registry.rs
//! Handle registry: the leak / double-destroy ledger.
//!
//! The native library's own reference count is opaque, so this ledger is the
//! only place where "destroyed once more than created or referenced" can be
//! caught before it turns into a dangling pointer deep inside native code.
//! Every wrapper-side acquire records one outstanding unit together with the
//! call site that acquired it; every release removes one. Releasing a handle
//! with no outstanding unit is a programmer error and fails an assertion.
//!
//! The ledger is compiled in for test builds and behind the `handle_tracking`
//! feature; otherwise every operation is an inline no-op.

use std::panic::Location;

/// Where one outstanding unit was acquired.
#[derive(Debug, Clone, Copy)]
pub struct TrackSite {
    pub kind: &'static str,
    pub location: &'static Location<'static>,
}

/// A handle still outstanding at a diagnostic checkpoint.
#[derive(Debug, Clone)]
pub struct Leak {
    pub handle: usize,
    pub sites: Vec<TrackSite>,
}

#[cfg(any(test, feature = "handle_tracking"))]
mod imp {
    use std::panic::Location;
    use std::sync::{Mutex, MutexGuard};

    use hashbrown::HashMap;
    use lazy_static::lazy_static;

    use super::{Leak, TrackSite};

    lazy_static! {
        static ref LEDGER: Mutex<HashMap<usize, Vec<TrackSite>>> = Mutex::new(HashMap::new());
    }

    // Misuse panics unwind through tests that still hold wrappers, so a
    // poisoned lock must stay usable. The map itself is never left
    // half-updated: panics happen after the guard is dropped.
    fn ledger() -> MutexGuard<'static, HashMap<usize, Vec<TrackSite>>> {
        LEDGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn enabled() -> bool {
        true
    }

    /// Record one outstanding unit for `handle`, acquired at `site`.
    pub fn track(handle: usize, kind: &'static str, site: &'static Location<'static>) {
        log::trace!("track {kind} handle {handle:#x} at {site}");
        ledger().entry(handle).or_default().push(TrackSite { kind, location: site });
    }

    /// Remove one outstanding unit for `handle`.
    pub fn untrack(handle: usize, kind: &'static str) {
        let mut ledger = ledger();
        let removed = match ledger.get_mut(&handle) {
            Some(units) => {
                units.pop();
                if units.is_empty() {
                    ledger.remove(&handle);
                }
                true
            }
            None => false,
        };
        drop(ledger);

        if !removed {
            panic!("destroy of untracked {kind} handle {handle:#x} (double destroy?)");
        }
        log::trace!("untrack {kind} handle {handle:#x}");
    }

    /// Outstanding units for one handle.
    pub fn outstanding(handle: usize) -> usize {
        ledger().get(&handle).map_or(0, Vec::len)
    }

    /// Checkpoint run by the wrapper when it observes the last native
    /// reference go away: nothing may still be tracked for the handle.
    pub fn assert_released(handle: usize, kind: &'static str) {
        let n = outstanding(handle);
        if n != 0 {
            panic!("{kind} handle {handle:#x} freed with {n} tracked reference(s) outstanding");
        }
    }

    /// Enumerate every handle with outstanding units, logging each one. Meant
    /// for shutdown or the end of a test suite.
    pub fn report_leaks() -> Vec<Leak> {
        let snapshot: Vec<Leak> = ledger()
            .iter()
            .map(|(handle, units)| Leak { handle: *handle, sites: units.clone() })
            .collect();

        for leak in &snapshot {
            for site in &leak.sites {
                log::warn!(
                    "leaked {} handle {:#x}, tracked at {}",
                    site.kind,
                    leak.handle,
                    site.location
                );
            }
        }
        snapshot
    }

    /// Shutdown assertion: every tracked handle has been released.
    pub fn assert_clean() -> anyhow::Result<()> {
        let leaks = report_leaks();
        if !leaks.is_empty() {
            anyhow::bail!("{} handle(s) still outstanding", leaks.len());
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "handle_tracking"))]
pub use imp::*;

#[cfg(not(any(test, feature = "handle_tracking")))]
mod noop {
    use std::panic::Location;

    use super::Leak;

    #[inline]
    pub fn enabled() -> bool {
        false
    }

    #[inline]
    pub fn track(_handle: usize, _kind: &'static str, _site: &'static Location<'static>) {}

    #[inline]
    pub fn untrack(_handle: usize, _kind: &'static str) {}

    #[inline]
    pub fn outstanding(_handle: usize) -> usize {
        0
    }

    #[inline]
    pub fn assert_released(_handle: usize, _kind: &'static str) {}

    #[inline]
    pub fn report_leaks() -> Vec<Leak> {
        Vec::new()
    }

    #[inline]
    pub fn assert_clean() -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(not(any(test, feature = "handle_tracking")))]
pub use noop::*;
