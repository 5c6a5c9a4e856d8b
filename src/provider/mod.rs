//! Parameter data providers
//!
//! A provider is created on the agent from one distributed
//! [`crate::data::ParameterDataConfig`] and hands out values to worker
//! threads according to the config's [`ParameterProviderLevel`]:
//!
//! - **PerThread**: a new thread starts at the first value, every further
//!   call from that thread moves it to the next value, wrapping at the end.
//! - **PerThreadStatic**: thread `t` always gets value `t mod pool_size`.
//! - **PerInvocation**: one shared cursor advances on every call from any
//!   thread.
//!
//! Providers are shared between worker threads (`Send + Sync`). Cursor state
//! lives behind a mutex held only while the next index is computed.

pub mod file_names;
pub mod list;
pub mod range;
pub mod registry;
pub mod sequence;

pub use file_names::FileNamesParameterDataProvider;
pub use list::ListParameterDataProvider;
pub use range::RangeParameterDataProvider;
pub use registry::{ProviderConstructor, ProviderRegistry};
pub use sequence::SequenceParameterDataProvider;

use crate::data::{ArgumentValue, ParameterProviderLevel};
use crate::distribution::sequential::WrappingCursor;
use crate::error::Error;
use crate::Result;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Small sequential id of the calling thread, assigned on first use
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| match id.get() {
        Some(id) => id,
        None => {
            let new_id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
            id.set(Some(new_id));
            new_id
        }
    })
}

/// Generates values for one parameter
pub trait ParameterDataProvider: Send + Sync {
    fn parameter_name(&self) -> &str;

    fn level(&self) -> ParameterProviderLevel;

    /// Validate the config and reset every cursor
    ///
    /// May be called again to start over.
    fn initialize(&self) -> Result<()>;

    fn generate_new_value_per_thread(&self, thread_id: u64, previous: &[ArgumentValue]) -> Result<ArgumentValue>;

    fn generate_new_value_per_thread_static(&self, thread_id: u64, previous: &[ArgumentValue])
        -> Result<ArgumentValue>;

    fn generate_new_value_per_invocation(&self, previous: &[ArgumentValue]) -> Result<ArgumentValue>;

    /// Next value for `thread_id` according to the provider level
    ///
    /// `previous` holds values already generated for the same invocation,
    /// which templated file patterns can refer to.
    fn get_value_for_thread(&self, thread_id: u64, previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        match self.level() {
            ParameterProviderLevel::PerThread => self.generate_new_value_per_thread(thread_id, previous),
            ParameterProviderLevel::PerThreadStatic => self.generate_new_value_per_thread_static(thread_id, previous),
            ParameterProviderLevel::PerInvocation => self.generate_new_value_per_invocation(previous),
        }
    }

    /// Next value for the calling thread
    fn get_value(&self, previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        self.get_value_for_thread(current_thread_id(), previous)
    }
}

#[derive(Debug, Default)]
struct CursorState {
    initialized: bool,
    per_thread: HashMap<u64, u64>,
    shared: WrappingCursor,
}

/// Index cursors over a pool of values, one set per provider
#[derive(Debug)]
pub(crate) struct PoolCursors {
    parameter: String,
    state: Mutex<CursorState>,
}

impl PoolCursors {
    pub(crate) fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            state: Mutex::new(CursorState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CursorState> {
        // cursor data stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn initialized(&self) -> Result<MutexGuard<'_, CursorState>> {
        let state = self.lock();
        if !state.initialized {
            return Err(Error::NotInitialized {
                parameter: self.parameter.clone(),
            });
        }
        Ok(state)
    }

    /// Forget all per-thread positions and rewind the shared cursor
    pub(crate) fn reset(&self) {
        let mut state = self.lock();
        state.per_thread.clear();
        state.shared.reset();
        state.initialized = true;
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        self.initialized().map(|_| ())
    }

    pub(crate) fn next_per_thread(&self, thread_id: u64, len: u64) -> Result<u64> {
        let mut state = self.initialized()?;
        let index = match state.per_thread.get(&thread_id) {
            Some(&current) => crate::distribution::sequential::wrap_next(current, len),
            None => 0,
        };
        state.per_thread.insert(thread_id, index);
        Ok(index)
    }

    pub(crate) fn per_thread_static(&self, thread_id: u64, len: u64) -> Result<u64> {
        self.ensure_initialized()?;
        Ok(if len == 0 { 0 } else { thread_id % len })
    }

    pub(crate) fn next_per_invocation(&self, len: u64) -> Result<u64> {
        let mut state = self.initialized()?;
        Ok(state.shared.next_index(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursors_require_initialize() {
        let cursors = PoolCursors::new("p");
        assert!(matches!(cursors.next_per_invocation(3), Err(Error::NotInitialized { .. })));
        cursors.reset();
        assert_eq!(cursors.next_per_invocation(3).unwrap(), 0);
    }

    #[test]
    fn test_per_thread_cursors_independent() {
        let cursors = PoolCursors::new("p");
        cursors.reset();
        assert_eq!(cursors.next_per_thread(1, 3).unwrap(), 0);
        assert_eq!(cursors.next_per_thread(1, 3).unwrap(), 1);
        assert_eq!(cursors.next_per_thread(2, 3).unwrap(), 0);
        assert_eq!(cursors.next_per_thread(1, 3).unwrap(), 2);
        assert_eq!(cursors.next_per_thread(1, 3).unwrap(), 0);
    }

    #[test]
    fn test_reset_rewinds() {
        let cursors = PoolCursors::new("p");
        cursors.reset();
        cursors.next_per_invocation(5).unwrap();
        cursors.next_per_thread(4, 5).unwrap();
        cursors.reset();
        assert_eq!(cursors.next_per_invocation(5).unwrap(), 0);
        assert_eq!(cursors.next_per_thread(4, 5).unwrap(), 0);
    }

    #[test]
    fn test_current_thread_id_stable() {
        let first = current_thread_id();
        assert_eq!(current_thread_id(), first);

        let other = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(other, first);
    }
}
