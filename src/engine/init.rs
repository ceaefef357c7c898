use std::sync::atomic::{AtomicUsize, Ordering};

use crate::foundation::error::{LottieError, LottieResult};

/// Upper bound on live engine references across the process.
pub const MAX_ENGINE_REFS: usize = u32::MAX as usize;

static ENGINE_REFS: AtomicUsize = AtomicUsize::new(0);

/// One reference on the process-wide rendering engine.
///
/// Acquired once per session at create time and released when the session drops, so init and
/// teardown track session lifetimes rather than process start/exit.
#[derive(Debug)]
pub struct EngineGuard {
    _private: (),
}

impl EngineGuard {
    /// Take a reference, failing when the counter is saturated.
    pub fn acquire() -> LottieResult<Self> {
        let mut cur = ENGINE_REFS.load(Ordering::Acquire);
        loop {
            if cur >= MAX_ENGINE_REFS {
                return Err(LottieError::engine_init(format!(
                    "engine reference count saturated at {cur}"
                )));
            }
            match ENGINE_REFS.compare_exchange_weak(
                cur,
                cur + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
        if cur == 0 {
            tracing::debug!("rendering engine initialized");
        }
        Ok(Self { _private: () })
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        let prev = ENGINE_REFS.fetch_sub(1, Ordering::AcqRel);
        if prev == 1 {
            tracing::debug!("rendering engine terminated");
        }
    }
}

/// Number of live engine references.
pub fn active_refs() -> usize {
    ENGINE_REFS.load(Ordering::Acquire)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/init.rs"]
mod tests;
