//! C ABI over [`RenderSession`].
//!
//! Sessions live in a process-wide registry keyed by opaque non-zero handles. Handles are never
//! reused, so calls on a destroyed or unknown handle find nothing and return without effect.
//! Every entry point catches panics; nothing unwinds into the host.
//!
//! Unlike the safe API, [`lottie_bind_target`] retains the host pointer. The host keeps the
//! pixel memory valid and exclusively lent to this library until the next bind or
//! [`lottie_destroy`], the same contract as a locked platform bitmap.

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, RwLock};

use crate::foundation::core::TargetSize;
use crate::session::render_session::{RenderSession, SessionOpts};

/// Opaque session handle. `0` is never a valid session.
pub type LottieHandle = u64;

/// Handle returned when creation fails.
pub const NULL_HANDLE: LottieHandle = 0;

/// Host pixel memory retained between bind and render.
struct BoundPixels {
    ptr: *mut u32,
    len: usize,
}

// SAFETY: the pointer is only dereferenced while the owning slot's mutex is held, and the host
// guarantees the memory stays valid until rebind or destroy.
unsafe impl Send for BoundPixels {}

struct Slot {
    session: RenderSession,
    pixels: Mutex<Option<BoundPixels>>,
}

static REGISTRY: LazyLock<RwLock<HashMap<LottieHandle, Arc<Slot>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn lookup(handle: LottieHandle) -> Option<Arc<Slot>> {
    if handle == NULL_HANDLE {
        return None;
    }
    REGISTRY.read().get(&handle).cloned()
}

fn guarded<R>(entry: &'static str, fallback: R, f: impl FnOnce() -> R) -> R {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!(entry, "panic caught at ffi boundary");
        fallback
    })
}

/// Load an animation and return its session handle.
///
/// When `out_info` is non-null it receives `[frame_count, duration_ms]`, both zero if the
/// animation failed to load. A failed load still returns a handle to an inert session.
/// Returns [`NULL_HANDLE`] when the engine cannot be initialized or `data` is null with a
/// non-zero `len`.
///
/// # Safety
///
/// `data` must point to `len` readable bytes (or be null when `len` is 0). `out_info`, if
/// non-null, must point to two writable `i32`s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lottie_create(
    data: *const u8,
    len: usize,
    out_info: *mut i32,
) -> LottieHandle {
    guarded("lottie_create", NULL_HANDLE, || {
        let bytes: &[u8] = if data.is_null() {
            if len != 0 {
                tracing::error!(len, "lottie_create: null data");
                return NULL_HANDLE;
            }
            &[]
        } else {
            // SAFETY: caller guarantees `data` points to `len` readable bytes.
            unsafe { std::slice::from_raw_parts(data, len) }
        };

        let session = match RenderSession::create_with(
            bytes,
            &crate::engine::cpu::CpuEngine,
            SessionOpts::from_env(),
        ) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "lottie_create failed");
                return NULL_HANDLE;
            }
        };

        if !out_info.is_null() {
            let (frames, duration_ms) = session.info().map_or((0, 0), |info| {
                (
                    i32::try_from(info.frame_count).unwrap_or(i32::MAX),
                    i32::try_from(info.duration_ms).unwrap_or(i32::MAX),
                )
            });
            // SAFETY: caller guarantees two writable i32s at `out_info`.
            unsafe {
                out_info.write(frames);
                out_info.add(1).write(duration_ms);
            }
        }

        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(Slot {
            session,
            pixels: Mutex::new(None),
        });
        REGISTRY.write().insert(handle, slot);
        tracing::debug!(handle, "session registered");
        handle
    })
}

/// Release a session. Unknown, null, or already destroyed handles are ignored.
///
/// A render running on another thread finishes before the session's resources are freed.
#[unsafe(no_mangle)]
pub extern "C" fn lottie_destroy(handle: LottieHandle) {
    guarded("lottie_destroy", (), || {
        if handle == NULL_HANDLE {
            return;
        }
        let removed = REGISTRY.write().remove(&handle);
        match removed {
            Some(slot) => {
                // Drop the host pointer now even if a render still holds the slot.
                slot.pixels.lock().take();
                tracing::debug!(handle, "session destroyed");
            }
            None => tracing::debug!(handle, "lottie_destroy on unknown handle"),
        }
    })
}

/// Bind `pixels` (`width * height` packed 32-bit pixels, row-major, no padding) as the render
/// target. Fractional sizes truncate. An invalid size or null `pixels` leaves the session
/// unbound.
///
/// # Safety
///
/// `pixels` must point to at least `trunc(width) * trunc(height)` writable `u32`s that stay
/// valid, and are not accessed by the host during renders, until the next bind or destroy.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lottie_bind_target(
    handle: LottieHandle,
    pixels: *mut u32,
    width: f32,
    height: f32,
) {
    guarded("lottie_bind_target", (), || {
        let Some(slot) = lookup(handle) else {
            tracing::debug!(handle, "lottie_bind_target on unknown handle");
            return;
        };
        let mut bound = slot.pixels.lock();
        *bound = None;

        let len = match TargetSize::from_device(width, height) {
            Ok(size) if !pixels.is_null() => size.pixel_count(),
            _ => 0,
        };
        let buffer: &mut [u32] = if len == 0 {
            &mut []
        } else {
            // SAFETY: caller guarantees `len` writable pixels at `pixels`.
            unsafe { std::slice::from_raw_parts_mut(pixels, len) }
        };
        slot.session.bind_target(buffer, width, height);
        if slot.session.is_bound() {
            *bound = Some(BoundPixels { ptr: pixels, len });
        }
    })
}

/// Render `frame` into the bound target, returning once every pixel is written. No-op without a
/// loaded animation or bound target.
///
/// # Safety
///
/// The memory passed to the last [`lottie_bind_target`] on this handle must still be valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lottie_render_frame(handle: LottieHandle, frame: f32) {
    guarded("lottie_render_frame", (), || {
        let Some(slot) = lookup(handle) else {
            return;
        };
        let bound = slot.pixels.lock();
        let Some(px) = bound.as_ref() else {
            tracing::debug!(handle, "lottie_render_frame without bound target");
            return;
        };
        // SAFETY: the pointer was validated at bind time and the host keeps it alive until
        // rebind or destroy; the slot mutex serializes access.
        let buffer = unsafe { std::slice::from_raw_parts_mut(px.ptr, px.len) };
        slot.session.render_frame(frame, buffer);
    })
}

/// Number of live sessions in the registry.
#[unsafe(no_mangle)]
pub extern "C" fn lottie_session_count() -> usize {
    guarded("lottie_session_count", 0, || REGISTRY.read().len())
}

#[cfg(test)]
#[path = "../tests/unit/ffi.rs"]
mod tests;
