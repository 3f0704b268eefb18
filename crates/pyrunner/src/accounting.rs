//! Wall-clock and memory accounting around a unit of work
//!
//! Memory is observed through [`TrackingAllocator`], which counts live heap
//! bytes of the whole engine process. The binary installs it as the global
//! allocator; when it is not installed every measured delta is zero.
//!
//! The counter is process-wide, so concurrent requests see each other's
//! allocations. Snippets run in child processes and are not observed at all.

use std::alloc::{GlobalAlloc, Layout, System};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);

/// System allocator wrapper that counts live bytes
///
/// ```ignore
/// #[global_allocator]
/// static GLOBAL: pyrunner::TrackingAllocator = pyrunner::TrackingAllocator::new();
/// ```
#[derive(Debug, Default)]
pub struct TrackingAllocator;

impl TrackingAllocator {
    pub const fn new() -> Self {
        Self
    }

    /// Bytes currently allocated through this allocator
    pub fn live_bytes() -> usize {
        LIVE_BYTES.load(Ordering::Relaxed)
    }
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded unchanged to the system allocator
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded unchanged to the system allocator
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: `ptr` was allocated by `System` with this layout
        unsafe { System.dealloc(ptr, layout) };
        LIVE_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: `ptr` was allocated by `System` with this layout
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                LIVE_BYTES.fetch_add(new_size - layout.size(), Ordering::Relaxed);
            } else {
                LIVE_BYTES.fetch_sub(layout.size() - new_size, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

/// What a measured unit of work cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub elapsed: Duration,

    /// Growth of live heap bytes over the work, never negative
    pub memory_delta_bytes: usize,
}

impl Measurement {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn memory_delta_mb(&self) -> f64 {
        self.memory_delta_bytes as f64 / BYTES_PER_MB
    }
}

/// Run `work` and measure its wall-clock time and memory delta
pub async fn measure<F>(work: F) -> (F::Output, Measurement)
where
    F: Future,
{
    let baseline = TrackingAllocator::live_bytes();
    let start = Instant::now();

    let output = work.await;

    let elapsed = start.elapsed();
    let memory_delta_bytes = TrackingAllocator::live_bytes().saturating_sub(baseline);
    debug!(?elapsed, memory_delta_bytes, "measured work");

    (
        output,
        Measurement {
            elapsed,
            memory_delta_bytes,
        },
    )
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
