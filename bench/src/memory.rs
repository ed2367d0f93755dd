// Heap accounting. `TrackingAllocator` wraps the system allocator and keeps
// the current and peak number of live bytes. The counters only move when a
// binary installs it as its global allocator; otherwise every reading is 0.
use std::{
    alloc::{GlobalAlloc, Layout, System},
    sync::atomic::{AtomicU64, Ordering},
};

static CURRENT: AtomicU64 = AtomicU64::new(0);
static PEAK: AtomicU64 = AtomicU64::new(0);

pub struct TrackingAllocator;

#[inline]
fn grow(bytes: usize) {
    let now = CURRENT.fetch_add(bytes as u64, Ordering::Relaxed) + bytes as u64;
    PEAK.fetch_max(now, Ordering::Relaxed);
}

#[inline]
fn shrink(bytes: usize) {
    CURRENT.fetch_sub(bytes as u64, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                grow(new_size - old_size);
            } else {
                shrink(old_size - new_size);
            }
        }
        new_ptr
    }
}

/// Bytes currently allocated through the tracking allocator.
pub fn current() -> u64 {
    CURRENT.load(Ordering::Relaxed)
}

pub fn peak() -> u64 {
    PEAK.load(Ordering::Relaxed)
}

/// Lowers the peak to the current usage.
pub fn reset_peak() {
    PEAK.store(current(), Ordering::Relaxed);
}

/// Heap usage around one timed operation.
#[derive(Debug, Clone, Copy)]
pub struct MemoryProbe {
    before: u64,
}

impl MemoryProbe {
    pub fn start() -> Self {
        reset_peak();
        Self { before: current() }
    }

    /// Returns `(peak_delta, size_delta)`. A peak reported by a subprocess
    /// replaces the in-process peak if it is larger.
    pub fn finish(&self, external_peak: u64) -> (u64, u64) {
        let peak_delta = peak().saturating_sub(self.before).max(external_peak);
        let size_delta = current().saturating_sub(self.before);
        (peak_delta, size_delta)
    }
}

const PEAK_MARKER: &str = ", peak: ";

/// Largest value following a `", peak: "` marker in a subprocess log, up to
/// the next comma. 0 when no marker parses.
pub fn peak_memory_from_log(log: &str) -> u64 {
    log.match_indices(PEAK_MARKER)
        .filter_map(|(at, _)| {
            let rest = &log[at + PEAK_MARKER.len()..];
            let end = rest.find(',').unwrap_or(rest.len());
            rest[..end].trim().parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0)
}
