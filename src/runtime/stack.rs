//! Native stack headroom for recursive walks
//!
//! Evaluation, reading, printing and comparison all recurse on the shape of
//! the input. Each recursive step runs through [`guarded`], which moves onto
//! a freshly allocated stack segment when the current one runs low.

/// Remaining stack below which a new segment is allocated
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Runs `f`, first growing the stack if less than [`RED_ZONE`] remains
#[inline]
pub fn guarded<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
