// SPDX-License-Identifier: Apache-2.0

//! Marker trait for types that may live inside a bus segment.

/// Types that can be copied in and out of shared memory as raw bytes.
///
/// Record and metadata type parameters of [`crate::Ring`] are bounded by
/// this trait. Segments are shared across address spaces and start out
/// kernel-zero-filled, so implementors must be fixed-size value types
/// with no pointers, references, heap handles, or drop logic, and every
/// bit pattern (all-zeroes included) must be a valid value. `bool` and
/// `char` fail the last requirement and are deliberately not covered.
///
/// User record types opt in explicitly:
///
/// ```
/// use shmbus_core::Plain;
///
/// #[repr(C)]
/// #[derive(Clone, Copy)]
/// struct Sample {
///     sensor: u32,
///     reading: f64,
/// }
///
/// // SAFETY: repr(C), all fields are Plain, any bit pattern is valid.
/// unsafe impl Plain for Sample {}
/// ```
///
/// # Safety
///
/// Implementors guarantee the requirements above. Violating them makes
/// reading a record out of a segment undefined behavior.
pub unsafe trait Plain: Copy + Send + Sync + 'static {}

macro_rules! impl_plain {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: fixed-size primitive, no indirection, no invalid
            // bit patterns.
            unsafe impl Plain for $t {}
        )*
    };
}

impl_plain! {
    // Signed integers
    i8, i16, i32, i64, i128, isize,

    // Unsigned integers
    u8, u16, u32, u64, u128, usize,

    // Floats
    f32, f64,
}

// SAFETY: a zero-sized metadata region is trivially valid; () is the
// default metadata parameter for rings that carry none.
unsafe impl Plain for () {}

// SAFETY: arrays of Plain values contain no padding surprises beyond
// their element type's own.
unsafe impl<T: Plain, const N: usize> Plain for [T; N] {}
