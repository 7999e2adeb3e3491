//! Load/store traits shared by the lane types.

pub trait Alignment<T> {
    /// `true` when `ptr` satisfies the lane type's preferred alignment.
    fn is_aligned(ptr: *const T) -> bool;
}

pub trait SimdLoad<T> {
    type Output;

    /// Loads a full vector, picking the aligned or unaligned path from `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `LANE_COUNT` readable values.
    unsafe fn load(ptr: *const T) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must be 32-byte aligned and point to at least `LANE_COUNT` readable values.
    unsafe fn load_aligned(ptr: *const T) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must point to at least `LANE_COUNT` readable values.
    unsafe fn load_unaligned(ptr: *const T) -> Self::Output;
}

pub trait SimdStore<T> {
    /// Stores a full vector, picking the aligned or unaligned path from `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `LANE_COUNT` writable values.
    unsafe fn store_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must be 32-byte aligned and point to at least `LANE_COUNT` writable values.
    unsafe fn store_aligned_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must point to at least `LANE_COUNT` writable values.
    unsafe fn store_unaligned_at(&self, ptr: *mut T);
}
