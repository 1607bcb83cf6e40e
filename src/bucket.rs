//! Bucket Array
//!
//! Append-only slot storage with stable element addresses.
//!
//! Elements live in fixed-capacity buckets. Growth appends a new bucket and
//! never touches existing ones, so the address of an element is valid for the
//! container's entire lifetime even as unrelated appends allocate new
//! buckets. The array itself has no notion of "freed" slots; logical
//! emptiness is a concern of the owner (the pool's `id == 0` convention).

use smallvec::SmallVec;

/// Default number of slots per bucket.
pub const DEFAULT_BUCKET_CAPACITY: usize = 64;

/// Growable, append-only container of fixed-size buckets.
///
/// Amortized O(1) append, O(1) indexed access. Each bucket is allocated with
/// its exact capacity up front and only ever pushed to while below that
/// capacity, so its backing buffer never reallocates and element addresses
/// never move.
#[derive(Debug)]
pub struct BucketArray<T> {
    buckets: SmallVec<[Vec<T>; 4]>,
    bucket_capacity: usize,
    max_slots: usize,
    len: usize,
}

impl<T> BucketArray<T> {
    /// Creates an array with the default bucket size and no slot limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_BUCKET_CAPACITY, usize::MAX)
    }

    /// Creates an array with `bucket_capacity` slots per bucket and at most
    /// `max_slots` total slots.
    ///
    /// # Panics
    /// Panics if `bucket_capacity` is zero.
    #[must_use]
    pub fn with_limits(bucket_capacity: usize, max_slots: usize) -> Self {
        assert!(bucket_capacity > 0, "bucket capacity must be non-zero");
        Self {
            buckets: SmallVec::new(),
            bucket_capacity,
            max_slots,
            len: 0,
        }
    }

    /// Appends `value`, returning its stable slot index, or `None` if the
    /// slot limit is reached (existing elements are untouched either way).
    pub fn push(&mut self, value: T) -> Option<usize> {
        if self.len >= self.max_slots {
            return None;
        }
        let index = self.len;
        let bucket_idx = index / self.bucket_capacity;
        if bucket_idx >= self.buckets.len() {
            self.buckets.push(Vec::with_capacity(self.bucket_capacity));
        }
        // The target bucket is below capacity here, so this push never
        // reallocates its buffer.
        debug_assert!(self.buckets[bucket_idx].len() < self.bucket_capacity);
        self.buckets[bucket_idx].push(value);
        self.len += 1;
        Some(index)
    }

    /// Returns the element at `index`, or `None` if `index` was never
    /// returned by [`push`](Self::push).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.buckets
            .get(index / self.bucket_capacity)
            .and_then(|b| b.get(index % self.bucket_capacity))
    }

    /// Mutable access to the element at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        self.buckets
            .get_mut(index / self.bucket_capacity)
            .and_then(|b| b.get_mut(index % self.bucket_capacity))
    }

    /// Number of appended elements, including logically-freed ones.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no element has ever been appended.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured upper bound on total slots (`usize::MAX` if unlimited).
    #[inline]
    #[must_use]
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Iterates elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buckets.iter().flatten()
    }

    /// Iterates elements mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.buckets.iter_mut().flatten()
    }
}

impl<T> Default for BucketArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a BucketArray<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Vec<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_sequential_indices() {
        let mut arr = BucketArray::with_limits(4, usize::MAX);
        for i in 0..10 {
            assert_eq!(arr.push(i * 10), Some(i));
        }
        assert_eq!(arr.len(), 10);
        for i in 0..10 {
            assert_eq!(arr.get(i), Some(&(i * 10)));
        }
        assert_eq!(arr.get(10), None);
    }

    #[test]
    fn addresses_stay_stable_across_bucket_growth() {
        let mut arr = BucketArray::with_limits(2, usize::MAX);
        arr.push(7u64);
        let before = std::ptr::from_ref(arr.get(0).unwrap());

        // Force several new buckets to be allocated.
        for i in 0..100 {
            arr.push(i);
        }

        let after = std::ptr::from_ref(arr.get(0).unwrap());
        assert_eq!(before, after, "element 0 must never move");
        assert_eq!(*arr.get(0).unwrap(), 7);
    }

    #[test]
    fn push_respects_slot_limit() {
        let mut arr = BucketArray::with_limits(2, 3);
        assert_eq!(arr.push(1), Some(0));
        assert_eq!(arr.push(2), Some(1));
        assert_eq!(arr.push(3), Some(2));
        assert_eq!(arr.push(4), None);
        // Existing elements untouched.
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(2), Some(&3));
    }

    #[test]
    fn iter_visits_slot_order() {
        let mut arr = BucketArray::with_limits(3, usize::MAX);
        for i in 0..7 {
            arr.push(i);
        }
        let collected: Vec<i32> = arr.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3, 4, 5, 6]);
    }
}
