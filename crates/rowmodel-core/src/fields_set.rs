//! Per-field "modified" flags for a model's current row.
//!
//! The flags drive selective UPDATE: only columns whose bit is set appear in
//! the SET clause. A bit is set by the model's value setter and cleared only
//! by an explicit reset.

/// A compact bitset with one bit per field index `0..len`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldsSet {
    len: usize,
    bits: Box<[u64]>,
}

impl FieldsSet {
    /// Create an empty (all-clear) set for `len` fields.
    #[must_use]
    pub fn empty(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            len,
            bits: vec![0u64; words].into_boxed_slice(),
        }
    }

    /// Grow the set by one trailing, clear bit.
    pub fn push(&mut self) {
        self.len += 1;
        if self.len.div_ceil(64) > self.bits.len() {
            let mut bits = self.bits.to_vec();
            bits.push(0);
            self.bits = bits.into_boxed_slice();
        }
    }

    /// Insert a clear bit at index 0, shifting every other bit up by one.
    pub fn insert_front(&mut self) {
        let previous = self.clone();
        *self = Self::empty(previous.len + 1);
        for idx in previous.iter() {
            self.set(idx + 1);
        }
    }

    /// Set or clear the bit for a field index.
    ///
    /// Indices outside `0..len` are ignored.
    pub fn assign(&mut self, idx: usize, value: bool) {
        if idx >= self.len {
            return;
        }
        let word = idx / 64;
        let bit = idx % 64;
        if let Some(w) = self.bits.get_mut(word) {
            if value {
                *w |= 1u64 << bit;
            } else {
                *w &= !(1u64 << bit);
            }
        }
    }

    /// Mark a field index as modified.
    pub fn set(&mut self, idx: usize) {
        self.assign(idx, true);
    }

    /// Clear every bit.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
    }

    /// Check whether a field index is set.
    #[must_use]
    pub fn is_set(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let word = idx / 64;
        let bit = idx % 64;
        self.bits
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// True if at least one bit is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.bits.iter().any(|w| *w != 0)
    }

    /// Indices of the set bits, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |idx| self.is_set(*idx))
    }
}
