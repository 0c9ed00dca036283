//! # Signatures
//!
//! A signature is a fixed-width bitset over component ids. Bit `i` set means
//! "has the component with id `i`". Entities use it to record what they carry,
//! systems use it to record what they require.
//!
//! ```text
//! entity:  0b1011   (Transform, RigidBody, Sprite)
//! system:  0b0011   (Transform, RigidBody)
//! entity & system == system  ->  member
//! ```

use std::fmt;

use super::component::ComponentId;

/// Number of `u64` words in a signature.
pub const SIGNATURE_WORDS: usize = 4;

/// Widest component id range a signature can describe.
pub const SIGNATURE_BITS: usize = SIGNATURE_WORDS * 64;

/// Bitset of component ids.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    words: [u64; SIGNATURE_WORDS],
}

impl Signature {
    /// An empty signature.
    pub const EMPTY: Self = Self {
        words: [0; SIGNATURE_WORDS],
    };

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    #[inline]
    const fn locate(id: ComponentId) -> (usize, u64) {
        let index = id.index();
        debug_assert!(index < SIGNATURE_BITS, "component id outside signature");
        (index / 64, 1u64 << (index % 64))
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentId) {
        let (word, mask) = Self::locate(id);
        self.words[word] |= mask;
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn clear(&mut self, id: ComponentId) {
        let (word, mask) = Self::locate(id);
        self.words[word] &= !mask;
    }

    /// Returns `true` if the bit for `id` is set.
    #[inline]
    #[must_use]
    pub const fn test(&self, id: ComponentId) -> bool {
        let (word, mask) = Self::locate(id);
        self.words[word] & mask != 0
    }

    /// Returns `true` if every bit set in `required` is also set in `self`.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, required: &Signature) -> bool {
        self.words
            .iter()
            .zip(required.words.iter())
            .all(|(have, need)| have & need == *need)
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.words = [0; SIGNATURE_WORDS];
    }

    /// Iterates over the set component ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let base = word_index * 64;
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let tz = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    #[allow(clippy::cast_possible_truncation)]
                    Some(ComponentId::new((base + tz) as u16))
                })
            })
    }
}

impl FromIterator<ComponentId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentId>>(iter: I) -> Self {
        let mut signature = Self::new();
        for id in iter {
            signature.set(id);
        }
        signature
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(ComponentId::index)).finish()
    }
}
