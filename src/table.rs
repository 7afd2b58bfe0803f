//! Match-finder hash tables and their pool
//!
//! A table maps the hash of a 4-byte window to the most recent input
//! position holding that window. There is one slot per hash and no
//! chaining, so a collision overwrites the previous entry.
//!
//! Two widths exist: 16-bit positions for inputs under the 64K limit and
//! 32-bit positions otherwise. The narrow table halves the memory per entry
//! and spends it on one extra bit of hash.

use alloc::vec;
use alloc::vec::Vec;

/// Knuth multiplicative hash constant
pub const HASH_MULTIPLIER: u32 = 2_654_435_761;

/// Inputs shorter than this use the narrow table
pub const LIMIT_64K: usize = 65_536 + crate::encoder::MF_LIMIT - 1;

/// Integer type used to store positions in a hash table
pub trait Position: Copy + Default + PartialEq + 'static {
    /// log2 of the number of table slots
    const HASH_LOG: u32;

    /// Convert an input position into a table entry
    fn from_index(index: usize) -> Self;

    /// Convert a table entry back into an input position
    fn index(self) -> usize;
}

impl Position for u16 {
    const HASH_LOG: u32 = 13;

    #[inline]
    fn from_index(index: usize) -> Self {
        index as u16
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl Position for u32 {
    const HASH_LOG: u32 = 12;

    #[inline]
    fn from_index(index: usize) -> Self {
        index as u32
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Single-slot hash table of input positions
#[derive(Debug, Clone)]
pub struct HashTable<P> {
    slots: Vec<P>,
}

impl<P: Position> HashTable<P> {
    /// Number of slots
    pub const SIZE: usize = 1 << P::HASH_LOG;

    /// Create a zeroed table
    pub fn new() -> Self {
        Self {
            slots: vec![P::default(); Self::SIZE],
        }
    }

    /// Hash a 4-byte window into a slot index
    #[inline]
    pub fn hash(sequence: u32) -> usize {
        (sequence.wrapping_mul(HASH_MULTIPLIER) >> (32 - P::HASH_LOG)) as usize
    }

    /// Position stored in slot `hash`
    #[inline]
    pub fn get(&self, hash: usize) -> usize {
        self.slots[hash].index()
    }

    /// Record `position` in slot `hash`
    #[inline]
    pub fn put(&mut self, hash: usize, position: usize) {
        self.slots[hash] = P::from_index(position);
    }

    /// Zero every slot
    #[inline]
    pub fn clear(&mut self) {
        self.slots.fill(P::default());
    }

    /// Check that every slot is zero
    pub fn is_clear(&self) -> bool {
        self.slots.iter().all(|slot| *slot == P::default())
    }
}

impl<P: Position> Default for HashTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Table width selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// 16-bit positions
    Narrow,
    /// 32-bit positions
    Wide,
}

impl TableMode {
    /// Pick the table width for an input of `len` bytes
    #[inline]
    pub const fn for_input_len(len: usize) -> Self {
        if len < LIMIT_64K {
            TableMode::Narrow
        } else {
            TableMode::Wide
        }
    }
}

/// Borrowed, zeroed table returned by [`TablePool::acquire`]
#[derive(Debug)]
pub enum TableRef<'a> {
    /// 16-bit position table
    Narrow(&'a mut HashTable<u16>),
    /// 32-bit position table
    Wide(&'a mut HashTable<u32>),
}

/// Owner of the reusable hash tables for one thread of execution
///
/// Each width is allocated on first use and kept for later calls.
#[derive(Debug, Default)]
pub struct TablePool {
    narrow: Option<HashTable<u16>>,
    wide: Option<HashTable<u32>>,
}

impl TablePool {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            narrow: None,
            wide: None,
        }
    }

    /// Borrow a zeroed table of the given width
    pub fn acquire(&mut self, mode: TableMode) -> TableRef<'_> {
        match mode {
            TableMode::Narrow => {
                let table = self.narrow.get_or_insert_with(HashTable::new);
                table.clear();
                TableRef::Narrow(table)
            }
            TableMode::Wide => {
                let table = self.wide.get_or_insert_with(HashTable::new);
                table.clear();
                TableRef::Wide(table)
            }
        }
    }

    /// Whether a table of the given width has been allocated
    pub fn is_allocated(&self, mode: TableMode) -> bool {
        match mode {
            TableMode::Narrow => self.narrow.is_some(),
            TableMode::Wide => self.wide.is_some(),
        }
    }
}
