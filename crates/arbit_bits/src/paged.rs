//! Lazily paged atomic bit vector.

use crate::BitVector;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Type alias for the underlying block type.
type Word = AtomicU64;

/// Number of bits in a [Word].
const BITS_PER_WORD: u64 = u64::BITS as u64;

/// Words per page: 32 KiB of bits.
const WORDS_PER_PAGE: usize = 1 << 12;

/// Bits covered by one page.
pub const BITS_PER_PAGE: u64 = WORDS_PER_PAGE as u64 * BITS_PER_WORD;

/// Page slots in one directory leaf.
const PAGES_PER_LEAF: u64 = 1 << 12;

/// Leaf slots in one directory node.
const LEAVES_PER_NODE: u64 = 1 << 13;

const PAGES_PER_NODE: u64 = PAGES_PER_LEAF * LEAVES_PER_NODE;

type Page = Box<[Word]>;
type Leaf = Box<[OnceLock<Page>]>;
type Node = Box<[OnceLock<Leaf>]>;

/// A bit vector split into fixed-size pages allocated on first write.
///
/// Reads of a page that was never written return `false` without
/// allocating, and clearing a bit on such a page is free.
///
/// Pages hang off a three-level directory (root, node, leaf) whose nodes
/// and leaves are also allocated on first write. Only the root is
/// allocated up front: one slot per `2^25` pages, so 8192 slots for a
/// vector of `2^56` bits.
///
/// All operations are lock-free: directory entries and pages are
/// installed once through [`OnceLock`] and bits are updated with atomic
/// read-modify-write.
#[derive(Debug)]
pub struct PagedBitVector {
    length: u64,
    page_count: u64,
    root: Box<[OnceLock<Node>]>,
}

fn empty_slots<T>(count: u64) -> Box<[OnceLock<T>]> {
    (0..count).map(|_| OnceLock::new()).collect()
}

fn empty_page() -> Page {
    (0..WORDS_PER_PAGE).map(|_| Word::new(0)).collect()
}

impl PagedBitVector {
    /// Number of pages that have been materialized.
    #[must_use]
    pub fn allocated_pages(&self) -> usize {
        self.pages().count()
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u64 {
        self.pages()
            .flat_map(|page| page.iter())
            .map(|word| u64::from(word.load(Ordering::Acquire).count_ones()))
            .sum()
    }

    /// Every materialized page, in position order.
    fn pages(&self) -> impl Iterator<Item = &Page> {
        self.root
            .iter()
            .filter_map(OnceLock::get)
            .flat_map(|node| node.iter())
            .filter_map(OnceLock::get)
            .flat_map(|leaf| leaf.iter())
            .filter_map(OnceLock::get)
    }

    /// Splits `pos` into (page, word within page, bit mask).
    #[inline]
    fn locate(&self, pos: u64) -> (u64, usize, u64) {
        assert!(
            pos < self.length,
            "bit index {pos} out of range for length {}",
            self.length
        );
        let word = pos / BITS_PER_WORD;
        let page = word / WORDS_PER_PAGE as u64;
        let slot = (word % WORDS_PER_PAGE as u64) as usize;
        (page, slot, 1 << (pos % BITS_PER_WORD))
    }

    /// The page if it has been written, without allocating.
    #[inline]
    fn find_page(&self, page: u64) -> Option<&Page> {
        let node = self.root[(page / PAGES_PER_NODE) as usize].get()?;
        let leaf = node[((page / PAGES_PER_LEAF) % LEAVES_PER_NODE) as usize].get()?;
        leaf[(page % PAGES_PER_LEAF) as usize].get()
    }

    /// The page, allocating it and any missing directory entries.
    #[inline]
    fn page(&self, page: u64) -> &Page {
        let node_index = page / PAGES_PER_NODE;
        let node = self.root[node_index as usize].get_or_init(|| {
            let leaf_count = self.page_count.div_ceil(PAGES_PER_LEAF);
            let first = node_index * LEAVES_PER_NODE;
            empty_slots(leaf_count.min(first + LEAVES_PER_NODE) - first)
        });

        let leaf_index = page / PAGES_PER_LEAF;
        let leaf = node[(leaf_index % LEAVES_PER_NODE) as usize].get_or_init(|| {
            let first = leaf_index * PAGES_PER_LEAF;
            empty_slots(self.page_count.min(first + PAGES_PER_LEAF) - first)
        });

        leaf[(page % PAGES_PER_LEAF) as usize].get_or_init(empty_page)
    }
}

impl BitVector for PagedBitVector {
    fn with_length(length: u64) -> Self {
        let page_count = length.div_ceil(BITS_PER_PAGE);
        Self {
            length,
            page_count,
            root: empty_slots(page_count.div_ceil(PAGES_PER_NODE)),
        }
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn get(&self, pos: u64) -> bool {
        let (page, slot, mask) = self.locate(pos);
        match self.find_page(page) {
            Some(words) => words[slot].load(Ordering::Acquire) & mask != 0,
            None => false,
        }
    }

    fn set(&self, pos: u64) -> bool {
        let (page, slot, mask) = self.locate(pos);
        self.page(page)[slot].fetch_or(mask, Ordering::AcqRel) & mask != 0
    }

    fn clear(&self, pos: u64) -> bool {
        let (page, slot, mask) = self.locate(pos);
        match self.find_page(page) {
            Some(words) => words[slot].fetch_and(!mask, Ordering::AcqRel) & mask != 0,
            None => false,
        }
    }

    fn flip(&self, pos: u64) -> bool {
        let (page, slot, mask) = self.locate(pos);
        self.page(page)[slot].fetch_xor(mask, Ordering::AcqRel) & mask != 0
    }
}
