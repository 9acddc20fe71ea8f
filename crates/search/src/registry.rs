//! Per-tenant block registry
//!
//! Two independent locks guard the registry:
//!
//! - the head lock over the single current head block
//! - the blocks lock over the completing and complete lists
//!
//! Lock order is fixed: any path taking both acquires the head lock first
//! and the blocks lock second. Readers holding the blocks lock in shared
//! mode see a stable snapshot of both lists; rotation waits for the
//! exclusive lock. In debug builds the acquisition order is checked with a
//! thread-local counter, so a misordered path fails a test run instead of
//! deadlocking in production under ingest pressure.

use crate::block::Searcher;
use largo_core::BlockId;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// The completing and complete block lists, guarded together
#[derive(Default)]
pub struct BlockSets {
    /// Blocks flushing out of the wal, still append-tolerant
    pub completing: Vec<Arc<dyn Searcher>>,
    /// Immutable local blocks
    pub complete: Vec<Arc<dyn Searcher>>,
}

/// Holds one tenant's blocks behind the two search locks
#[derive(Default)]
pub struct BlockRegistry {
    head: RwLock<Option<Arc<dyn Searcher>>>,
    blocks: RwLock<BlockSets>,
}

impl BlockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Search side: shared access
    // ------------------------------------------------------------------

    /// Shared access to the head slot. Must not be called while holding
    /// the blocks lock.
    pub(crate) fn read_head(&self) -> RwLockReadGuard<'_, Option<Arc<dyn Searcher>>> {
        lock_order::check_head_acquire();
        self.head.read()
    }

    /// Shared access to the completing and complete lists.
    pub(crate) fn read_blocks(&self) -> BlocksReadGuard<'_> {
        let inner = self.blocks.read();
        lock_order::note_blocks_acquire();
        BlocksReadGuard { inner }
    }

    // ------------------------------------------------------------------
    // Ingest side: exclusive access
    // ------------------------------------------------------------------

    /// Install a head block, replacing any current one.
    pub fn install_head(&self, block: Arc<dyn Searcher>) {
        let mut head = self.write_head();
        *head = Some(block);
    }

    /// Move the current head block (if any) onto the completing list and
    /// install the replacement as the new head.
    pub fn rotate_head(&self, replacement: Option<Arc<dyn Searcher>>) {
        let mut head = self.write_head();
        if let Some(old) = head.take() {
            let mut blocks = self.write_blocks();
            blocks.completing.push(old);
        }
        *head = replacement;
    }

    /// Move a completing block to the complete list. Returns false if the
    /// block is not on the completing list.
    pub fn promote_completing(&self, id: BlockId) -> bool {
        let mut blocks = self.write_blocks();
        match blocks.completing.iter().position(|b| b.block_meta().id == id) {
            Some(idx) => {
                let block = blocks.completing.remove(idx);
                blocks.complete.push(block);
                true
            }
            None => false,
        }
    }

    /// Drop a complete block. Returns false if the block is not on the
    /// complete list.
    pub fn evict_complete(&self, id: BlockId) -> bool {
        let mut blocks = self.write_blocks();
        match blocks.complete.iter().position(|b| b.block_meta().id == id) {
            Some(idx) => {
                blocks.complete.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Ids of the completing blocks, oldest first.
    pub fn completing_ids(&self) -> Vec<BlockId> {
        self.read_blocks()
            .completing
            .iter()
            .map(|b| b.block_meta().id)
            .collect()
    }

    /// Ids of the complete blocks, oldest first.
    pub fn complete_ids(&self) -> Vec<BlockId> {
        self.read_blocks()
            .complete
            .iter()
            .map(|b| b.block_meta().id)
            .collect()
    }

    /// (completing, complete) list lengths.
    pub fn block_counts(&self) -> (usize, usize) {
        let blocks = self.read_blocks();
        (blocks.completing.len(), blocks.complete.len())
    }

    fn write_head(&self) -> RwLockWriteGuard<'_, Option<Arc<dyn Searcher>>> {
        lock_order::check_head_acquire();
        self.head.write()
    }

    fn write_blocks(&self) -> BlocksWriteGuard<'_> {
        let inner = self.blocks.write();
        lock_order::note_blocks_acquire();
        BlocksWriteGuard { inner }
    }
}

/// Shared guard over the block lists, instrumented for lock-order checks
pub(crate) struct BlocksReadGuard<'a> {
    inner: RwLockReadGuard<'a, BlockSets>,
}

impl Deref for BlocksReadGuard<'_> {
    type Target = BlockSets;

    fn deref(&self) -> &BlockSets {
        &self.inner
    }
}

impl Drop for BlocksReadGuard<'_> {
    fn drop(&mut self) {
        lock_order::note_blocks_release();
    }
}

struct BlocksWriteGuard<'a> {
    inner: RwLockWriteGuard<'a, BlockSets>,
}

impl Deref for BlocksWriteGuard<'_> {
    type Target = BlockSets;

    fn deref(&self) -> &BlockSets {
        &self.inner
    }
}

impl DerefMut for BlocksWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut BlockSets {
        &mut self.inner
    }
}

impl Drop for BlocksWriteGuard<'_> {
    fn drop(&mut self) {
        lock_order::note_blocks_release();
    }
}

/// Debug-build enforcement of the head-before-blocks acquisition order.
/// Blocks guards never leave the acquiring thread, so a thread-local
/// counter is enough.
mod lock_order {
    #[cfg(debug_assertions)]
    use std::cell::Cell;

    #[cfg(debug_assertions)]
    thread_local! {
        static BLOCKS_HELD: Cell<u32> = const { Cell::new(0) };
    }

    pub(super) fn check_head_acquire() {
        #[cfg(debug_assertions)]
        BLOCKS_HELD.with(|held| {
            assert_eq!(
                held.get(),
                0,
                "lock order violation: head lock acquired while holding blocks lock"
            );
        });
    }

    pub(super) fn note_blocks_acquire() {
        #[cfg(debug_assertions)]
        BLOCKS_HELD.with(|held| held.set(held.get() + 1));
    }

    pub(super) fn note_blocks_release() {
        #[cfg(debug_assertions)]
        BLOCKS_HELD.with(|held| held.set(held.get() - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockMeta;

    struct BareBlock {
        meta: BlockMeta,
    }

    impl BareBlock {
        fn new() -> Arc<dyn Searcher> {
            Arc::new(BareBlock {
                meta: BlockMeta::new(BlockId::new(), 0, 0),
            })
        }
    }

    impl Searcher for BareBlock {
        fn block_meta(&self) -> &BlockMeta {
            &self.meta
        }
    }

    #[test]
    fn test_empty_registry() {
        let reg = BlockRegistry::new();
        assert!(reg.read_head().is_none());
        assert_eq!(reg.block_counts(), (0, 0));
    }

    #[test]
    fn test_install_and_rotate_head() {
        let reg = BlockRegistry::new();
        let first = BareBlock::new();
        let first_id = first.block_meta().id;
        reg.install_head(first);
        assert!(reg.read_head().is_some());

        reg.rotate_head(Some(BareBlock::new()));
        assert!(reg.read_head().is_some());
        assert_eq!(reg.completing_ids(), vec![first_id]);
    }

    #[test]
    fn test_rotate_empty_head_moves_nothing() {
        let reg = BlockRegistry::new();
        reg.rotate_head(None);
        assert_eq!(reg.block_counts(), (0, 0));
        assert!(reg.read_head().is_none());
    }

    #[test]
    fn test_promote_and_evict() {
        let reg = BlockRegistry::new();
        reg.install_head(BareBlock::new());
        reg.rotate_head(None);
        let id = reg.completing_ids()[0];

        assert!(reg.promote_completing(id));
        assert!(!reg.promote_completing(id));
        assert_eq!(reg.block_counts(), (0, 1));
        assert_eq!(reg.complete_ids(), vec![id]);

        assert!(reg.evict_complete(id));
        assert!(!reg.evict_complete(id));
        assert_eq!(reg.block_counts(), (0, 0));
    }

    #[test]
    fn test_read_head_then_blocks_is_legal() {
        let reg = BlockRegistry::new();
        let head = reg.read_head();
        let blocks = reg.read_blocks();
        assert!(head.is_none());
        assert!(blocks.completing.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "lock order violation")]
    fn test_blocks_then_head_panics_in_debug() {
        let reg = BlockRegistry::new();
        let _blocks = reg.read_blocks();
        let _head = reg.read_head();
    }
}
