use super::block::{Block, BlockInfo};
use crate::error::AllocError;
use crate::metrics::{bump, Metrics};
use crate::resource::MemoryResource;
use log::debug;
use std::cell::RefCell;
use std::ptr::NonNull;

/// A memory resource that never gives memory back to the system until it is
/// dropped.
///
/// Every block the registry ever creates is kept in creation order. Freed
/// blocks are only marked as free, and a later request is served by the first
/// free block that is both large enough and at least as strictly aligned.
/// Blocks are never split or merged, so a freed large block can satisfy only
/// one smaller request at a time.
///
/// The registry is meant for a single thread. It is shared by reference, so
/// several arrays can draw from the same pool.
///
/// ```rust
/// use blockpit::{BlockRegistry, MemoryResource};
///
/// let registry = BlockRegistry::new();
/// let first = registry.allocate(64, 8).unwrap();
///
/// unsafe { registry.deallocate(first, 64, 8).unwrap() };
///
/// let reused = registry.allocate(32, 8).unwrap();
/// assert_eq!(first, reused);
///
/// let fresh = registry.allocate(128, 8).unwrap();
/// assert_ne!(first, fresh);
/// ```
pub struct BlockRegistry {
    blocks: RefCell<Vec<Block>>,
    metrics: Metrics,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks: RefCell::new(vec![]),
            metrics: Metrics::new(),
        }
    }

    /// Number of blocks tracked, free or not.
    pub fn block_count(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Number of blocks currently available for reuse.
    pub fn free_block_count(&self) -> usize {
        self.blocks
            .borrow()
            .iter()
            .filter(|block| !block.is_allocated())
            .count()
    }

    /// Total bytes held from the system across all blocks.
    pub fn reserved_bytes(&self) -> usize {
        self.blocks
            .borrow()
            .iter()
            .fold(0, |sum, block| sum + block.get_size())
    }

    /// A snapshot of every block in creation order.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.blocks.borrow().iter().map(Block::info).collect()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn reuse(&self, bytes: usize, alignment: usize) -> Option<NonNull<u8>> {
        let mut blocks = self.blocks.borrow_mut();
        let block = blocks
            .iter_mut()
            .find(|block| block.fits(bytes, alignment))?;
        let ptr = block.claim();

        debug!(
            "reused block at {:p} ({} bytes) for {} bytes",
            ptr,
            block.get_size(),
            bytes
        );

        Some(ptr)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResource for BlockRegistry {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        if let Some(ptr) = self.reuse(bytes, alignment) {
            bump(&self.metrics.reuses);

            return Ok(ptr);
        }

        let block = Block::new(bytes, alignment)?;
        let ptr = block.as_ptr();

        debug!("allocated new block at {:p} for {} bytes", ptr, bytes);

        self.blocks.borrow_mut().push(block);
        bump(&self.metrics.fresh_allocations);

        Ok(ptr)
    }

    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        _bytes: usize,
        _alignment: usize,
    ) -> Result<(), AllocError> {
        let mut blocks = self.blocks.borrow_mut();

        match blocks.iter_mut().find(|block| block.as_ptr() == ptr) {
            Some(block) if block.is_allocated() => {
                block.release();
                bump(&self.metrics.releases);

                debug!("released block at {:p} for reuse", ptr);

                Ok(())
            }
            _ => {
                bump(&self.metrics.rejected_deallocations);

                debug!("rejected deallocation of {:p}", ptr);

                Err(AllocError::InvalidDeallocation)
            }
        }
    }
}

impl PartialEq for BlockRegistry {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Drop for BlockRegistry {
    fn drop(&mut self) {
        for block in self.blocks.get_mut().drain(..) {
            debug!(
                "cleaned up block at {:p} ({} bytes)",
                block.as_ptr(),
                block.get_size()
            );
        }
    }
}
