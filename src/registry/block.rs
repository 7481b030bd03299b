use crate::error::AllocError;
use crate::resource::layout_for;
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// A read only view of one block tracked by a [`crate::BlockRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub address: usize,
    pub size: usize,
    pub alignment: usize,
    pub allocated: bool,
}

pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
    allocated: bool,
}

impl Block {
    pub fn new(bytes: usize, alignment: usize) -> Result<Block, AllocError> {
        let layout = layout_for(bytes, alignment)?;

        Ok(Block {
            ptr: Self::alloc_block(layout)?,
            layout,
            allocated: true,
        })
    }

    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    pub fn get_size(&self) -> usize {
        self.layout.size()
    }

    pub fn get_alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn fits(&self, bytes: usize, alignment: usize) -> bool {
        !self.allocated && self.get_size() >= bytes && self.get_alignment() >= alignment
    }

    pub fn claim(&mut self) -> NonNull<u8> {
        debug_assert!(!self.allocated);

        self.allocated = true;
        self.ptr
    }

    pub fn release(&mut self) {
        debug_assert!(self.allocated);

        self.allocated = false;
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            address: self.ptr.as_ptr() as usize,
            size: self.get_size(),
            alignment: self.get_alignment(),
            allocated: self.allocated,
        }
    }

    fn alloc_block(layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = unsafe { alloc(layout) };

        NonNull::new(ptr).ok_or(AllocError::OutOfMemory)
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}
