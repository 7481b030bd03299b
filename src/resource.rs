use super::error::AllocError;
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// A source of raw, aligned memory.
///
/// Containers in this crate only ever talk to memory through this trait, so
/// a [`crate::BlockRegistry`] and a [`SystemResource`] are interchangeable
/// behind a `&dyn MemoryResource`.
pub trait MemoryResource {
    /// Returns the address of at least `bytes` bytes aligned to `alignment`.
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, AllocError>;

    /// Hands `ptr` back to the resource.
    ///
    /// # Safety
    ///
    /// `ptr` must not be read or written after this call, since the resource
    /// is free to hand the same memory out again. `bytes` and `alignment`
    /// must be the values the memory was allocated with.
    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        bytes: usize,
        alignment: usize,
    ) -> Result<(), AllocError>;

    /// Whether memory allocated from `self` may be deallocated through
    /// `other`. Defaults to instance identity.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        !other.is_system() && std::ptr::addr_eq(self, other)
    }

    /// Whether the resource hands requests straight to the global allocator.
    fn is_system(&self) -> bool {
        false
    }
}

// zero sized requests still get a real, unique address
pub(crate) fn layout_for(bytes: usize, alignment: usize) -> Result<Layout, AllocError> {
    Layout::from_size_align(bytes.max(1), alignment).map_err(|_| AllocError::BadRequest)
}

/// A resource that forwards every request straight to the global allocator.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemResource;

impl SystemResource {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryResource for SystemResource {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        let layout = layout_for(bytes, alignment)?;
        let ptr = unsafe { alloc(layout) };

        NonNull::new(ptr).ok_or(AllocError::OutOfMemory)
    }

    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        bytes: usize,
        alignment: usize,
    ) -> Result<(), AllocError> {
        let layout = layout_for(bytes, alignment)?;

        dealloc(ptr.as_ptr(), layout);

        Ok(())
    }

    // any handle onto the global allocator can free what another one allocated
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.is_system()
    }

    fn is_system(&self) -> bool {
        true
    }
}
