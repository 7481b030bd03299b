use super::error::AllocError;
use super::resource::MemoryResource;
use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A typed handle onto a [`MemoryResource`].
///
/// The allocator hands out uninitialized storage for `count` values of `T`;
/// constructing and destroying the values is left to the caller.
pub struct Allocator<'r, T> {
    resource: &'r dyn MemoryResource,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T> Allocator<'r, T> {
    pub fn new(resource: &'r dyn MemoryResource) -> Self {
        Self {
            resource,
            _marker: PhantomData,
        }
    }

    pub fn resource(&self) -> &'r dyn MemoryResource {
        self.resource
    }

    /// The same resource, handing out storage for `U` instead.
    pub fn rebind<U>(&self) -> Allocator<'r, U> {
        Allocator::new(self.resource)
    }

    pub fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Self::layout(count)?;
        let ptr = self.resource.allocate(layout.size(), layout.align())?;

        Ok(ptr.cast())
    }

    /// # Safety
    ///
    /// `ptr` must come from `allocate(count)` on an allocator over an equal
    /// resource, and must not be used afterwards. Any values still living in
    /// the storage are not dropped.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) -> Result<(), AllocError> {
        let layout = Self::layout(count)?;

        self.resource
            .deallocate(ptr.cast(), layout.size(), layout.align())
    }

    fn layout(count: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(count).map_err(|_| AllocError::BadRequest)
    }
}

impl<T> Clone for Allocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Allocator<'_, T> {}

impl<T, U> PartialEq<Allocator<'_, U>> for Allocator<'_, T> {
    fn eq(&self, other: &Allocator<'_, U>) -> bool {
        self.resource.is_equal(other.resource)
    }
}

impl<T> fmt::Debug for Allocator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("resource", &std::ptr::from_ref(self.resource).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockRegistry, SystemResource};
    use std::mem::{align_of, size_of};

    #[test]
    fn forwards_element_layout() {
        let registry = BlockRegistry::new();
        let alloc: Allocator<u64> = Allocator::new(&registry);

        alloc.allocate(5).unwrap();

        let block = registry.blocks()[0];

        assert_eq!(block.size, 5 * size_of::<u64>());
        assert_eq!(block.alignment, align_of::<u64>());
    }

    #[test]
    fn storage_is_reused_through_the_adapter() {
        let registry = BlockRegistry::new();
        let alloc: Allocator<u32> = Allocator::new(&registry);
        let ptr = alloc.allocate(4).unwrap();

        unsafe { alloc.deallocate(ptr, 4).unwrap() };

        assert_eq!(alloc.allocate(2).unwrap(), ptr);
    }

    #[test]
    fn rebind_shares_the_resource() {
        let registry = BlockRegistry::new();
        let other = BlockRegistry::new();
        let ints: Allocator<i32> = Allocator::new(&registry);
        let ptrs: Allocator<NonNull<i32>> = ints.rebind();

        assert!(ints == ptrs);
        assert!(ints != Allocator::<i32>::new(&other));
    }

    #[test]
    fn count_overflow_is_a_bad_request() {
        let system = SystemResource::new();
        let alloc: Allocator<u64> = Allocator::new(&system);

        assert_eq!(alloc.allocate(usize::MAX), Err(AllocError::BadRequest));
    }
}
