use blockpit::{AllocError, ArrayError, BlockRegistry, DynamicArray, MemoryResource, SystemResource};
use std::cell::Cell;
use std::ptr::NonNull;

// Hands requests to a registry until its budget of allocations runs out.
struct Budgeted<'a> {
    inner: &'a BlockRegistry,
    budget: Cell<usize>,
}

impl<'a> Budgeted<'a> {
    fn new(inner: &'a BlockRegistry, budget: usize) -> Self {
        Self {
            inner,
            budget: Cell::new(budget),
        }
    }

    fn refill(&self, budget: usize) {
        self.budget.set(budget);
    }
}

impl MemoryResource for Budgeted<'_> {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        match self.budget.get() {
            0 => Err(AllocError::OutOfMemory),
            left => {
                self.budget.set(left - 1);
                self.inner.allocate(bytes, alignment)
            }
        }
    }

    unsafe fn deallocate(
        &self,
        ptr: NonNull<u8>,
        bytes: usize,
        alignment: usize,
    ) -> Result<(), AllocError> {
        self.inner.deallocate(ptr, bytes, alignment)
    }
}

// Serves allocations from a registry but refuses to take anything back.
struct NoRelease<'a> {
    inner: &'a BlockRegistry,
}

impl MemoryResource for NoRelease<'_> {
    fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        self.inner.allocate(bytes, alignment)
    }

    unsafe fn deallocate(
        &self,
        _ptr: NonNull<u8>,
        _bytes: usize,
        _alignment: usize,
    ) -> Result<(), AllocError> {
        Err(AllocError::InvalidDeallocation)
    }
}

#[test]
fn allocate_free_allocate() {
    let registry = BlockRegistry::new();
    let first = registry.allocate(64, 8).unwrap();

    unsafe { registry.deallocate(first, 64, 8).unwrap() };

    assert_eq!(registry.allocate(32, 8).unwrap(), first);

    let bigger = registry.allocate(128, 8).unwrap();

    assert_ne!(bigger, first);
    assert_eq!(registry.block_count(), 2);
}

#[test]
fn arrays_share_one_registry() {
    let registry = BlockRegistry::new();
    let mut left = DynamicArray::new(&registry);
    let mut right = DynamicArray::new(&registry);

    for i in 0..16u64 {
        left.push_back(i).unwrap();
    }

    let blocks = registry.block_count();

    assert!(right.allocator() == left.allocator());

    drop(left);

    // right draws everything from the blocks left gave back
    for i in 0..16u64 {
        right.push_back(i).unwrap();
    }

    assert_eq!(registry.block_count(), blocks);
    assert!(registry.metrics().get_reuses() >= 16);
}

#[test]
fn all_blocks_free_after_arrays_drop() {
    let registry = BlockRegistry::new();

    {
        let mut names = DynamicArray::new(&registry);
        let mut numbers = DynamicArray::new(&registry);

        for i in 0..50 {
            names.push_back(format!("name {i}")).unwrap();
            numbers.insert(0, i).unwrap();
        }

        names.erase(10).unwrap();
        numbers.erase(10).unwrap();
    }

    assert!(registry.block_count() > 0);
    assert_eq!(registry.free_block_count(), registry.block_count());
    assert_eq!(
        registry.metrics().get_total_allocations(),
        registry.metrics().get_releases()
    );
}

#[test]
fn failed_push_keeps_len() {
    let registry = BlockRegistry::new();
    // one table and two elements
    let budgeted = Budgeted::new(&registry, 3);
    let mut array = DynamicArray::new(&budgeted);

    array.push_back(1).unwrap();
    array.push_back(2).unwrap();

    assert_eq!(
        array.push_back(3),
        Err(ArrayError::Alloc(AllocError::OutOfMemory))
    );
    assert_eq!(array.len(), 2);
    assert_eq!(array.capacity(), 2);

    // the element gets its storage, then the table growth fails
    budgeted.refill(1);

    assert_eq!(
        array.push_back(3),
        Err(ArrayError::Alloc(AllocError::OutOfMemory))
    );
    assert_eq!(array.len(), 2);
    assert_eq!(array.capacity(), 2);
    assert_eq!(registry.free_block_count(), 1);
    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn failed_insert_leaves_contents() {
    let registry = BlockRegistry::new();
    let budgeted = Budgeted::new(&registry, 6);
    let mut array = DynamicArray::new(&budgeted);

    for i in 0..4 {
        array.push_back(i).unwrap();
    }

    budgeted.refill(1);

    assert_eq!(
        array.insert(1, 100),
        Err(ArrayError::Alloc(AllocError::OutOfMemory))
    );
    assert_eq!(array.len(), 4);
    assert_eq!(array.capacity(), 4);
    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

    budgeted.refill(2);
    array.insert(1, 100).unwrap();

    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![0, 100, 1, 2, 3]);
}

#[test]
fn failed_reserve_keeps_capacity() {
    let registry = BlockRegistry::new();
    let budgeted = Budgeted::new(&registry, 0);
    let mut array: DynamicArray<'_, u32> = DynamicArray::new(&budgeted);

    assert_eq!(
        array.reserve(10),
        Err(ArrayError::Alloc(AllocError::OutOfMemory))
    );
    assert_eq!(array.capacity(), 0);
}

#[test]
fn refused_release_still_removes() {
    let registry = BlockRegistry::new();
    let no_release = NoRelease { inner: &registry };
    let mut array = DynamicArray::new(&no_release);

    array.push_back("first".to_string()).unwrap();
    array.push_back("second".to_string()).unwrap();

    assert_eq!(array.pop_back(), Ok("second".to_string()));
    assert_eq!(array.len(), 1);

    assert_eq!(array.erase(0), Ok("first".to_string()));
    assert!(array.is_empty());

    // the blocks stay claimed, nothing was handed back
    assert_eq!(registry.free_block_count(), 0);
}

#[test]
fn arrays_on_separate_system_handles_match() {
    let first = SystemResource::new();
    let second = SystemResource::new();
    let registry = BlockRegistry::new();
    let left: DynamicArray<'_, u8> = DynamicArray::new(&first);
    let right: DynamicArray<'_, u8> = DynamicArray::new(&second);
    let pooled: DynamicArray<'_, u8> = DynamicArray::new(&registry);

    assert!(left.allocator() == right.allocator());
    assert!(left.allocator() != pooled.allocator());
}
