use super::allocator::Allocator;
use super::config::ArrayConfig;
use super::cursor::{Cursor, CursorMut, Iter, IterMut};
use super::error::{AllocError, ArrayError};
use super::resource::MemoryResource;
use log::{error, trace};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};

/// A growable array whose storage comes entirely from a [`MemoryResource`].
///
/// The array keeps a table of slots, and every live slot points at an element
/// that was allocated on its own. Growing, inserting and erasing only move
/// the slots around, so an element stays at the same address for as long as
/// it is in the array.
///
/// Slots `[0, len)` are live; slots `[len, capacity)` are reserved but hold
/// nothing.
pub struct DynamicArray<'r, T> {
    table: NonNull<NonNull<T>>,
    len: usize,
    cap: usize,
    elements: Allocator<'r, T>,
    slots: Allocator<'r, NonNull<T>>,
    config: ArrayConfig,
    _owns: PhantomData<T>,
}

impl<'r, T> DynamicArray<'r, T> {
    pub fn new(resource: &'r dyn MemoryResource) -> Self {
        Self::with_config(resource, ArrayConfig::default())
    }

    pub fn with_config(resource: &'r dyn MemoryResource, config: ArrayConfig) -> Self {
        let elements = Allocator::new(resource);

        Self {
            table: NonNull::dangling(),
            len: 0,
            cap: 0,
            elements,
            slots: elements.rebind(),
            config,
            _owns: PhantomData,
        }
    }

    pub fn with_capacity(
        resource: &'r dyn MemoryResource,
        capacity: usize,
    ) -> Result<Self, ArrayError> {
        let mut array = Self::new(resource);

        array.reserve(capacity)?;

        Ok(array)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> Allocator<'r, T> {
        self.elements
    }

    pub fn config(&self) -> ArrayConfig {
        self.config
    }

    /// Makes room for at least `capacity` elements. Elements keep their
    /// addresses.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), ArrayError> {
        if capacity > self.cap {
            self.reallocate(capacity)?;
        }

        Ok(())
    }

    /// Appends `value`. On failure the array is left as it was and `value`
    /// is dropped.
    pub fn push_back(&mut self, value: T) -> Result<(), ArrayError> {
        let ptr = self.allocate_element()?;

        unsafe {
            ptr.as_ptr().write(value);
            self.slot(self.len).write(ptr);
        }

        self.len += 1;

        Ok(())
    }

    /// Removes the last element and hands it back. Its storage returns to
    /// the resource; the capacity is kept.
    pub fn pop_back(&mut self) -> Result<T, ArrayError> {
        if self.len == 0 {
            return Err(ArrayError::EmptyContainer);
        }

        self.len -= 1;

        let ptr = self.element(self.len);

        Ok(unsafe { self.take(ptr) })
    }

    /// Drops every element, keeping the capacity.
    pub fn clear(&mut self) {
        let len = mem::replace(&mut self.len, 0);

        for i in 0..len {
            let ptr = self.element(i);

            unsafe {
                ptr::drop_in_place(ptr.as_ptr());
                self.release_element(ptr);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(unsafe { self.element(index).as_ref() })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            Some(unsafe { self.element(index).as_mut() })
        } else {
            None
        }
    }

    pub fn at(&self, index: usize) -> Result<&T, ArrayError> {
        let len = self.len;

        self.get(index)
            .ok_or(ArrayError::IndexOutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let len = self.len;

        self.get_mut(index)
            .ok_or(ArrayError::IndexOutOfRange { index, len })
    }

    pub fn front(&self) -> Result<&T, ArrayError> {
        self.get(0).ok_or(ArrayError::EmptyContainer)
    }

    pub fn front_mut(&mut self) -> Result<&mut T, ArrayError> {
        self.get_mut(0).ok_or(ArrayError::EmptyContainer)
    }

    pub fn back(&self) -> Result<&T, ArrayError> {
        match self.len.checked_sub(1) {
            Some(last) => Ok(unsafe { self.element(last).as_ref() }),
            None => Err(ArrayError::EmptyContainer),
        }
    }

    pub fn back_mut(&mut self) -> Result<&mut T, ArrayError> {
        match self.len.checked_sub(1) {
            Some(last) => Ok(unsafe { self.element(last).as_mut() }),
            None => Err(ArrayError::EmptyContainer),
        }
    }

    /// Places `value` at `index`, moving the elements at `[index, len)` one
    /// slot toward the end.
    ///
    /// Storage for the new element and any table growth are obtained before
    /// anything is shifted, so a failure leaves the array exactly as it was.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ArrayError> {
        if index > self.len {
            return Err(ArrayError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }

        let ptr = self.allocate_element()?;

        unsafe {
            ptr.as_ptr().write(value);

            let slot = self.slot(index);

            ptr::copy(slot, slot.add(1), self.len - index);
            slot.write(ptr);
        }

        self.len += 1;

        Ok(())
    }

    /// Removes the element at `index` and hands it back, moving the elements
    /// after it one slot toward the front.
    pub fn erase(&mut self, index: usize) -> Result<T, ArrayError> {
        if index >= self.len {
            return Err(ArrayError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }

        let ptr = self.element(index);

        unsafe {
            let slot = self.slot(index);

            ptr::copy(slot.add(1), slot, self.len - index - 1);
        }

        self.len -= 1;

        Ok(unsafe { self.take(ptr) })
    }

    pub fn begin(&self) -> Cursor<'_, T> {
        let (start, end) = self.bounds();

        Cursor::new(start, end)
    }

    pub fn end(&self) -> Cursor<'_, T> {
        let (_, end) = self.bounds();

        Cursor::new(end, end)
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let (start, end) = self.bounds();

        CursorMut::new(start, end)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.begin())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.begin_mut())
    }

    fn bounds(&self) -> (*mut NonNull<T>, *mut NonNull<T>) {
        (self.table.as_ptr(), self.slot(self.len))
    }

    fn slot(&self, index: usize) -> *mut NonNull<T> {
        debug_assert!(index <= self.cap);

        unsafe { self.table.as_ptr().add(index) }
    }

    fn element(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < self.cap);

        unsafe { *self.slot(index) }
    }

    // The element must already be unlinked from the table. By then the
    // removal has happened, so a refused release is only logged.
    unsafe fn take(&mut self, ptr: NonNull<T>) -> T {
        let value = ptr.as_ptr().read();

        self.release_element(ptr);

        value
    }

    unsafe fn release_element(&self, ptr: NonNull<T>) {
        if let Err(err) = self.elements.deallocate(ptr, 1) {
            error!("failed to release element at {:p}: {}", ptr, err);
        }
    }

    // Uninitialized storage for one element, with a free slot in the table
    // to put it in.
    fn allocate_element(&mut self) -> Result<NonNull<T>, AllocError> {
        let ptr = self.elements.allocate(1)?;

        if let Err(err) = self.grow_for_one() {
            unsafe { self.release_element(ptr) };

            return Err(err);
        }

        Ok(ptr)
    }

    fn grow_for_one(&mut self) -> Result<(), AllocError> {
        if self.len == self.cap {
            let new_cap = self.config.next_capacity(self.cap, self.len + 1);

            self.reallocate(new_cap)?;
        }

        Ok(())
    }

    fn reallocate(&mut self, new_cap: usize) -> Result<(), AllocError> {
        let new_table = self.slots.allocate(new_cap)?;

        unsafe { ptr::copy_nonoverlapping(self.table.as_ptr(), new_table.as_ptr(), self.len) };

        let old_table = mem::replace(&mut self.table, new_table);
        let old_cap = mem::replace(&mut self.cap, new_cap);

        trace!("grew slot table from {} to {} slots", old_cap, new_cap);

        if old_cap == 0 {
            return Ok(());
        }

        unsafe { self.slots.deallocate(old_table, old_cap) }
    }
}

impl<T> Drop for DynamicArray<'_, T> {
    fn drop(&mut self) {
        self.clear();

        if self.cap == 0 {
            return;
        }

        if let Err(err) = unsafe { self.slots.deallocate(self.table, self.cap) } {
            error!("failed to release slot table at {:p}: {}", self.table, err);
        }
    }
}

impl<T> Index<usize> for DynamicArray<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for array of length {}", self.len),
        }
    }
}

impl<T> IndexMut<usize> for DynamicArray<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;

        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds for array of length {len}"),
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<'_, T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<'_, T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
