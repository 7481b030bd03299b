use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

/// A forward position over the live slots of a [`crate::DynamicArray`].
///
/// A cursor is either on a live element or at the end of the range it was
/// created for. Cursors borrow the array, so no mutation can invalidate one
/// while it is alive. Two cursors are equal when they sit on the same slot.
pub struct Cursor<'a, T> {
    pos: *const NonNull<T>,
    end: *const NonNull<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(pos: *const NonNull<T>, end: *const NonNull<T>) -> Self {
        Self {
            pos,
            end,
            _marker: PhantomData,
        }
    }

    /// The element under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<&'a T> {
        if self.is_end() {
            return None;
        }

        Some(unsafe { (*self.pos).as_ref() })
    }

    /// Moves to the next slot. Advancing at the end does nothing.
    pub fn advance(&mut self) {
        if !self.is_end() {
            self.pos = unsafe { self.pos.add(1) };
        }
    }

    pub fn is_end(&self) -> bool {
        self.pos == self.end
    }

    fn remaining(&self) -> usize {
        if self.is_end() {
            return 0;
        }

        unsafe { self.end.offset_from(self.pos) as usize }
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.pos, other.pos)
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("slot", &self.pos)
            .field("at_end", &self.is_end())
            .finish()
    }
}

/// A forward position that can modify the element under it.
pub struct CursorMut<'a, T> {
    pos: *mut NonNull<T>,
    end: *mut NonNull<T>,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> CursorMut<'a, T> {
    pub(crate) fn new(pos: *mut NonNull<T>, end: *mut NonNull<T>) -> Self {
        Self {
            pos,
            end,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> Option<&T> {
        if self.is_end() {
            return None;
        }

        Some(unsafe { (*self.pos).as_ref() })
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_end() {
            return None;
        }

        Some(unsafe { (*self.pos).as_mut() })
    }

    /// Moves to the next slot. Advancing at the end does nothing.
    pub fn advance(&mut self) {
        if !self.is_end() {
            self.pos = unsafe { self.pos.add(1) };
        }
    }

    pub fn is_end(&self) -> bool {
        self.pos == self.end
    }

    // Each slot points at its own allocation, so handing out the current
    // element for 'a and stepping past it never aliases.
    fn take_current(&mut self) -> Option<&'a mut T> {
        if self.is_end() {
            return None;
        }

        let item = unsafe { (*self.pos).as_mut() };

        self.advance();

        Some(item)
    }

    fn remaining(&self) -> usize {
        if self.is_end() {
            return 0;
        }

        unsafe { self.end.offset_from(self.pos) as usize }
    }
}

impl<T> fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("slot", &self.pos)
            .field("at_end", &self.is_end())
            .finish()
    }
}

/// Iterator over shared references, driven by a [`Cursor`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    cursor: Cursor<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor,
        }
    }
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(cursor: Cursor<'a, T>) -> Self {
        Self { cursor }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.cursor.get()?;

        self.cursor.advance();

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();

        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over mutable references, driven by a [`CursorMut`].
#[derive(Debug)]
pub struct IterMut<'a, T> {
    cursor: CursorMut<'a, T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(cursor: CursorMut<'a, T>) -> Self {
        Self { cursor }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.cursor.take_current()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();

        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}
