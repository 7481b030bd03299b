//! A free-list memory resource, and a dynamic array that draws all of its
//! memory from one.
//!
//! A [`BlockRegistry`] keeps every block it ever allocates. Deallocating a
//! block only marks it as free, and the next request that fits is served from
//! the first free block in creation order. Memory goes back to the system when
//! the registry is dropped.
//!
//! A [`DynamicArray`] never touches the global allocator directly. It is built
//! on a `&dyn MemoryResource`, so the same array type runs on a registry or on
//! the plain [`SystemResource`].
//! ```rust
//! use blockpit::{BlockRegistry, DynamicArray};
//!
//! let registry = BlockRegistry::new();
//! let mut array = DynamicArray::new(&registry);
//!
//! for i in 10..=15 {
//!     array.push_back(i).unwrap();
//! }
//!
//! array[2] = 555;
//!
//! let values: Vec<i32> = array.iter().copied().collect();
//! assert_eq!(values, vec![10, 11, 555, 13, 14, 15]);
//!
//! array.clear();
//! assert_eq!(array.len(), 0);
//! ```
//!
//! Elements are allocated one by one, so they keep their address while the
//! array grows or shifts around them. Storage released by `erase` or
//! `pop_back` goes back to the registry and is picked up again by the next
//! allocation that fits.
//! ```rust
//! use blockpit::{BlockRegistry, DynamicArray};
//!
//! let registry = BlockRegistry::new();
//! let mut array = DynamicArray::new(&registry);
//!
//! array.push_back(String::from("first")).unwrap();
//!
//! let first: *const String = &array[0];
//!
//! for i in 0..100 {
//!     array.insert(0, i.to_string()).unwrap();
//! }
//!
//! assert_eq!(first, &array[100] as *const String);
//! ```

mod allocator;
mod config;
mod cursor;
mod dynamic_array;
mod error;
mod metrics;
mod registry;
mod resource;

pub use allocator::Allocator;
pub use config::{ArrayConfig, ARRAY_CONFIG_DEFAULT_GROW_RATE, ARRAY_CONFIG_DEFAULT_INITIAL_CAPACITY};
pub use cursor::{Cursor, CursorMut, Iter, IterMut};
pub use dynamic_array::DynamicArray;
pub use error::{AllocError, ArrayError};
pub use metrics::Metrics;
pub use registry::{BlockInfo, BlockRegistry};
pub use resource::{MemoryResource, SystemResource};
