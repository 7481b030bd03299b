/// Growth settings for a [`crate::DynamicArray`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArrayConfig {
    /// The capacity reserved by the first growth of an empty array.
    pub initial_capacity: usize,
    /// The factor the capacity is multiplied by on every later growth.
    pub grow_rate: usize,
}

pub const ARRAY_CONFIG_DEFAULT_INITIAL_CAPACITY: usize = 2;
pub const ARRAY_CONFIG_DEFAULT_GROW_RATE: usize = 2;

impl ArrayConfig {
    /// Creates the default ArrayConfig: start at 2 slots, double afterwards.
    pub fn default() -> Self {
        ArrayConfig {
            initial_capacity: ARRAY_CONFIG_DEFAULT_INITIAL_CAPACITY,
            grow_rate: ARRAY_CONFIG_DEFAULT_GROW_RATE,
        }
    }

    /// The capacity to grow to from `current` when at least `required`
    /// slots are needed.
    pub fn next_capacity(&self, current: usize, required: usize) -> usize {
        let grown = if current == 0 {
            self.initial_capacity.max(1)
        } else {
            current.saturating_mul(self.grow_rate.max(2))
        };

        grown.max(required)
    }
}
