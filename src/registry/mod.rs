mod block;
mod block_registry;


pub use block::BlockInfo;
pub use block_registry::BlockRegistry;
