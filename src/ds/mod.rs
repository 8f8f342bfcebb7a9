//! Internal building blocks for the recency container and load entries.

pub mod intrusive_list;
pub mod latch;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use latch::Latch;
pub use slot_arena::SlotId;
