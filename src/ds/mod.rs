pub mod intrusive_list;
pub mod next_use;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use next_use::{NextUse, NextUseTable};
pub use slot_arena::{SlotArena, SlotId};
