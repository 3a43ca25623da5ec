pub mod select;
pub mod shamir;

pub use select::{AscendingIndex, DocumentOrder, ListedOrder, Randomized, Selection};
pub use shamir::Share;
