//! FIRST/FOLLOW computation and LL(1) table construction (components H and I).

pub mod first_follow;
pub mod table;

pub use first_follow::{compute_first, compute_follow, FirstSet, FirstSets, END_OF_INPUT};
pub use table::{build, DeserializeError, Ll1Table, TableConflict, NO_ENTRY, SYNC};
