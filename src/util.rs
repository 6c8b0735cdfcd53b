pub mod inventory;
pub mod range;
pub mod treehash;
