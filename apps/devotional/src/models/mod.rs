pub mod entry;
pub mod passage;
