// Passage deduplication: normalization + hashing, the persisted registry,
// and the one-off rebuild from existing entries.

pub mod backfill;
pub mod normalize;
pub mod registry;
