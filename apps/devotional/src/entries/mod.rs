// Entry files on disk: storage, frontmatter access, scheduling, publishing.
// Nothing here talks to the LLM or the passage registry.

pub mod frontmatter;
pub mod publisher;
pub mod scheduler;
pub mod store;
