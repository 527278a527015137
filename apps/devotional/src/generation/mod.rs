// Entry generation: prompt assembly, the external call, response validation
// and the per-entry write.
// All model calls go through llm_client; this module only sees the Generator trait.

pub mod generator;
pub mod prompt_builder;
pub mod prompts;
pub mod validator;
