// Experience analysis and evidence mapping against the competency catalog.
// All LLM calls go through llm_client::Assessor, never direct HTTP.

pub mod mapping;
pub mod parser;
pub mod prompts;
