// Resume matching: JD + resumes → one structured analysis per resume.
// All model calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod parser;
pub mod prompts;
