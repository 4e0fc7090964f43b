//! Document Q&A: ask a question across uploaded files and server folders.

pub mod corpus;
pub mod handlers;
pub mod prompts;
pub mod relevance;
