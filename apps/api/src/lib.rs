pub mod bootstrap;
pub mod config;
pub mod docqa;
pub mod errors;
pub mod extraction;
pub mod forms;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;
