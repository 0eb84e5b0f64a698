pub mod agent;
pub mod capabilities;
pub mod clients;
pub mod config;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod session;
