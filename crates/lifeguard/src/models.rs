//! These models represent the objects passed around by the agent
//!
//! The agent talks to two outside parties: the LLM provider, which speaks its own
//! chat-completions wire format, and the capability registry, which runs lookups for
//! the model. Provider formats are converted into these internal structs as soon as
//! they arrive, so the orchestrator only ever reasons about one representation.
pub mod message;
pub mod role;
pub mod tool;
