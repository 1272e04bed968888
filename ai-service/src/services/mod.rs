pub mod assistant;
pub mod auth;
pub mod invoker;
pub mod mapper;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use assistant::MedicalAssistant;
pub use auth::{Caller, TokenVerifier};
pub use invoker::ModelInvoker;
pub use prompts::{OutputSchema, Prompt, PromptBuilder};
pub use providers::{BackendKind, TextProvider};
