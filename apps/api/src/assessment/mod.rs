// AI Interview Assessment Engine
// Implements: question generation, answer scoring, follow-ups, response analysis,
// session feedback, and live interviewer suggestions.
// All completion calls go through llm_client — no direct Anthropic calls here.

pub mod engine;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod tagged;
