//! # ServAI
//!
//! A customer-support assistant grounded on a small static knowledge base.
//!
//! A question is matched against the knowledge base by token overlap, then
//! sent to a hosted LLM together with the closest match and the whole
//! knowledge base as context. Every answer carries a `source` tag saying how
//! it was produced, and LLM failures degrade to plain knowledge-base answers.
//!
//! ## Architecture
//!
//! ```text
//!             ┌───────────┐
//!  POST /ask ▶│ Assistant │──▶ matcher ──▶ knowledge base (JSON, read-only)
//!             └─────┬─────┘
//!                   ▼
//!             ┌───────────┐
//!             │    LLM    │──▶ prompt (system policy + context)
//!             └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`knowledge`] | Knowledge base loading |
//! | [`matcher`] | Token-overlap best match |
//! | [`prompt`] | System prompt, context and user message |
//! | [`llm`] | Chat-completion adapter |
//! | [`assistant`] | Answer selection and provenance |
//! | [`server`] | HTTP server |

pub mod assistant;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod matcher;
pub mod prompt;
pub mod server;
