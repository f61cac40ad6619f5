//! Translation and dispatch engine: Dialect A (Anthropic-Messages-shaped) ↔ Dialect G
//! (Google-Generative-Language-shaped), plus the classifier and endpoint builder that
//! sit around the translators.

pub mod anthropic;
pub mod classifier;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod google;
pub mod schema;
pub mod translate;
mod unknown_fields;

pub use client::UpstreamClient;
pub use error::{GatewayError, Result};
