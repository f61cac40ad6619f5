//! Process-wide configuration: the record itself, atomic on-disk persistence, and the
//! admin surface's session bookkeeping.

mod configuration;
mod error;
mod session;
mod store;

pub use configuration::{
    AdminSecret, ConfigPatch, Configuration, ConfigurationView, SCHEMA_VERSION, random_hex_token,
};
pub use error::{ConfigError, Result};
pub use session::{SESSION_TTL, Session, SessionStore};
pub use store::ConfigStore;
