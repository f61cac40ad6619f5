//! Translation: Dialect A ↔ Dialect G, both synchronous and streamed.

pub mod request;
pub mod response;
pub mod stream;

pub use request::translate_request;
pub use response::translate_response;
pub use stream::{parse_chunk, StreamTranslator};
