//! Dialect A wire types: the Anthropic-Messages-shaped API the gateway's clients speak.

mod message;
mod request;
mod response;
mod sse;
mod tool;

pub use message::{ContentBlock, ImageSource, InputMessage, MessageContent, Role};
pub use request::{Request, ResponseFormat, ResponseFormatKind, SystemBlock, SystemPrompt};
pub use response::{Response, ResponseContentBlock, StopReason, Usage};
pub use sse::{ContentBlockStart, Delta, ErrorBody, MessageDeltaBody, StreamEvent, StreamMessageStart};
pub use tool::{Tool, ToolChoice};
