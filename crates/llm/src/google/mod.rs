//! Dialect G wire types: the Google-Generative-Language-shaped API the gateway's
//! upstream speaks.

mod request;
mod response;

pub use request::{
    Content, FunctionCall, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration,
    FunctionResponse, GenerateRequest, GenerationConfig, InlineData, Part, SafetySetting,
    SystemInstruction, Tool, ToolConfig,
};
pub use response::{Candidate, GenerateResponse, UsageMetadata};
