//! Line protocol handling.
//!
//! Clients send one whitespace-separated command per line and receive one
//! JSON object per line in reply. This module holds the command parser,
//! the response encoding and the dispatcher that connects them to the
//! game registry.

pub mod dispatch;
pub mod parser;
pub mod response;

pub use dispatch::dispatch;
pub use parser::{parse_command, Command, ParseError};
pub use response::Response;
