//! CLI subcommand implementations for the Agora binary.

pub mod ask_cmd;
pub mod chat_cmd;
pub mod converse_cmd;
pub mod output;
pub mod panel_cmd;
