pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod table;
