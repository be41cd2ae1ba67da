pub mod config;
pub mod consts;
pub mod digest;
pub mod executor;
pub mod planner;
pub mod prompts;
pub mod protocol;
pub mod queue;
pub mod search;
pub mod server;
pub mod webhook;
