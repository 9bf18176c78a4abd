#![forbid(unsafe_code)]

mod args;
mod jsonrpc;
mod log;
mod time;

pub(crate) use args::*;
pub(crate) use jsonrpc::*;
pub(crate) use log::log_line;
pub(crate) use time::now_rfc3339;
