#![forbid(unsafe_code)]

pub(crate) mod framing;
mod stdio;

pub(crate) use stdio::run_stdio;
