//! Command channel between invocations.
//!
//! The running switcher reads a named pipe; `hyprtabs next` and friends
//! write single words into it.

pub mod fifo;
