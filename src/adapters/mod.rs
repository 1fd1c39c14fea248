//! Adapter implementations for port traits.
//!
//! - `live/` — OpenAI-compatible provider client and MySQL record store
//! - `memory/` — In-memory stand-ins used by the test suite

pub mod live;
#[cfg(test)]
pub mod memory;
