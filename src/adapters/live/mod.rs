//! Live adapters backed by the real provider API and MySQL.

pub mod mysql;
pub mod openai;
