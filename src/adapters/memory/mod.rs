//! In-memory adapters for exercising the service without a database or
//! network.

pub mod image_generator;
pub mod record_store;

pub use image_generator::MemoryImageGenerator;
pub use record_store::MemoryRecordStore;
