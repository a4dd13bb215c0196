#![forbid(unsafe_code)]

pub mod client;
pub mod dto;
pub mod error;
pub mod memory;
pub mod remote;

pub use client::{ApiClient, ApiConfig};
pub use error::ApiError;
pub use memory::InMemoryApi;
pub use remote::StudyApi;
