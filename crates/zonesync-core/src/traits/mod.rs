//! Core traits for zone synchronization
//!
//! This module defines the seam between the core library and network
//! implementations.

pub mod transport;

pub use transport::{ApiRequest, Command, RawResponse, Transport};
