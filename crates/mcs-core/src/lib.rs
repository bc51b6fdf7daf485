//! Server-lifecycle allocator for hosted Minecraft servers: port reservation,
//! workload and exposure rendering, and their submission to and removal from
//! the cluster.

pub mod error;
pub mod models;
pub mod services;

pub use error::{HostingError, Result};
