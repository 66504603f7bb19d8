//! Shared data model for the EC2 Ansible dynamic-inventory tool.

pub mod error;
pub mod models;

pub use error::Error;
pub use models::{GroupVars, HostVars, InstanceRecord, InstanceTag, Inventory, TagFilter};

pub type Result<T> = std::result::Result<T, Error>;
