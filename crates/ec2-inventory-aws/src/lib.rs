//! EC2 integration: session opening, the instance-source seam, and
//! inventory assembly.

pub mod inventory;
pub mod session;
pub mod source;

pub use inventory::build_inventory;
pub use session::{open_session, SessionConfig};
pub use source::{Ec2InstanceSource, InstanceSource};
