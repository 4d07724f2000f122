//! Value objects - immutable types that represent domain concepts

mod actor;
mod capabilities;
mod role;

pub use actor::Actor;
pub use capabilities::Capabilities;
pub use role::Role;
