//! Agent registry contract access.

pub mod abi;
pub mod client;
