//! Application layer: the list engine, the moderation workflow and the ports
//! they drive.

pub mod error;
pub mod listing;
pub mod moderation;
pub mod pagination;
pub mod repos;
