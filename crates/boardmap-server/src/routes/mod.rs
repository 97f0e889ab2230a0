pub mod events;
pub mod health;
pub mod markers;
pub mod proposals;
pub mod quota;
pub mod resolve;
pub mod theme;
