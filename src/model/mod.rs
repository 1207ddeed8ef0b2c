pub mod admin;
pub mod attendance;
pub mod coordinate;
pub mod role;
pub mod zone;
