pub mod common;
pub mod demand;
pub mod position;
pub mod shift;
pub mod user;
