pub mod health;
pub mod module;
pub mod room;
pub mod schedule;
pub mod session;
pub mod user;
