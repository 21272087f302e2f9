pub mod entity_store;
pub mod module;
pub mod postgres_repository;
pub mod room;
pub mod session;
pub mod user;
