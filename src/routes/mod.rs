pub mod error;
pub mod health;
pub mod room;
pub mod timetable;
