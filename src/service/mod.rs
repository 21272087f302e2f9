pub mod admission;
pub mod conflict;
pub mod interval;
pub mod locks;
pub mod timetable;
pub mod validation;
