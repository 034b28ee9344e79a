pub mod attendance;
pub mod classes;
pub mod core;
pub mod schools;
pub mod students;
pub mod sync;
