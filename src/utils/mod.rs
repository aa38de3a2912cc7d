pub mod format;
pub mod punch_guard;
pub mod time;
pub mod validation;
