pub mod alarm;
pub mod catalog;
pub mod event;
pub mod occurrence;
pub mod reminder;
pub mod settings;
pub mod user;

pub use chrono;
pub use chrono_tz;
