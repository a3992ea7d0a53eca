pub mod config;
mod context;
pub mod prefs;
pub mod register;
pub mod tone;
