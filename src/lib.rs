pub mod agenda;
pub mod calendar;
pub mod config;
pub mod event;
pub mod export;
pub mod filenames;
pub mod palette;
pub mod store;
pub mod theme;
