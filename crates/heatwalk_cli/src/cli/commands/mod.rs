pub mod config;
pub mod preview;
pub mod route;
pub mod simulate;
