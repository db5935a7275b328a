pub mod config;
pub mod run;
mod terminal;
mod watch;
