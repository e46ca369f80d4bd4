pub mod action;
pub mod config;
pub mod error;
pub mod judgedata;
pub mod models;
pub mod runner;
pub mod split;
pub mod str_interp;
pub mod style;
pub mod testing;
pub mod timestamp;
pub mod verify;

pub use crate::config::Config;
pub use crate::verify::Verifier;
