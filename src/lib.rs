pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::Config;
pub use crate::core::{AudioDownloader, ConvertError, Session, TrackInfo};
