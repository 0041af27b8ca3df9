#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod category;
mod config;
mod error;
mod fatigue;
mod generator;
mod progression;
mod service;
pub mod statistics;

pub use category::*;
pub use config::*;
pub use error::*;
pub use fatigue::*;
pub use generator::*;
pub use progression::*;
pub use service::*;
