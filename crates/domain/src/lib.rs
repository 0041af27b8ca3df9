#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod name;
mod training;
mod user;
mod workout_session;

pub use error::*;
pub use exercise::*;
pub use name::*;
pub use training::*;
pub use user::*;
pub use workout_session::*;
