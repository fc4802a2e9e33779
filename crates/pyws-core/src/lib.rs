pub mod activation;
pub mod config;
pub mod error;
pub mod io;
pub mod launcher;
pub mod maintenance;
pub mod paths;
pub mod resolve;
pub mod runner;
pub mod scaffold;
pub mod workspace;

pub use error::{PywsError, Result};
