pub mod environment;
pub mod error;
pub mod executor;

pub use error::RunError;
pub use executor::{Executor, Invocation};
