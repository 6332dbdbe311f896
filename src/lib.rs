#[macro_use]
extern crate tracing;

pub mod builder;
pub mod config;
pub mod discovery;
pub mod fanout;
pub mod reload;
pub mod shutdown;
pub mod status;
pub mod supervisor;
#[cfg(test)]
mod testing;
pub mod trace;
pub mod translate;

pub use shutdown::{ShutdownSignal, Trigger};
pub use supervisor::{Supervisor, UpdateError};

/// Basic error type, dynamically dispatched and safe to send across threads
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Basic result type, defined in terms of [`Error`] and generic over `T`
pub type Result<T> = std::result::Result<T, Error>;

/// The `User-Agent` engines send with scrape requests.
pub fn user_agent() -> String {
    format!("scrape-supervisor/{}", env!("CARGO_PKG_VERSION"))
}
