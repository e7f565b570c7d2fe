//! Feature-flag decision sources.

pub mod flagd;

pub use cart::ports::NoopFlagSource;
pub use flagd::FlagdClient;
