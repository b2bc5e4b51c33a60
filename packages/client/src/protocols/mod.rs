//! Transports and the cascade that falls back across them

pub mod cascade;
pub(crate) mod connection;
pub mod core;
pub mod h1;
pub mod h2;
pub mod h3;
mod redirect;
pub mod strategy_trait;

pub use cascade::Cascade;
pub use core::{FetchRequest, TransportKind};
pub use h1::H1Transport;
pub use h2::H2Transport;
pub use h3::H3Transport;
pub use strategy_trait::Transport;
