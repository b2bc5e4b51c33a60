//! HTTP/1.1 transport over hyper's connection-level client

mod strategy;

pub use strategy::H1Transport;
