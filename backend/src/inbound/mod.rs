//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers, extractors and the shared handler state live under
//! [`http`].

pub mod http;
