//! LiveGo: a live-streaming social platform backend plus its client facade.
//!
//! The server side is a set of message-passing services over an in-memory
//! document store, fronted by an axum HTTP/WebSocket layer. The client side
//! is the [`client::Api`] capability set with a real HTTP implementation and
//! an in-memory mock, both feeding the same typed event bridge.

pub mod client;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;
