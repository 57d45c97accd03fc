pub mod chat;
pub mod events;
pub mod gifts;
pub mod ranking;
pub mod streams;
pub mod transactions;
pub mod users;
