//! Shop backend adapter.

pub mod client;

pub use client::ShopClient;
