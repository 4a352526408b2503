//! Order publisher: accept an order from a web form, store it in a key-value
//! store, notify a topic on the bus, and serve the stored record back by id.

pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod models;
pub mod storage;
pub mod web;
