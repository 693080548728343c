//! Infrastructure layer: storage, mail, bot verification, config, workers.

pub mod bot;
pub mod config;
pub mod mail;
pub mod store;
pub mod workers;
