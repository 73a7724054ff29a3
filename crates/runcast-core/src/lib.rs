// Library root for the data side of runcast: records, the repository the
// engine reads through, the weight store, and configuration.

pub mod config;
pub mod db;
pub mod model;
pub mod player_id;
pub mod repository;
pub mod stat;
pub mod teams;
pub mod weights;
