// Crate root library declaration and module exports.
pub mod aggregator;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod controller;
pub mod index;
pub mod logging;
pub mod model;
pub mod mover;
pub mod paths;
pub mod reconcile;
pub mod reminder;
pub mod sources;
pub mod storage;
pub mod system;
pub mod template;
pub mod vault;
pub mod writer;
