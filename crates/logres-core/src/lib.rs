pub mod config;
pub mod logging;

// Pipeline modules, leaf to engine
pub mod catalog;
pub mod checksum;
pub mod discovery;
pub mod installer;
pub mod select;
pub mod winepath;
