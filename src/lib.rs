//! Cirrus Library
//!
//! Core modules for the Cirrus music daemon.

pub mod catalogue;
pub mod command_list;
pub mod config;
pub mod content;
pub mod daemon;
pub mod error;
pub mod model;
pub mod players;
pub mod playlist;
pub mod protocol;
pub mod session;
pub mod store;
pub mod tokenizer;
