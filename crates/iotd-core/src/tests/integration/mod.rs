#![cfg(test)]

pub mod common;
pub mod config_tests;
pub mod ingestion_tests;
pub mod node_format_tests;
