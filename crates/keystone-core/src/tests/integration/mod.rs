#![cfg(test)]

pub mod bootstrap_tests;
pub mod common;
pub mod config_tests;
