//! Stockroom API library.
//!
//! This crate provides the catalog/order service as a library, allowing it
//! to be tested end-to-end (router + in-memory store) and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
