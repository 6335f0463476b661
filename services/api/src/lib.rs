//! services/api/src/lib.rs
//!
//! HTTP service for shared savings groups: accounts, groups, contributions
//! and the progress figures derived from them.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
