//! London journey planner server.
//!
//! A web application that finds London locations by name, postcode or
//! address and asks the TfL Unified API how to travel between them.

pub mod config;
pub mod domain;
pub mod format;
pub mod geocode;
pub mod plan;
pub mod query;
pub mod resolver;
pub mod tfl;
pub mod web;
