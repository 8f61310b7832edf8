//! mdvs: the presentation layer of a medicine-catalog dashboard.
//!
//! The dashboard is a pure view-model ([`dashboard::Dashboard`]) over an
//! [`api::Api`] seam. It renders to an HTML/SVG node tree that the CLI prints
//! and the `web` server serves.

pub mod activity;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod ui;
pub mod web;
