//! Presentation layer: pure state machines and render functions for every
//! dashboard region.
pub mod charts;
pub mod debounce;
pub mod detail;
pub mod export;
pub mod filters;
pub mod format;
pub mod health;
pub mod overview;
pub mod preview;
pub mod search;
pub mod sequence;
pub mod tabs;
pub mod view;
