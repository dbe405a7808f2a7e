//! Collapsible, windowed timeline of hierarchical events.
//!
//! The model ([`tree`], [`window`], [`scale`], [`layout`]) is independent of
//! the GUI; [`app`] and [`timeline`] draw it with iced.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod scale;
pub mod scrollbar;
pub mod throttle;
pub mod timeline;
pub mod tree;
pub mod ui;
pub mod window;

pub use error::{Error, Result};
