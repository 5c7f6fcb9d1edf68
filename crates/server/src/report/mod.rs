//! Technical-sheet rendering through an external report server

pub mod client;

pub use client::HttpReportRenderer;
