//! Walltone - color-filtered wallpaper delivery
//!
//! Fetches a remote image, applies the user's color filters and per-surface
//! pan/zoom, and hands the result to the platform wallpaper surface through
//! a fallback ladder. This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
