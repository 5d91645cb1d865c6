//! Switcher overlay.
//!
//! When the `visualizer-gtk` feature is enabled, the
//! [`gtk::run_main_loop`] function takes over the main thread and
//! drives both FIFO command processing and rendering through the GLib
//! main loop.

#[cfg(feature = "visualizer-gtk")]
pub mod gtk;
