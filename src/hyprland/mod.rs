//! Hyprland-specific implementations.
//!
//! This module provides the concrete [`Hyprctl`](crate::traits::Hyprctl)
//! executor and the typed client built on top of it.
//!
//! Nothing outside this module should build `hyprctl` argument lists
//! directly.

pub mod cache;
pub mod client;
pub mod ctl;
