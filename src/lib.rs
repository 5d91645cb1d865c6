//! **hyprtabs**: an Alt+Tab window switcher for Hyprland with
//! minimize/restore.
//!
//! Every window the compositor reports, including ones parked in the
//! `special:minimum` workspace, is listed in a layer-shell overlay.  The
//! focused window comes first, the rest are grouped by workspace, and
//! minimized windows sink to the bottom.  Activating a row focuses the
//! window, restoring it first when it was minimized.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Hyprctl`] abstracts the `hyprctl` executor so the
//!   compositor client can be driven by a scripted fake in tests.
//! * [`traits::CommandSource`] abstracts the transport that delivers
//!   [`command::UiEvent`]s from other invocations (the FIFO in [`ipc`]).
//!
//! [`hyprland::client::CompositorClient`] turns `hyprctl` replies into
//! [`window::WindowRecord`]s, [`aggregate`] merges them with the
//! [`store`], [`ordering`] sorts them, and [`switcher::Switcher`] owns the
//! resulting list and the selection.

pub mod actions;
pub mod aggregate;
pub mod command;
pub mod config;
pub mod hyprland;
pub mod icon;
pub mod ipc;
pub mod lock;
pub mod ordering;
pub mod store;
pub mod switcher;
pub mod traits;
pub mod visualizer;
pub mod window;
