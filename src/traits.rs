//! Core traits that decouple hyprtabs from the concrete compositor command
//! and from the transport that delivers external commands.
//!
//! The [`Switcher`](crate::switcher::Switcher) and
//! [`CompositorClient`](crate::hyprland::client::CompositorClient) only
//! depend on these abstractions, so tests can swap in recording doubles.

use crate::command::UiEvent;
use std::sync::mpsc;

/// Executor for the compositor's control command.
///
/// An implementation might spawn `hyprctl`, or it might be a scripted
/// double used in tests.
pub trait Hyprctl {
    /// Run the control command with `args` and return its standard output.
    ///
    /// Returns `None` when the command could not be launched or reported a
    /// failure.  Callers treat `None` exactly like "no data".
    fn run(&self, args: &[&str]) -> Option<String>;
}

impl<H: Hyprctl + ?Sized> Hyprctl for &H {
    fn run(&self, args: &[&str]) -> Option<String> {
        (**self).run(args)
    }
}

/// A source of [`UiEvent`]s from outside the UI thread.
///
/// Implementations listen on some transport (a named pipe, a test harness,
/// …) and forward parsed events into the provided bounded
/// [`mpsc::SyncSender`].  They never touch the window list themselves.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is stopped or
///   an unrecoverable error occurs.
/// * Each received event must be sent through `sink` exactly once, in
///   arrival order.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`UiEvent`] into `sink`.
    fn run(&mut self, sink: mpsc::SyncSender<UiEvent>) -> Result<(), Self::Error>;
}
