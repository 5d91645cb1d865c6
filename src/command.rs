//! Commands and types used throughout hyprtabs.
//!
//! [`UiEvent`] is the vocabulary shared by the keyboard handlers, the FIFO
//! listener and the [`Switcher`](crate::switcher::Switcher).  [`Invocation`]
//! describes what a single run of the `hyprtabs` binary was asked to do.

use std::fmt;
use std::str::FromStr;

/// A semantic request coming from the keyboard, the mouse or the FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEvent {
    /// Move the selection one row down (wrapping).
    Next,
    /// Move the selection one row up (wrapping).
    Prev,
    /// Focus (or restore) the selected window and dismiss the switcher.
    Activate,
    /// Dismiss the switcher without changing focus.
    Close,
}

impl UiEvent {
    /// Every event, in the order the dispatch table is built.
    pub const ALL: [UiEvent; 4] = [UiEvent::Next, UiEvent::Prev, UiEvent::Activate, UiEvent::Close];

    /// Parse one line received over the FIFO.
    ///
    /// Surrounding whitespace is ignored; anything that is not one of the
    /// four known words yields `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        line.trim().parse().ok()
    }
}

impl fmt::Display for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiEvent::Next => write!(f, "next"),
            UiEvent::Prev => write!(f, "prev"),
            UiEvent::Activate => write!(f, "activate"),
            UiEvent::Close => write!(f, "close"),
        }
    }
}

/// Error returned when a string is not a known [`UiEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0:?}")]
pub struct UnknownEvent(String);

impl FromStr for UiEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(UiEvent::Next),
            "prev" => Ok(UiEvent::Prev),
            "activate" => Ok(UiEvent::Activate),
            "close" => Ok(UiEvent::Close),
            other => Err(UnknownEvent(other.to_string())),
        }
    }
}

/// What the UI loop should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The selection (or list) changed; re-render and keep running.
    Redraw,
    /// Tear the overlay down.
    Quit,
}

/// One invocation of the binary, parsed from `argv[1..]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// No arguments: show the switcher.
    Show,
    Help,
    Version,
    /// `next` / `prev` / `activate` / `close` aimed at a running instance.
    Forward(UiEvent),
    /// Minimize the currently focused window.
    Minimize,
    /// Restore one minimized window by address.
    Restore(String),
    RestoreAll,
    /// Restore the most recently minimized window.
    RestoreLast,
    /// Print a Waybar status line.
    Status,
}

impl Invocation {
    /// Parse the process arguments (without the program name).
    ///
    /// `--help` / `--version` win wherever they appear.  Unrecognised
    /// arguments fall back to [`Invocation::Show`].
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();

        for arg in &args {
            match arg.as_str() {
                "--help" | "-h" => return Invocation::Help,
                "--version" | "-v" => return Invocation::Version,
                _ => {}
            }
        }

        match args.first().map(String::as_str) {
            Some("minimize") => Invocation::Minimize,
            Some("restore") => match args.get(1) {
                Some(address) => Invocation::Restore(address.clone()),
                None => Invocation::Show,
            },
            Some("restore-all") => Invocation::RestoreAll,
            Some("restore-last") => Invocation::RestoreLast,
            Some("show") => Invocation::Status,
            Some(word) => match word.parse::<UiEvent>() {
                Ok(event) => Invocation::Forward(event),
                Err(_) => Invocation::Show,
            },
            None => Invocation::Show,
        }
    }
}

/// What an overlay-related invocation does, given whether an instance
/// already holds the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Write the event to the running instance.
    Forward(UiEvent),
    /// Become the instance.
    Start,
    /// Plain invocation while another instance runs: refuse (exit 1).
    AlreadyRunning,
    /// Nothing to act on.
    Idle,
}

impl Invocation {
    /// How to launch for this invocation.  `None` for the one-shot
    /// subcommands, which never touch the running instance.
    pub fn launch(&self, instance_running: bool) -> Option<Launch> {
        let launch = match (self, instance_running) {
            (Invocation::Show, true) => Launch::AlreadyRunning,
            (Invocation::Show, false) => Launch::Start,
            (Invocation::Forward(event), true) => Launch::Forward(*event),
            (Invocation::Forward(UiEvent::Next | UiEvent::Prev), false) => Launch::Start,
            (Invocation::Forward(_), false) => Launch::Idle,
            _ => return None,
        };
        Some(launch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_lines() {
        assert_eq!(UiEvent::parse_line("next"), Some(UiEvent::Next));
        assert_eq!(UiEvent::parse_line("prev\n"), Some(UiEvent::Prev));
        assert_eq!(UiEvent::parse_line("  activate "), Some(UiEvent::Activate));
        assert_eq!(UiEvent::parse_line("close"), Some(UiEvent::Close));
    }

    #[test]
    fn unknown_lines_are_ignored() {
        assert_eq!(UiEvent::parse_line(""), None);
        assert_eq!(UiEvent::parse_line("NEXT"), None);
        assert_eq!(UiEvent::parse_line("next please"), None);
    }

    #[test]
    fn display_matches_wire_words() {
        for event in UiEvent::ALL {
            assert_eq!(UiEvent::parse_line(&event.to_string()), Some(event));
        }
    }

    #[test]
    fn invocation_flags() {
        assert_eq!(Invocation::parse(Vec::<String>::new()), Invocation::Show);
        assert_eq!(Invocation::parse(["--help"]), Invocation::Help);
        assert_eq!(Invocation::parse(["-v"]), Invocation::Version);
        assert_eq!(Invocation::parse(["next", "--version"]), Invocation::Version);
    }

    #[test]
    fn invocation_subcommands() {
        assert_eq!(Invocation::parse(["next"]), Invocation::Forward(UiEvent::Next));
        assert_eq!(Invocation::parse(["close"]), Invocation::Forward(UiEvent::Close));
        assert_eq!(Invocation::parse(["minimize"]), Invocation::Minimize);
        assert_eq!(
            Invocation::parse(["restore", "0x55d1"]),
            Invocation::Restore("0x55d1".into())
        );
        assert_eq!(Invocation::parse(["restore-all"]), Invocation::RestoreAll);
        assert_eq!(Invocation::parse(["restore-last"]), Invocation::RestoreLast);
        assert_eq!(Invocation::parse(["show"]), Invocation::Status);
    }

    #[test]
    fn launch_decisions() {
        assert_eq!(Invocation::Show.launch(false), Some(Launch::Start));
        assert_eq!(Invocation::Show.launch(true), Some(Launch::AlreadyRunning));

        let next = Invocation::Forward(UiEvent::Next);
        assert_eq!(next.launch(true), Some(Launch::Forward(UiEvent::Next)));
        assert_eq!(next.launch(false), Some(Launch::Start));
        assert_eq!(
            Invocation::Forward(UiEvent::Prev).launch(false),
            Some(Launch::Start)
        );

        let close = Invocation::Forward(UiEvent::Close);
        assert_eq!(close.launch(true), Some(Launch::Forward(UiEvent::Close)));
        assert_eq!(close.launch(false), Some(Launch::Idle));
        assert_eq!(
            Invocation::Forward(UiEvent::Activate).launch(false),
            Some(Launch::Idle)
        );

        assert_eq!(Invocation::Minimize.launch(true), None);
        assert_eq!(Invocation::Status.launch(false), None);
    }

    #[test]
    fn unknown_arguments_show_the_switcher() {
        assert_eq!(Invocation::parse(["--frobnicate"]), Invocation::Show);
        assert_eq!(Invocation::parse(["restore"]), Invocation::Show);
    }
}
