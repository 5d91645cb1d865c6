//! GTK4 + layer-shell switcher overlay that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                            (layer-shell overlay, exclusive keyboard)
//! └ .switcher                       (vertical box)
//!     ├ .switcher-status            ("<b>2/5</b> - firefox (WS 2)")
//!     ├ GtkScrolledWindow
//!     │   └ GtkListBox
//!     │       ├ .window-item.window-active    (icon, class, title, workspace)
//!     │       └ .window-item.window-hidden    (icon, class, title (Hidden))
//!     └ .switcher-hint
//! ```
//!
//! # CSS selectors
//!
//! | Selector            | Targets                                   |
//! |---------------------|-------------------------------------------|
//! | `window`            | The overlay window                        |
//! | `.window-item`      | Every row                                 |
//! | `.window-active`    | Rows of windows on a regular workspace    |
//! | `.window-hidden`    | Rows of minimized windows                 |
//! | `.minimized`        | Title label of a minimized row            |
//! | `.workspace-number` | Workspace id at the end of a row          |
//!
//! A user stylesheet replaces the built-in one entirely.

use crate::command::{Flow, UiEvent};
use crate::config::{VisualizerConfig, APP_NAME};
use crate::switcher::Switcher;
use crate::traits::Hyprctl;
use crate::window::WindowRecord;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::LayerShell;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window {
    background-color: rgba(0, 0, 0, 0.9);
    border-radius: 10px;
    border: 2px solid #555;
}

* {
    transition: none;
    animation: none;
}

.window-item {
    padding: 10px;
    margin: 2px;
    border-radius: 5px;
    background-color: rgba(255, 255, 255, 0.1);
    min-height: 60px;
}

.window-item:selected {
    background-color: rgba(100, 150, 255, 0.8);
}

.window-active {
    background-color: rgba(0, 100, 150, 0.3);
}

.window-active:selected {
    background-color: rgba(0, 100, 150, 0.8);
    border-left: 6px solid #00ff66;
    border-right: 6px solid #00ff66;
}

.window-active:hover {
    background-color: rgba(0, 100, 255, 0.8);
}

.window-hidden {
    background-color: rgba(100, 0, 0, 0.3);
}

.window-hidden:selected {
    background-color: rgba(100, 0, 0, 0.8);
    border-left: 6px solid #ff3333;
    border-right: 6px solid #ff3333;
}

.window-hidden:hover {
    background-color: rgba(200, 0, 0, 0.8);
}

.minimized {
    color: #888;
}

.workspace-number {
    opacity: 0.5;
    font-weight: bold;
    font-size: 14px;
    color: #ffffff;
    min-width: 25px;
}
"#;

const HINT_MARKUP: &str =
    "<small>Hold Alt + Tab to cycle • Release Alt to switch • Esc to cancel</small>";

/// Errors that keep the overlay from starting.
#[derive(Debug, thiserror::Error)]
pub enum VisualizerError {
    #[error("failed to initialise GTK4: {0}")]
    Init(#[from] glib::BoolError),
}

//  Overlay widgets

struct Overlay {
    window: gtk4::Window,
    list: gtk4::ListBox,
    status: gtk4::Label,
    main_loop: glib::MainLoop,
    close_delay: Duration,
    closing: Cell<bool>,
    /// The overlay opens from Alt+Tab, so Alt starts out held.
    alt_held: Cell<bool>,
}

impl Overlay {
    fn new(config: &VisualizerConfig, main_loop: glib::MainLoop) -> Self {
        let window = gtk4::Window::new();
        window.set_title(Some("HyprTabs"));
        window.init_layer_shell();
        window.set_layer(gtk4_layer_shell::Layer::Overlay);
        window.set_namespace(APP_NAME);
        window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::Exclusive);
        window.set_decorated(false);
        window.set_resizable(false);
        window.set_default_size(config.width, config.height);
        window.set_size_request(config.width, config.height);

        let container = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
        container.add_css_class("switcher");
        container.set_margin_top(15);
        container.set_margin_bottom(15);
        container.set_margin_start(15);
        container.set_margin_end(15);
        window.set_child(Some(&container));

        let status = gtk4::Label::new(None);
        status.add_css_class("switcher-status");
        status.set_markup("<b>Alt+Tab Window Switcher</b>");
        container.append(&status);

        let list = gtk4::ListBox::new();
        list.set_selection_mode(gtk4::SelectionMode::Single);
        list.set_activate_on_single_click(true);

        let scroller = gtk4::ScrolledWindow::new();
        scroller.set_policy(gtk4::PolicyType::Never, gtk4::PolicyType::Automatic);
        scroller.set_vexpand(true);
        scroller.set_child(Some(&list));
        container.append(&scroller);

        let hint = gtk4::Label::new(None);
        hint.add_css_class("switcher-hint");
        hint.set_markup(HINT_MARKUP);
        container.append(&hint);

        Self {
            window,
            list,
            status,
            main_loop,
            close_delay: Duration::from_millis(config.close_delay_ms),
            closing: Cell::new(false),
            alt_held: Cell::new(true),
        }
    }

    /// Rebuild every row from the controller's list.
    fn populate<H: Hyprctl>(&self, switcher: &Switcher<H>) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for window in switcher.windows() {
            self.list.append(&window_row(window));
        }
        self.sync(switcher);
    }

    /// Move the highlighted row and the status line to the cursor.
    fn sync<H: Hyprctl>(&self, switcher: &Switcher<H>) {
        let index = switcher.selected_index();
        if let Some(row) = i32::try_from(index).ok().and_then(|i| self.list.row_at_index(i)) {
            self.list.select_row(Some(&row));
            row.grab_focus();
        }
        if let Some(line) = switcher.status_line() {
            self.status.set_markup(&status_markup(&line));
        }
    }

    /// Stop the main loop, after the close delay when a window was just
    /// focused.
    fn quit(&self, delayed: bool) {
        if self.closing.replace(true) {
            return;
        }
        self.window.set_visible(false);
        let main_loop = self.main_loop.clone();
        if delayed && !self.close_delay.is_zero() {
            glib::timeout_add_local_once(self.close_delay, move || main_loop.quit());
        } else {
            main_loop.quit();
        }
    }
}

/// `"2/5 - firefox (WS 2)"` → `"<b>2/5</b> - firefox (WS 2)"`.
fn status_markup(line: &str) -> String {
    match line.split_once(" - ") {
        Some((count, rest)) => format!("<b>{}</b> - {}", count, glib::markup_escape_text(rest)),
        None => glib::markup_escape_text(line).to_string(),
    }
}

fn window_row(window: &WindowRecord) -> gtk4::ListBoxRow {
    let row = gtk4::ListBoxRow::new();
    row.add_css_class("window-item");
    row.add_css_class(if window.is_minimized {
        "window-hidden"
    } else {
        "window-active"
    });

    let line = gtk4::Box::new(gtk4::Orientation::Horizontal, 10);

    let icon = gtk4::Label::new(Some(&window.icon));
    icon.set_size_request(30, -1);
    line.append(&icon);

    let info = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    info.set_hexpand(true);

    let class = gtk4::Label::new(None);
    class.set_halign(gtk4::Align::Start);
    class.set_markup(&format!("<b>{}</b>", glib::markup_escape_text(&window.class_name)));
    class.set_ellipsize(gtk4::pango::EllipsizeMode::End);
    class.set_max_width_chars(40);
    info.append(&class);

    let title = gtk4::Label::new(None);
    title.set_halign(gtk4::Align::Start);
    title.set_ellipsize(gtk4::pango::EllipsizeMode::End);
    title.set_max_width_chars(50);
    if window.is_minimized {
        title.add_css_class("minimized");
        title.set_markup(&format!(
            "<i>{} (Hidden)</i>",
            glib::markup_escape_text(&window.title)
        ));
    } else {
        title.set_text(&window.title);
    }
    info.append(&title);
    line.append(&info);

    let workspace = if window.is_minimized {
        gtk4::Label::new(None)
    } else {
        let label = gtk4::Label::new(Some(&window.workspace_id.to_string()));
        label.add_css_class("workspace-number");
        label
    };
    workspace.set_valign(gtk4::Align::Center);
    workspace.set_size_request(30, -1);
    line.append(&workspace);

    row.set_child(Some(&line));
    row
}

/// Apply one event to the controller and reflect it in the overlay.
fn handle<H: Hyprctl>(overlay: &Overlay, switcher: &RefCell<Switcher<H>>, event: UiEvent) {
    if overlay.closing.get() {
        debug!("ignoring {} while closing", event);
        return;
    }
    if event == UiEvent::Activate {
        // Drop the exclusive keyboard grab before focus moves.
        overlay.window.set_visible(false);
    }
    let flow = switcher.borrow_mut().dispatch(event);
    match flow {
        Flow::Redraw => overlay.sync(&switcher.borrow()),
        Flow::Quit => overlay.quit(event == UiEvent::Activate),
    }
}

fn is_alt(key: gdk::Key) -> bool {
    matches!(key, gdk::Key::Alt_L | gdk::Key::Alt_R)
}

/// Whether a key release ends the Alt+Tab gesture: Alt itself, or any key
/// once Alt has left the modifier state (a missed Alt release).
fn releases_switch(key: gdk::Key, state: gdk::ModifierType, alt_held: bool) -> bool {
    is_alt(key) || (alt_held && !state.contains(gdk::ModifierType::ALT_MASK))
}

fn key_event(key: gdk::Key, state: gdk::ModifierType) -> Option<UiEvent> {
    match key {
        gdk::Key::Tab if state.contains(gdk::ModifierType::SHIFT_MASK) => Some(UiEvent::Prev),
        gdk::Key::ISO_Left_Tab => Some(UiEvent::Prev),
        gdk::Key::Tab | gdk::Key::Down | gdk::Key::j => Some(UiEvent::Next),
        gdk::Key::Up | gdk::Key::k => Some(UiEvent::Prev),
        gdk::Key::Return | gdk::Key::space | gdk::Key::KP_Enter => Some(UiEvent::Activate),
        gdk::Key::Escape => Some(UiEvent::Close),
        _ => None,
    }
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread until the
/// overlay closes.
///
/// `switcher` must already be refreshed.  Events from other invocations
/// arrive on `cmd_rx` and are applied in order alongside keyboard input.
/// SIGINT, SIGTERM and SIGHUP stop the loop so the caller can clean up.
pub fn run_main_loop<H: Hyprctl + 'static>(
    switcher: Switcher<H>,
    cmd_rx: mpsc::Receiver<UiEvent>,
    css_path: Option<PathBuf>,
    config: VisualizerConfig,
) -> Result<(), VisualizerError> {
    gtk4::init()?;
    info!("GTK4 initialised on main thread");

    load_css(&css_path);

    let main_loop = glib::MainLoop::new(None, false);
    let overlay = Rc::new(Overlay::new(&config, main_loop.clone()));
    let switcher = Rc::new(RefCell::new(switcher));

    overlay.populate(&switcher.borrow());

    //  Keyboard
    let keys = gtk4::EventControllerKey::new();
    keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
    {
        let overlay = overlay.clone();
        let switcher = switcher.clone();
        keys.connect_key_pressed(move |_, key, _, state| {
            if is_alt(key) || state.contains(gdk::ModifierType::ALT_MASK) {
                overlay.alt_held.set(true);
            }
            match key_event(key, state) {
                Some(event) => {
                    handle(&overlay, &switcher, event);
                    glib::Propagation::Stop
                }
                None => glib::Propagation::Proceed,
            }
        });
    }
    {
        let overlay = overlay.clone();
        let switcher = switcher.clone();
        keys.connect_key_released(move |_, key, _, state| {
            if releases_switch(key, state, overlay.alt_held.get()) {
                debug!("alt released");
                overlay.alt_held.set(false);
                handle(&overlay, &switcher, UiEvent::Activate);
            }
        });
    }
    overlay.window.add_controller(keys);

    //  Mouse
    {
        let weak = Rc::downgrade(&overlay);
        let switcher = switcher.clone();
        overlay.list.connect_row_activated(move |_, row| {
            let Some(overlay) = weak.upgrade() else {
                return;
            };
            let picked = usize::try_from(row.index())
                .map(|i| switcher.borrow_mut().select(i))
                .unwrap_or(false);
            if picked {
                handle(&overlay, &switcher, UiEvent::Activate);
            }
        });
    }

    {
        let weak = Rc::downgrade(&overlay);
        overlay.window.connect_close_request(move |_| {
            if let Some(overlay) = weak.upgrade() {
                overlay.quit(false);
            }
            glib::Propagation::Proceed
        });
    }

    //  Signals
    for signum in [nix::libc::SIGINT, nix::libc::SIGTERM, nix::libc::SIGHUP] {
        let overlay = overlay.clone();
        glib::unix_signal_add_local(signum, move || {
            info!("signal {} received, closing", signum);
            overlay.quit(false);
            glib::ControlFlow::Break
        });
    }

    //  Command channel
    {
        let overlay = overlay.clone();
        let switcher = switcher.clone();
        glib::timeout_add_local(Duration::from_millis(config.poll_ms.max(1)), move || {
            loop {
                match cmd_rx.try_recv() {
                    Ok(event) => handle(&overlay, &switcher, event),
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        warn!("command listener gone; keyboard only from now on");
                        return glib::ControlFlow::Break;
                    }
                }
            }
            glib::ControlFlow::Continue
        });
    }

    overlay.window.present();
    info!(
        "overlay shown: {} window(s), {}x{}, CSS: {}",
        switcher.borrow().windows().len(),
        config.width,
        config.height,
        css_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".into()),
    );

    info!("entering GLib main loop");
    main_loop.run();
    overlay.window.close();
    info!("GLib main loop exited");
    Ok(())
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => {
            info!("no user CSS, using built-in default");
            DEFAULT_CSS.to_string()
        }
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
        info!("CSS registered on display");
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_markup_bolds_the_counter() {
        assert_eq!(
            status_markup("2/5 - firefox (WS 2)"),
            "<b>2/5</b> - firefox (WS 2)"
        );
        assert_eq!(
            status_markup("1/1 - a&b (Hidden)"),
            "<b>1/1</b> - a&amp;b (Hidden)"
        );
    }

    #[test]
    fn alt_release_and_missed_release_activate() {
        let alt = gdk::ModifierType::ALT_MASK;
        let none = gdk::ModifierType::empty();
        assert!(releases_switch(gdk::Key::Alt_L, alt, true));
        assert!(releases_switch(gdk::Key::Alt_R, none, false));
        // Tab released after Alt's own release event was lost.
        assert!(releases_switch(gdk::Key::Tab, none, true));
        // Tab released while Alt is still down.
        assert!(!releases_switch(gdk::Key::Tab, alt, true));
        // Alt already handled.
        assert!(!releases_switch(gdk::Key::Tab, none, false));
    }

    #[test]
    fn keys_map_to_events() {
        let none = gdk::ModifierType::empty();
        assert_eq!(key_event(gdk::Key::Tab, none), Some(UiEvent::Next));
        assert_eq!(
            key_event(gdk::Key::Tab, gdk::ModifierType::SHIFT_MASK),
            Some(UiEvent::Prev)
        );
        assert_eq!(key_event(gdk::Key::ISO_Left_Tab, none), Some(UiEvent::Prev));
        assert_eq!(key_event(gdk::Key::j, none), Some(UiEvent::Next));
        assert_eq!(key_event(gdk::Key::Up, none), Some(UiEvent::Prev));
        assert_eq!(key_event(gdk::Key::KP_Enter, none), Some(UiEvent::Activate));
        assert_eq!(key_event(gdk::Key::Escape, none), Some(UiEvent::Close));
        assert_eq!(key_event(gdk::Key::a, none), None);
    }
}
