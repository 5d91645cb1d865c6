//! Entry point for **hyprtabs**.
//!
//! Without arguments (or with `next` / `prev`) the first invocation takes
//! the instance lock, opens the command FIFO and shows the overlay.  While
//! it runs, `next` / `prev` / `activate` / `close` are forwarded to it and a
//! bare invocation exits with 1.  The minimize/restore subcommands run once
//! and exit.
//!
//! When the `visualizer-gtk` feature is enabled the main thread runs the
//! GLib main loop and polls the command channel from there.  Without the
//! feature, a simple blocking loop is used instead.

use hyprtabs::actions;
use hyprtabs::command::{Invocation, Launch, UiEvent};
use hyprtabs::config::{config_dir, Config};
use hyprtabs::hyprland::cache::SnapshotCache;
use hyprtabs::hyprland::client::CompositorClient;
use hyprtabs::hyprland::ctl::HyprctlCommand;
use hyprtabs::ipc::fifo::{self, FifoListener};
use hyprtabs::lock::InstanceLock;
use hyprtabs::store::MinimizedStore;
use hyprtabs::switcher::Switcher;
use hyprtabs::traits::{CommandSource, Hyprctl};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

const USAGE: &str = "\
Usage: hyprtabs [COMMAND]

Alt+Tab window switcher for Hyprland.

Commands:
  (none)             show the switcher (fails if one is running)
  next | prev        cycle the running switcher (starts one if needed)
  activate | close   focus the selection / dismiss the running switcher
  minimize           hide the focused window
  restore <address>  bring a minimized window back
  restore-all        bring every minimized window back
  restore-last       bring the most recently minimized window back
  show               print a Waybar status line

Options:
  -h, --help         print this help
  -v, --version      print the version";

/// Try to load the config from `$XDG_CONFIG_HOME/hyprtabs/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Resolve the CSS stylesheet path.
#[cfg(feature = "visualizer-gtk")]
fn css_path() -> std::path::PathBuf {
    config_dir().join("style.css")
}

fn make_client(config: &Config) -> CompositorClient<HyprctlCommand> {
    CompositorClient::new(
        HyprctlCommand::new(config.hyprctl.clone()),
        SnapshotCache::new(config.cache_ttl()),
        MinimizedStore::new(&config.store_path),
    )
}

//  Main

fn main() {
    env_logger::init();
    let invocation = Invocation::parse(std::env::args().skip(1));
    std::process::exit(run(invocation));
}

fn run(invocation: Invocation) -> i32 {
    match invocation {
        Invocation::Help => {
            println!("{}", USAGE);
            return 0;
        }
        Invocation::Version => {
            println!("hyprtabs {}", env!("CARGO_PKG_VERSION"));
            return 0;
        }
        _ => {}
    }

    let config = load_config();
    match invocation {
        Invocation::Help | Invocation::Version => 0,
        Invocation::Status => {
            let count = MinimizedStore::new(&config.store_path).entries().len();
            println!("{}", actions::waybar_status(count));
            0
        }
        Invocation::Minimize => {
            let client = make_client(&config);
            if actions::minimize_focused(&client, &config.minimize_ignore_classes) {
                actions::signal_waybar(config.waybar_signal);
            }
            0
        }
        Invocation::Restore(address) => {
            let client = make_client(&config);
            if actions::restore_address(&client, &address) {
                actions::signal_waybar(config.waybar_signal);
            }
            0
        }
        Invocation::RestoreAll => {
            let client = make_client(&config);
            if actions::restore_all(&client) > 0 {
                actions::signal_waybar(config.waybar_signal);
            }
            0
        }
        Invocation::RestoreLast => {
            let client = make_client(&config);
            if actions::restore_last(&client) {
                actions::signal_waybar(config.waybar_signal);
            }
            0
        }
        Invocation::Show | Invocation::Forward(_) => {
            match invocation.launch(InstanceLock::is_held(&config.lock_path)) {
                Some(launch) => launch_overlay(&config, launch),
                None => 0,
            }
        }
    }
}

/// Forward to the running instance, or become it.
fn launch_overlay(config: &Config, launch: Launch) -> i32 {
    match launch {
        Launch::Forward(event) => match fifo::send(&config.fifo_path, event) {
            Ok(()) => {
                info!("forwarded {} to running instance", event);
                0
            }
            Err(e) => {
                error!("failed to forward {}: {}", event, e);
                1
            }
        },
        Launch::AlreadyRunning => {
            eprintln!("hyprtabs: another instance is already running");
            1
        }
        Launch::Idle => {
            info!("no running instance, nothing to do");
            0
        }
        Launch::Start => run_switcher(config),
    }
}

/// Own the lock and the FIFO for the lifetime of the overlay.
fn run_switcher(config: &Config) -> i32 {
    let mut lock = match InstanceLock::acquire(&config.lock_path) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("hyprtabs: {}", e);
            return 1;
        }
    };

    if let Err(e) = fifo::create(&config.fifo_path) {
        error!("{}", e);
        lock.release();
        return 1;
    }

    let running = Arc::new(AtomicBool::new(true));
    let (cmd_tx, cmd_rx) = mpsc::sync_channel::<UiEvent>(32);
    let listener = {
        let mut source = FifoListener::new(&config.fifo_path, running.clone());
        std::thread::spawn(move || {
            if let Err(e) = source.run(cmd_tx) {
                error!("fifo listener error: {}", e);
            }
        })
    };

    let mut switcher = Switcher::new(make_client(config), config.policy);
    switcher.refresh();

    let code = if switcher.windows().is_empty() {
        println!("No windows found.");
        0
    } else {
        start_event_loop(switcher, cmd_rx, config)
    };

    //  Cleanup
    running.store(false, Ordering::SeqCst);
    if listener.join().is_err() {
        warn!("fifo listener panicked");
    }
    fifo::remove(&config.fifo_path);
    lock.release();
    info!("exiting with {}", code);
    code
}

//  Event loops

#[cfg(feature = "visualizer-gtk")]
fn start_event_loop<H: Hyprctl + 'static>(
    switcher: Switcher<H>,
    cmd_rx: mpsc::Receiver<UiEvent>,
    config: &Config,
) -> i32 {
    match hyprtabs::visualizer::gtk::run_main_loop(
        switcher,
        cmd_rx,
        Some(css_path()),
        config.visualizer.clone(),
    ) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("hyprtabs: {}", e);
            1
        }
    }
}

#[cfg(not(feature = "visualizer-gtk"))]
fn start_event_loop<H: Hyprctl>(
    mut switcher: Switcher<H>,
    cmd_rx: mpsc::Receiver<UiEvent>,
    _config: &Config,
) -> i32 {
    use hyprtabs::command::Flow;

    info!("hyprtabs running headless");
    for event in cmd_rx {
        if switcher.dispatch(event) == Flow::Quit {
            break;
        }
        if let Some(line) = switcher.status_line() {
            println!("{}", line);
        }
    }
    0
}
