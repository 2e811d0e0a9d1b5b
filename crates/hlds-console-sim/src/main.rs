//! Simulated dedicated server with the console embedded.
//!
//! Runs a fixed-rate server tick, captures the process's own output into the
//! console and takes operator input from stdin. See `:help` for the console
//! controls.

mod logger;
mod operator;
mod server;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use hlds_console::{
    ConsoleConfig, ConsoleController, LogSink, PlayerColumn, PointerEvent, Rect, SelectorEvent,
    ViewportEvent,
};
use operator::{ConsoleVerb, OperatorInput};
use server::{ServerSettings, SimServer};
use std::cell::RefCell;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use terminal::TerminalView;

/// Screen and map control placement used to drive the map popup
const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 1280,
    height: 720,
};
const MAP_CONTROL: Rect = Rect {
    x: 298,
    y: 60,
    width: 200,
    height: 25,
};

#[derive(Parser, Debug)]
#[command(name = "hlds-console-sim")]
#[command(about = "Simulated dedicated server with an embedded admin console")]
struct Args {
    #[arg(long, help = "Console config file (defaults to .hlds-console.toml lookup)")]
    config: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Game directory containing maps/")]
    game_dir: PathBuf,

    #[arg(long, default_value = "de_dust", help = "Map to start on")]
    map: String,

    #[arg(long, default_value = "hlds-console simulator", help = "Server hostname")]
    hostname: String,

    #[arg(long, default_value_t = 16, help = "Maximum number of players")]
    max_players: u32,

    #[arg(long, default_value_t = 0.0, help = "Map time limit in minutes (0 = none)")]
    time_limit: f32,

    #[arg(long, default_value_t = 3, help = "Number of bots to start with")]
    bots: usize,

    #[arg(long, default_value_t = 20, help = "Server ticks per second")]
    tick_rate: u32,

    #[arg(long, default_value_t = 20, help = "Rows in the simulated log view")]
    view_rows: usize,

    #[arg(long, help = "Do not capture stdout/stderr")]
    no_capture: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_file = logger::init()?;
    log::info!("Starting hlds-console-sim, logging to {}", log_file.display());

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::load(),
    };
    if args.no_capture {
        config.capture_output = false;
    }

    // Must happen before capture takes over stdout.
    let view = Rc::new(RefCell::new(TerminalView::open(args.view_rows)?));
    let sink: Rc<RefCell<dyn LogSink>> = view.clone();

    let mut server = SimServer::new(ServerSettings {
        hostname: args.hostname.clone(),
        map: args.map.clone(),
        game_dir: args.game_dir.clone(),
        max_players: args.max_players,
        time_limit: args.time_limit.max(0.0) * 60.0,
        bots: args.bots,
    });

    let mut console = ConsoleController::new(config);
    console.initialize(&server);
    console.show(&sink, &server, Instant::now());
    view.borrow_mut()
        .print("Console ready. Type a server command, or :help for console controls.");

    let input = spawn_input_reader()?;
    let tick = Duration::from_secs_f64(1.0 / f64::from(args.tick_rate.max(1)));

    while server.is_running() {
        let started = Instant::now();

        server.advance(tick.as_secs_f32());
        if server.take_activated() {
            console.server_activated(&server);
        }

        loop {
            match input.try_recv() {
                Ok(line) => handle_input(&line, &mut console, &mut server, &view, &sink),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Operator input closed");
                    console.close(&mut server);
                    break;
                }
            }
        }

        console.tick(Instant::now(), &server);
        thread::sleep(tick.saturating_sub(started.elapsed()));
    }

    console.shutdown();
    log::info!("Exiting hlds-console-sim");
    Ok(())
}

/// Read stdin on a background thread; stdin is never captured.
fn spawn_input_reader() -> Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("Reading operator input failed: {}", e);
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn operator input thread")?;
    Ok(rx)
}

fn handle_input(
    line: &str,
    console: &mut ConsoleController,
    server: &mut SimServer,
    view: &Rc<RefCell<TerminalView>>,
    sink: &Rc<RefCell<dyn LogSink>>,
) {
    let print = |text: &str| view.borrow_mut().print(text);

    let (verb, argument) = match OperatorInput::parse(line) {
        OperatorInput::Empty => return,
        OperatorInput::Command(text) => {
            console.submit_command(&text, server);
            return;
        }
        OperatorInput::Unknown(word) => {
            print(&format!("Unknown console control :{}, try :help", word));
            return;
        }
        OperatorInput::Console { verb, argument } => (verb, argument),
    };
    log::debug!("Console control :{} {:?}", verb, argument);

    match verb {
        ConsoleVerb::Show => console.show(sink, &*server, Instant::now()),
        ConsoleVerb::Hide => {
            console.hide();
        }
        ConsoleVerb::Close => {
            console.close(server);
        }
        ConsoleVerb::Status => {
            for label in console.status().labels() {
                print(&label);
            }
        }
        ConsoleVerb::Players => {
            let columns: Vec<PlayerColumn> =
                PlayerColumn::iter().filter(|c| !c.is_action()).collect();
            let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
            print(&header.join("\t"));
            for player in &console.status().players {
                let row: Vec<String> = columns.iter().map(|c| c.cell(player)).collect();
                print(&row.join("\t"));
            }
        }
        ConsoleVerb::Maps => {
            let selected = console.map_selector().selected_index();
            for (index, map) in console.map_selector().items().iter().enumerate() {
                let marker = if Some(index) == selected { "*" } else { " " };
                print(&format!("{} {}", marker, map));
            }
        }
        ConsoleVerb::Pick => match argument.as_deref() {
            Some(name) => match pick_map(console, name) {
                Some(true) => print(&format!("Selected map: {}", name)),
                Some(false) => print("Map selection unchanged"),
                None => print(&format!("No map named {}", name)),
            },
            None => print(verb.usage()),
        },
        ConsoleVerb::Change => {
            if !console.change_map(server) {
                print("No map selected");
            }
        }
        ConsoleVerb::Restart => console.restart_map(server),
        ConsoleVerb::Kick | ConsoleVerb::Ban => {
            match argument.as_deref().and_then(|a| a.parse::<u32>().ok()) {
                Some(slot) if verb == ConsoleVerb::Kick => {
                    console.kick_player(slot, server);
                }
                Some(slot) => {
                    console.ban_player(slot, server);
                }
                None => print(verb.usage()),
            }
        }
        ConsoleVerb::History => {
            for (index, command) in console.history().entries().enumerate() {
                print(&format!("{:>3}  {}", index + 1, command));
            }
        }
        ConsoleVerb::Again => match console.history_up("") {
            Some(command) => {
                console.submit_command(&command, server);
            }
            None => print("History is empty"),
        },
        ConsoleVerb::Scroll => match argument.as_deref().and_then(|a| a.parse::<usize>().ok()) {
            Some(offset) => {
                view.borrow_mut().scroll_to(offset);
                let pinned = console.observe_viewport(ViewportEvent::Wheel, true);
                print(&format!("Auto-scroll {}", if pinned { "on" } else { "off" }));
            }
            None => print(verb.usage()),
        },
        ConsoleVerb::Autoscroll => match argument.as_deref() {
            Some("on") => console.set_auto_scroll(true),
            Some("off") => console.set_auto_scroll(false),
            _ => print(verb.usage()),
        },
        ConsoleVerb::Help => {
            for verb in ConsoleVerb::iter() {
                print(verb.usage());
            }
        }
    }
}

/// Choose `name` through the map popup the way a pointer would.
///
/// Returns whether the selection changed, or `None` if there is no such map
/// or the popup could not be opened.
fn pick_map(console: &mut ConsoleController, name: &str) -> Option<bool> {
    let index = console
        .map_selector()
        .items()
        .iter()
        .position(|map| map.eq_ignore_ascii_case(name))?;

    let geometry = console
        .open_map_selector(MAP_CONTROL, SCREEN)
        .into_iter()
        .find_map(|event| match event {
            SelectorEvent::PopupOpened { geometry } => Some(geometry),
            _ => None,
        })?;
    let x = geometry.rect.x + geometry.rect.width / 2;

    // Release of the press that opened the popup.
    console.handle_map_pointer(PointerEvent::release(MAP_CONTROL.x + 4, MAP_CONTROL.y + 4));

    let mut geometry = geometry;
    while geometry.item_center_y(index).is_none() {
        let rows = if index < geometry.first_visible { -1 } else { 1 };
        let scrolled = console
            .handle_map_pointer(PointerEvent::wheel(x, geometry.rect.y + 1, rows))
            .into_iter()
            .find_map(|event| match event {
                SelectorEvent::Scrolled { first_visible } => Some(first_visible),
                _ => None,
            });
        match scrolled {
            Some(first_visible) => geometry.first_visible = first_visible,
            None => {
                console.handle_map_pointer(PointerEvent::press(-1, -1));
                return None;
            }
        }
    }

    let y = geometry.item_center_y(index)?;
    console.handle_map_pointer(PointerEvent::press(x, y));
    let events = console.handle_map_pointer(PointerEvent::release(x, y));
    Some(
        events
            .iter()
            .any(|event| matches!(event, SelectorEvent::SelectionChanged { .. })),
    )
}
