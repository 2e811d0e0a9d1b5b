//! Interfaces the embedding host provides to the console.
//!
//! The console never owns server state. It queries [`ServerState`] for a
//! snapshot whenever it refreshes, and sends plain text commands through
//! [`HostCommands`]. Commands are fire-and-forget: their outcome only shows up
//! in later queries or in captured output.

use std::path::PathBuf;

/// One connected client slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Connection slot (1-based, as the server numbers them)
    pub slot: u32,
    /// Server-assigned user id, used by `kick`/`banid`
    pub user_id: i32,
    pub name: String,
    pub ping: u32,
    pub packet_loss: u32,
    pub health: i32,
    pub frags: i32,
    /// Opaque identity token (e.g. an auth id); "N/A" when unknown
    pub auth_id: String,
}

/// Read-only queries against the host's live state.
///
/// Every method is a pure function of current host state.
pub trait ServerState {
    /// Server hostname, if set
    fn hostname(&self) -> Option<String>;

    /// Currently loaded map, if any
    fn map_name(&self) -> Option<String>;

    /// Maximum number of client slots
    fn max_players(&self) -> u32;

    /// Elapsed server time in seconds
    fn server_time(&self) -> f32;

    /// Map time limit in seconds; zero or negative means no limit
    fn time_limit(&self) -> f32;

    /// Number of live entities
    fn entity_count(&self) -> u32;

    /// Game directory; map archives live below it
    fn game_dir(&self) -> PathBuf;

    /// All connected slots, in slot order
    fn players(&self) -> Vec<PlayerInfo>;

    /// Look up a single connected slot
    fn player(&self, slot: u32) -> Option<PlayerInfo> {
        self.players().into_iter().find(|p| p.slot == slot)
    }
}

/// The host's command interpreter.
pub trait HostCommands {
    /// Queue a command line (including its trailing newline)
    fn server_command(&mut self, command: &str);

    /// Execute everything queued so far
    fn server_execute(&mut self);
}

/// Everything the controller needs from the host.
pub trait ConsoleHost: ServerState + HostCommands {}

impl<T: ServerState + HostCommands + ?Sized> ConsoleHost for T {}

/// Queue a single command and execute it immediately.
pub(crate) fn dispatch<H: HostCommands + ?Sized>(host: &mut H, command: &str) {
    log::debug!("Dispatching host command: {}", command);
    host.server_command(&format!("{}\n", command));
    host.server_execute();
}
