//! A tiny stand-in for a dedicated server.
//!
//! It keeps just enough state for the console to show, interprets the
//! handful of commands the console issues, and prints server-style output to
//! stdout and stderr so there is something to capture.

use chrono::Local;
use hlds_console::{HostCommands, PlayerInfo, ServerState};
use std::path::PathBuf;

/// Seconds between the periodic round log lines
const ROUND_LENGTH: f32 = 30.0;

/// Bot names used to fill the roster
const BOT_NAMES: [&str; 4] = ["Bot Gordon", "Bot Adrian", "Bot Barney", "Bot Gina"];

/// Starting values for a simulated server
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub hostname: String,
    pub map: String,
    pub game_dir: PathBuf,
    pub max_players: u32,
    /// Seconds; zero disables the limit
    pub time_limit: f32,
    pub bots: usize,
}

/// Simulated server state plus its command buffer
#[derive(Debug)]
pub struct SimServer {
    settings: ServerSettings,
    map: String,
    time: f32,
    next_round: f32,
    players: Vec<PlayerInfo>,
    next_user_id: i32,
    queued: String,
    running: bool,
    /// Set when a map load finished since the last check
    activated: bool,
}

impl SimServer {
    pub fn new(settings: ServerSettings) -> Self {
        let mut server = Self {
            map: settings.map.clone(),
            time: 0.0,
            next_round: ROUND_LENGTH,
            players: Vec::new(),
            next_user_id: 1,
            queued: String::new(),
            running: true,
            activated: true,
            settings,
        };
        for name in BOT_NAMES.iter().take(server.settings.bots) {
            server.connect(name);
        }
        server
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a map finished loading since the last call
    pub fn take_activated(&mut self) -> bool {
        std::mem::take(&mut self.activated)
    }

    /// Advance server time and emit periodic log output.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;

        if self.time >= self.next_round {
            self.next_round += ROUND_LENGTH;
            println!("{} World triggered \"Round_Start\"", log_prefix());
            for player in &mut self.players {
                player.frags += 1;
                player.ping = 20 + (player.ping + 7) % 60;
            }
        }

        if self.settings.time_limit > 0.0 && self.time >= self.settings.time_limit {
            println!("{} Time limit reached, restarting {}", log_prefix(), self.map);
            self.load_map(self.map.clone());
        }
    }

    fn connect(&mut self, name: &str) {
        let slot = (1..=self.settings.max_players)
            .find(|slot| !self.players.iter().any(|p| p.slot == *slot));
        let Some(slot) = slot else {
            eprintln!("Server is full, rejecting {}", name);
            return;
        };

        self.players.push(PlayerInfo {
            slot,
            user_id: self.next_user_id,
            name: name.to_string(),
            ping: 5 * slot,
            packet_loss: 0,
            health: 100,
            frags: 0,
            auth_id: "BOT".to_string(),
        });
        self.players.sort_by_key(|p| p.slot);
        self.next_user_id += 1;
    }

    fn load_map(&mut self, map: String) {
        self.map = map;
        self.time = 0.0;
        self.next_round = ROUND_LENGTH;
        self.activated = true;
        println!("{} Loading map \"{}\"", log_prefix(), self.map);
    }

    fn remove_by_user_id(&mut self, user_id: i32) -> Option<PlayerInfo> {
        let index = self.players.iter().position(|p| p.user_id == user_id)?;
        Some(self.players.remove(index))
    }

    fn execute_line(&mut self, line: &str) {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return;
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            ("changelevel" | "map", [map]) => self.load_map(map.to_string()),
            ("restart", []) => {
                println!("{} Restarting map", log_prefix());
                self.load_map(self.map.clone());
            }
            ("kick", [target]) => {
                match parse_user_id(target).and_then(|id| self.remove_by_user_id(id)) {
                    Some(player) => println!("Kicked \"{}\"", player.name),
                    None => eprintln!("Couldn't find player {}", target),
                }
            }
            ("banid", [_minutes, target, "kick"]) => {
                match parse_user_id(target).and_then(|id| self.remove_by_user_id(id)) {
                    Some(player) => println!("Ban added for \"{}\", kicked", player.name),
                    None => eprintln!("banid: couldn't find {}", target),
                }
            }
            ("writeid", []) => println!("Writing banned.cfg."),
            ("addbot", rest) => {
                let name = if rest.is_empty() {
                    format!("Bot {}", self.next_user_id)
                } else {
                    rest.join(" ")
                };
                self.connect(&name);
                println!("{} \"{}\" connected", log_prefix(), name);
            }
            ("status", []) => self.print_status(),
            ("say", words) if !words.is_empty() => println!("Console: {}", words.join(" ")),
            ("quit" | "exit", []) => {
                println!("Server shutting down");
                self.running = false;
            }
            _ => eprintln!("Unknown command \"{}\"", command),
        }
    }

    fn print_status(&self) {
        println!("hostname:  {}", self.settings.hostname);
        println!("map     :  {} at: 0 x, 0 y, 0 z", self.map);
        println!(
            "players :  {} active ({} max)",
            self.players.len(),
            self.settings.max_players
        );
        for player in &self.players {
            println!(
                "#{:>2} \"{}\" {} {} {}",
                player.slot, player.name, player.user_id, player.frags, player.ping
            );
        }
        println!("{} users", self.players.len());
    }
}

impl ServerState for SimServer {
    fn hostname(&self) -> Option<String> {
        Some(self.settings.hostname.clone())
    }

    fn map_name(&self) -> Option<String> {
        Some(self.map.clone())
    }

    fn max_players(&self) -> u32 {
        self.settings.max_players
    }

    fn server_time(&self) -> f32 {
        self.time
    }

    fn time_limit(&self) -> f32 {
        self.settings.time_limit
    }

    fn entity_count(&self) -> u32 {
        // World plus a fixed set of map entities and one per player
        let players = u32::try_from(self.players.len()).unwrap_or(u32::MAX);
        1 + 180 + players
    }

    fn game_dir(&self) -> PathBuf {
        self.settings.game_dir.clone()
    }

    fn players(&self) -> Vec<PlayerInfo> {
        self.players.clone()
    }
}

impl HostCommands for SimServer {
    fn server_command(&mut self, command: &str) {
        self.queued.push_str(command);
    }

    fn server_execute(&mut self) {
        let queued = std::mem::take(&mut self.queued);
        for line in queued.lines() {
            self.execute_line(line);
        }
    }
}

/// `#17` or `17` as a user id
fn parse_user_id(target: &str) -> Option<i32> {
    target.strip_prefix('#').unwrap_or(target).parse().ok()
}

/// Server log line prefix, e.g. `L 10/16/2026 - 21:04:55:`
fn log_prefix() -> String {
    Local::now().format("L %m/%d/%Y - %H:%M:%S:").to_string()
}
