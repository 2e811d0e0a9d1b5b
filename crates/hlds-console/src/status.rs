//! Server status snapshot and its display labels.

use crate::host::{PlayerInfo, ServerState};
use strum::{Display, EnumIter};

/// Hostnames longer than this are shortened in the status pane
const HOSTNAME_MAX_CHARS: usize = 28;
/// Characters kept from a shortened hostname, before the ellipsis
const HOSTNAME_KEEP_CHARS: usize = 25;

/// Format elapsed seconds as `m:ss`.
///
/// Minutes are not padded and keep growing past 59. Negative or non-finite
/// input reads as zero.
pub fn format_clock(seconds: f32) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Columns of the player table, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum PlayerColumn {
    #[strum(serialize = "#")]
    Slot,
    Name,
    Ping,
    #[strum(serialize = "HP")]
    Health,
    Frags,
    Kick,
    Ban,
}

impl PlayerColumn {
    /// Whether the column holds an action button instead of data
    pub fn is_action(self) -> bool {
        matches!(self, Self::Kick | Self::Ban)
    }

    /// Cell text for `player` in this column
    pub fn cell(self, player: &PlayerInfo) -> String {
        match self {
            Self::Slot => player.slot.to_string(),
            Self::Name => player.name.clone(),
            Self::Ping => player.ping.to_string(),
            Self::Health => player.health.to_string(),
            Self::Frags => player.frags.to_string(),
            Self::Kick | Self::Ban => self.to_string(),
        }
    }
}

/// Last known server state as shown in the status pane and player table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerStatus {
    pub hostname: Option<String>,
    pub map_name: Option<String>,
    pub max_players: u32,
    pub server_time: f32,
    pub time_limit: f32,
    pub entity_count: u32,
    /// Connected slots with a non-empty name, in slot order
    pub players: Vec<PlayerInfo>,
}

impl ServerStatus {
    /// Take a fresh snapshot of `state`.
    pub fn refresh<S: ServerState + ?Sized>(&mut self, state: &S) {
        self.hostname = state.hostname().filter(|h| !h.is_empty());
        self.map_name = state.map_name().filter(|m| !m.is_empty());
        self.max_players = state.max_players();
        self.server_time = state.server_time();
        self.time_limit = state.time_limit();
        self.entity_count = state.entity_count();
        self.players = state
            .players()
            .into_iter()
            .filter(|p| !p.name.is_empty())
            .collect();
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn host_label(&self) -> String {
        let name = self.hostname.as_deref().unwrap_or("Unknown");
        if name.chars().count() > HOSTNAME_MAX_CHARS {
            let kept: String = name.chars().take(HOSTNAME_KEEP_CHARS).collect();
            format!("Host: {}...", kept)
        } else {
            format!("Host: {}", name)
        }
    }

    pub fn map_label(&self) -> String {
        format!("Map: {}", self.map_name.as_deref().unwrap_or("Unknown"))
    }

    pub fn players_label(&self) -> String {
        format!("Players: {} / {}", self.player_count(), self.max_players)
    }

    /// `Time: m:ss`, plus the limit when one is set
    pub fn time_label(&self) -> String {
        if self.time_limit > 0.0 {
            format!(
                "Time: {} / {}",
                format_clock(self.server_time),
                format_clock(self.time_limit)
            )
        } else {
            format!("Time: {}", format_clock(self.server_time))
        }
    }

    pub fn entities_label(&self) -> String {
        format!("Entities: {}", self.entity_count)
    }

    /// All status pane lines, top to bottom
    pub fn labels(&self) -> [String; 5] {
        [
            self.host_label(),
            self.map_label(),
            self.players_label(),
            self.time_label(),
            self.entities_label(),
        ]
    }
}
