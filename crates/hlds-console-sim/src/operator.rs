//! Operator input read from stdin.
//!
//! Lines starting with `:` drive the console's own controls (the buttons and
//! widgets a window would have). Anything else is a server command.

use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Console controls reachable with a `:` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConsoleVerb {
    Show,
    Hide,
    /// Close the window, which also stops the server
    Close,
    Status,
    Players,
    Maps,
    /// Pick a map through the popup
    Pick,
    Change,
    Restart,
    Kick,
    Ban,
    History,
    /// Replay the previous history entry as if up-arrow and enter were pressed
    Again,
    Scroll,
    Autoscroll,
    Help,
}

impl ConsoleVerb {
    /// One-line usage text
    pub fn usage(self) -> &'static str {
        match self {
            Self::Show => ":show              attach the log view",
            Self::Hide => ":hide              detach the log view",
            Self::Close => ":close             close the console and quit",
            Self::Status => ":status            print the status pane",
            Self::Players => ":players           print the player table",
            Self::Maps => ":maps              list maps, marking the selection",
            Self::Pick => ":pick <name>       choose a map in the popup",
            Self::Change => ":change            change to the selected map",
            Self::Restart => ":restart           restart the current map",
            Self::Kick => ":kick <slot>       kick a player",
            Self::Ban => ":ban <slot>        ban and kick a player",
            Self::History => ":history           list command history",
            Self::Again => ":again             run the newest history entry again",
            Self::Scroll => ":scroll <line>     move the log view",
            Self::Autoscroll => ":autoscroll on|off toggle auto-scroll",
            Self::Help => ":help              this list",
        }
    }
}

/// One parsed line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Console {
        verb: ConsoleVerb,
        argument: Option<String>,
    },
    /// Free text for the server
    Command(String),
    /// `:` followed by something that is not a verb
    Unknown(String),
    Empty,
}

impl OperatorInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Self::Empty;
        }

        let Some(rest) = line.trim_start().strip_prefix(':') else {
            return Self::Command(line.to_string());
        };

        let (word, argument) = match rest.trim().split_once(char::is_whitespace) {
            Some((word, argument)) => (word, Some(argument.trim().to_string())),
            None => (rest.trim(), None),
        };

        match ConsoleVerb::from_str(word) {
            Ok(verb) => Self::Console { verb, argument },
            Err(_) => Self::Unknown(word.to_string()),
        }
    }
}
