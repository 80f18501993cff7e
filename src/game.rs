//! Supported games and their forum identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game whose forum the missions are performed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Bh3,
    Ys,
    Bh2,
    Wd,
    Xq,
}

/// Remote identifiers of a game: sign-in group id and forum id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameIds {
    pub gids: u32,
    pub forum_id: u32,
}

impl Game {
    pub const ALL: [Game; 5] = [Game::Bh3, Game::Ys, Game::Bh2, Game::Wd, Game::Xq];

    pub fn ids(self) -> GameIds {
        let (gids, forum_id) = match self {
            Game::Bh3 => (1, 1),
            Game::Ys => (2, 26),
            Game::Bh2 => (3, 30),
            Game::Wd => (4, 37),
            Game::Xq => (5, 52),
        };
        GameIds { gids, forum_id }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Game::Bh3 => "bh3",
            Game::Ys => "ys",
            Game::Bh2 => "bh2",
            Game::Wd => "wd",
            Game::Xq => "xq",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::ALL
            .into_iter()
            .find(|game| game.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown game '{s}', expected one of bh3, ys, bh2, wd, xq"))
    }
}
