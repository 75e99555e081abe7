//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2, allowing the engine to be used
//! with graphical Go interfaces like Sabaki, GoGui, or Lizzie.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`, `known_command`
//! - `quit`, `boardsize`, `clear_board`, `komi`
//! - `play`, `genmove`, `showboard`, `cputime`
//! - `final_status_list` (dead-group reporting)
//! - `gogui-analyze_commands`-style `help`

use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::constants::{N, PASS_MOVE, RESIGN_MOVE};
use crate::engine::Engine;
use crate::position::{format_position, parse_coord, pass_move, play_move, str_coord, Color, Position};

const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "cputime",
    "final_status_list",
    "genmove",
    "gogui-winrate",
    "help",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state: the raw board plus the stateful search [`Engine`].
pub struct GtpEngine {
    pos: Position,
    engine: Engine,
}

impl GtpEngine {
    pub fn new(cfg: Config) -> Self {
        GtpEngine { pos: Position::new(), engine: Engine::new(cfg) }
    }

    fn print_board(&self) {
        eprint!("{}", format_position(&self.pos));
        if let Some(owner_map) = self.engine.owner_map() {
            eprint!("{}", owner_map.display_grid());
        }
    }

    fn turn_indicator(&self) -> &'static str {
        if self.pos.is_black_to_play() {
            "\u{25cf}"
        } else {
            "\u{25cb}"
        }
    }

    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut stderr = io::stderr();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);

            self.print_board();
            stderr.flush().unwrap();

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(stdout, "{prefix}{id_str} {message}\n").unwrap();
            stdout.flush().unwrap();

            write!(stderr, "{} uctgo> ", self.turn_indicator()).unwrap();
            stderr.flush().unwrap();

            if command == "quit" {
                break;
            }
        }
    }

    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let mut chars = trimmed.char_indices();
        if let Some((_, c)) = chars.next() {
            if c.is_ascii_digit() {
                let end = chars
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(i, _)| i)
                    .unwrap_or(trimmed.len());
                if let Ok(id) = trimmed[..end].parse::<u32>() {
                    return (Some(id), trimmed[end..].trim());
                }
            }
        }
        (None, trimmed)
    }

    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "uctgo".to_string()),
            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),
            "protocol_version" => (true, "2".to_string()),
            "list_commands" | "help" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => match args.first().and_then(|s| s.parse::<usize>().ok()) {
                Some(size) if size == N => (true, String::new()),
                Some(size) => (false, format!("unacceptable size, only {N} is supported (got {size})")),
                None => (false, "invalid size".to_string()),
            },

            "clear_board" => {
                self.pos = Position::new();
                self.engine.done_board_state();
                (true, String::new())
            }

            "komi" => match args.first().and_then(|s| s.parse::<f32>().ok()) {
                Some(komi) => {
                    self.pos.komi = komi;
                    (true, String::new())
                }
                None => (false, "invalid komi".to_string()),
            },

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                // The GTP color argument is advisory only; we trust
                // alternating play and derive the mover from the board.
                let _ = parse_color(args[0]);
                let vertex = args[1];
                let pt = parse_coord(vertex);
                let mover = self.pos.color_to_move();
                let before = self.pos.clone();

                match play_move(&mut self.pos, pt) {
                    Ok(()) => {
                        if let Err(err) = self.engine.notify_play(&before, mover, pt) {
                            log::error!("{err:#}");
                        }
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let color = parse_color(args[0]).unwrap_or_else(|| self.pos.color_to_move());

                match self.engine.genmove(&self.pos, color) {
                    Ok(pt) if pt == RESIGN_MOVE => {
                        self.engine.done_board_state();
                        (true, "resign".to_string())
                    }
                    Ok(pt) => {
                        let _ = play_move(&mut self.pos, pt);
                        (true, if pt == PASS_MOVE { "pass".to_string() } else { str_coord(pt) })
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "final_status_list" => {
                let status = args.first().copied().unwrap_or("dead");
                let coords: Vec<String> = if status == "dead" {
                    self.engine
                        .dead_group_list(&self.pos)
                        .into_iter()
                        .flat_map(|g| g.points.into_iter().map(str_coord))
                        .collect()
                } else {
                    Vec::new()
                };
                (true, coords.join(" "))
            }

            "gogui-winrate" => match self.engine.chat("winrate") {
                Some(report) => (true, report),
                None => (false, "no search state yet".to_string()),
            },

            "showboard" => {
                let board_str = format_position(&self.pos);
                eprint!("{}", board_str);
                (true, format!("\n{}", board_str.trim_end()))
            }

            "cputime" => (true, format!("{:.3}", self.engine.cputime())),

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "b" | "black" => Some(Color::Black),
        "w" | "white" => Some(Color::White),
        _ => None,
    }
}
