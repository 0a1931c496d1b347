use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use tale_core::SlotIndex;
use tale_script::ScriptStory;
use tale_session::{
    LoadOutcome, ModeKind, SessionController, SessionError, SessionEvent, SlotStore,
};

pub fn run(script: Option<&Path>, saves: &Path, config: Option<&Path>) -> Result<(), String> {
    let script = super::load_script(script)?;
    let config = super::load_config(config)?;
    let store = super::open_saves(saves)?;

    let title = script.title().to_string();
    let mut game = Game::new(SessionController::new(script, store, config), title);

    println!("  {} {}", "Playing".bold(), game.title);
    println!("  Type 'help' for commands, 'quit' to exit.\n");
    println!("{}\n", game.menu());

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{}> ", game.prompt());
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            println!("Goodbye!");
            break;
        }

        match game.process(input) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}\n");
                }
            }
            Err(e) => println!("{}\n", e.yellow()),
        }
    }

    Ok(())
}

/// Text front end over a session controller.
pub struct Game<St: SlotStore> {
    controller: SessionController<ScriptStory, St>,
    title: String,
}

impl<St: SlotStore> Game<St> {
    pub fn new(controller: SessionController<ScriptStory, St>, title: String) -> Self {
        Self { controller, title }
    }

    fn prompt(&self) -> &'static str {
        match self.controller.mode() {
            ModeKind::Idle => "menu",
            ModeKind::CreatingCharacter => "create",
            ModeKind::Active => "play",
        }
    }

    /// Run one line of input and return what to print.
    pub fn process(&mut self, input: &str) -> Result<String, String> {
        let mut words = input.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(String::new());
        };
        let cmd = cmd.to_lowercase();
        let args: Vec<&str> = words.collect();

        let output = match (cmd.as_str(), self.controller.mode()) {
            ("help" | "?", mode) => Ok(help(mode)),
            (_, ModeKind::Idle) => self.menu_command(&cmd, &args),
            (_, ModeKind::CreatingCharacter) => self.creation_command(&cmd, &args),
            (_, ModeKind::Active) => self.game_command(&cmd, &args),
        };

        let notes = self.notes();
        match output {
            Ok(text) if notes.is_empty() => Ok(text),
            Ok(text) if text.is_empty() => Ok(notes),
            Ok(text) => Ok(format!("{notes}\n\n{text}")),
            Err(e) => Err(e),
        }
    }

    fn menu_command(&mut self, cmd: &str, args: &[&str]) -> Result<String, String> {
        match cmd {
            "new" => {
                let slot = self.slot_arg(args)?;
                self.controller
                    .begin_new_game(slot.get())
                    .map_err(|e| e.to_string())?;
                Ok(self.creation_screen())
            }
            "load" => {
                let slot = self.slot_arg(args)?;
                let outcome = self
                    .controller
                    .load_game(slot.get())
                    .map_err(|e| e.to_string())?;
                match outcome {
                    LoadOutcome::Loaded => {
                        let lines = self.controller.transcript().to_vec();
                        Ok(format!("  Loaded {slot}.\n\n{}", self.story_screen(&lines)))
                    }
                    LoadOutcome::Empty => Ok(format!("  {slot} is empty.")),
                    LoadOutcome::Corrupt => Ok(self.menu()),
                }
            }
            "delete" => {
                let slot = self.slot_arg(args)?;
                self.controller
                    .delete_save(slot.get())
                    .map_err(|e| e.to_string())?;
                Ok(self.menu())
            }
            "slots" | "menu" | "ls" => Ok(self.menu()),
            _ => Err(unknown(cmd)),
        }
    }

    fn creation_command(&mut self, cmd: &str, args: &[&str]) -> Result<String, String> {
        if let Some(name) = cmd.strip_prefix('+').filter(|n| !n.is_empty()) {
            self.controller
                .adjust_attribute(name, 1)
                .map_err(|e| e.to_string())?;
            return Ok(self.creation_screen());
        }
        if let Some(name) = cmd.strip_prefix('-').filter(|n| !n.is_empty()) {
            self.controller
                .adjust_attribute(name, -1)
                .map_err(|e| e.to_string())?;
            return Ok(self.creation_screen());
        }

        match cmd {
            "set" => {
                let [name, value] = args else {
                    return Err("usage: set <ATTR> <value>".to_string());
                };
                let value: u32 = value
                    .parse()
                    .map_err(|_| format!("not a number: {value}"))?;
                self.controller
                    .set_attribute(name, value)
                    .map_err(|e| e.to_string())?;
                Ok(self.creation_screen())
            }
            "stats" => Ok(self.creation_screen()),
            "confirm" => {
                if !self.controller.can_confirm() {
                    let remaining = self
                        .controller
                        .allocation()
                        .map(|a| a.remaining())
                        .unwrap_or_default();
                    return Err(format!(
                        "spend the points exactly before confirming ({remaining} remaining)"
                    ));
                }
                self.controller
                    .confirm_character()
                    .map_err(|e| e.to_string())?;
                let lines = self.controller.transcript().to_vec();
                Ok(self.story_screen(&lines))
            }
            "back" | "cancel" => {
                self.controller
                    .cancel_creation()
                    .map_err(|e| e.to_string())?;
                Ok(self.menu())
            }
            _ => Err(unknown(cmd)),
        }
    }

    fn game_command(&mut self, cmd: &str, args: &[&str]) -> Result<String, String> {
        if let Ok(number) = cmd.parse::<usize>() {
            let index = number
                .checked_sub(1)
                .ok_or_else(|| format!("no choice {number}"))?;
            let before = self.controller.transcript().len();
            self.controller
                .choose(index)
                .map_err(|e| match e {
                    SessionError::InvalidChoice(_) => format!("no choice {number}"),
                    other => other.to_string(),
                })?;
            let lines = self.controller.transcript()[before..].to_vec();
            return Ok(self.story_screen(&lines));
        }

        match cmd {
            "inv" | "inventory" => Ok(self.status_line()),
            "look" | "choices" => Ok(self.story_screen(&[])),
            "transcript" => Ok(self.controller.transcript().join("\n")),
            "export" => {
                let [path] = args else {
                    return Err("usage: export <file>".to_string());
                };
                let markdown = self
                    .controller
                    .manager()
                    .active()
                    .map(|s| s.transcript().export_markdown(&self.title))
                    .unwrap_or_default();
                std::fs::write(path, markdown).map_err(|e| format!("cannot write {path}: {e}"))?;
                Ok(format!("  Transcript written to {path}."))
            }
            "menu" => {
                self.controller
                    .return_to_menu()
                    .map_err(|e| e.to_string())?;
                Ok(self.menu())
            }
            _ => Err(unknown(cmd)),
        }
    }

    fn slot_arg(&self, args: &[&str]) -> Result<SlotIndex, String> {
        let count = self.controller.slot_presence().len();
        let [arg] = args else {
            return Err(format!("usage: <command> <slot 1-{count}>"));
        };
        arg.parse::<usize>()
            .ok()
            .and_then(|n| SlotIndex::from_number(n, count))
            .ok_or_else(|| format!("no slot {arg} (slots are 1-{count})"))
    }

    /// The slot list shown at the menu.
    fn menu(&self) -> String {
        let highlighted = self.controller.highlighted_slot();
        let mut lines = vec![format!("  {}", "Slots".bold())];
        for (i, occupied) in self.controller.slot_presence().iter().enumerate() {
            let state = if *occupied {
                "saved".green()
            } else {
                "empty".dimmed()
            };
            let marker = if i == highlighted.get() { "*" } else { " " };
            lines.push(format!("  {marker} {}. {state}", i + 1));
        }
        lines.join("\n")
    }

    fn creation_screen(&self) -> String {
        let Some(allocation) = self.controller.allocation() else {
            return String::new();
        };
        let slot = self
            .controller
            .active_slot()
            .map(|s| s.to_string())
            .unwrap_or_default();

        let mut lines = vec![format!("  {} for {slot}", "New character".bold())];
        for (name, value) in allocation.iter() {
            lines.push(format!("    {name:<4} {value:>2}"));
        }
        lines.push(format!(
            "  Points remaining: {} of {}",
            allocation.remaining(),
            allocation.pool()
        ));
        lines.join("\n")
    }

    /// New narrative lines followed by the choices or the ending.
    fn story_screen(&self, new_lines: &[String]) -> String {
        let mut out: Vec<String> = new_lines.iter().map(|l| format!("  {l}")).collect();
        if !out.is_empty() {
            out.push(String::new());
        }

        if self.controller.is_finished() {
            out.push(format!("  {}", "THE END".bold()));
            out.push("  Type 'menu' to return to the slots.".to_string());
        } else {
            for choice in self.controller.choices() {
                out.push(format!(
                    "  {} {}",
                    format!("{}.", choice.index + 1).cyan(),
                    choice.text
                ));
            }
        }
        out.push(String::new());
        out.push(self.status_line());
        out.join("\n")
    }

    fn status_line(&self) -> String {
        let derived = self.controller.derived();
        let items = if derived.inventory.is_empty() {
            "nothing".to_string()
        } else {
            derived.inventory.join(", ")
        };
        format!("  Coins: {} | Carrying: {items}", derived.coins)
            .dimmed()
            .to_string()
    }

    /// Diagnostics recorded by the controller since the last command.
    fn notes(&mut self) -> String {
        self.controller
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::CorruptSaveDiscarded { slot, reason } => Some(format!(
                    "  {slot} could not be restored and was deleted ({reason})."
                )),
                SessionEvent::SaveFailed { slot, reason } => {
                    Some(format!("  Progress not saved to {slot}: {reason}"))
                }
                _ => None,
            })
            .map(|note| note.yellow().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn unknown(cmd: &str) -> String {
    format!("unknown command '{cmd}' (try 'help')")
}

fn help(mode: ModeKind) -> String {
    let rows: &[(&str, &str)] = match mode {
        ModeKind::Idle => &[
            ("new <n>", "start a new game in slot n"),
            ("load <n>", "continue the game in slot n"),
            ("delete <n>", "clear slot n"),
            ("slots", "list slots"),
            ("quit", "exit"),
        ],
        ModeKind::CreatingCharacter => &[
            ("set <ATTR> <v>", "set an attribute"),
            ("+ATTR / -ATTR", "raise or lower an attribute by one"),
            ("stats", "show the allocation"),
            ("confirm", "start the story"),
            ("back", "return to the slots"),
        ],
        ModeKind::Active => &[
            ("<n>", "take choice n"),
            ("inv", "show coins and inventory"),
            ("transcript", "show the story so far"),
            ("export <file>", "write the transcript as markdown"),
            ("menu", "return to the slots"),
            ("quit", "exit"),
        ],
    };
    rows.iter()
        .map(|(cmd, what)| format!("  {cmd:<15} {what}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tale_script::{CompiledScript, DEMO_SCRIPT};
    use tale_session::{MemoryStore, SessionConfig};

    fn game() -> Game<MemoryStore> {
        colored::control::set_override(false);
        let script = CompiledScript::from_json(DEMO_SCRIPT).unwrap();
        let controller =
            SessionController::new(script, MemoryStore::new(), SessionConfig::default());
        Game::new(controller, "The Cellar".to_string())
    }

    fn run(game: &mut Game<MemoryStore>, lines: &[&str]) -> String {
        let mut last = String::new();
        for line in lines {
            last = game.process(line).unwrap();
        }
        last
    }

    #[test]
    fn create_and_play() {
        let mut g = game();
        let out = run(&mut g, &["new 1", "set STR 7", "-cha", "-wit"]);
        assert!(out.contains("Points remaining: 0 of 15"));
        assert_eq!(g.prompt(), "create");

        let out = g.process("confirm").unwrap();
        assert!(out.contains("bend iron bars"));
        assert!(out.contains("1. Search the shelves"));
        assert_eq!(g.prompt(), "play");

        let out = g.process("1").unwrap();
        assert!(out.starts_with("  Behind the jars"));
        assert!(!out.contains("You wake"));
        assert!(out.contains("Coins: 3 | Carrying: Old Sack"));
    }

    #[test]
    fn confirm_needs_exact_points() {
        let mut g = game();
        run(&mut g, &["new 2", "-str"]);
        let err = g.process("confirm").unwrap_err();
        assert!(err.contains("1 remaining"));
        assert_eq!(g.prompt(), "create");
    }

    #[test]
    fn bad_input_is_reported() {
        let mut g = game();
        assert!(g.process("new 9").unwrap_err().contains("no slot 9"));
        assert!(g.process("fly").unwrap_err().contains("unknown command"));
        assert_eq!(g.process("   ").unwrap(), "");

        run(&mut g, &["new 1", "confirm"]);
        assert_eq!(g.process("7").unwrap_err(), "no choice 7");
        assert_eq!(g.process("0").unwrap_err(), "no choice 0");
    }

    #[test]
    fn menu_and_reload() {
        let mut g = game();
        run(&mut g, &["new 3", "confirm", "2"]);
        let menu = g.process("menu").unwrap();
        assert!(menu.contains("* 3. saved"));

        let out = g.process("load 3").unwrap();
        assert!(out.contains("Loaded Save 3."));
        assert!(out.contains("3. Go back down"));
    }

    #[test]
    fn corrupt_load_reports_and_clears() {
        let mut g = game();
        let mut store = MemoryStore::new();
        store.set("tale_save_1", "garbage").unwrap();
        let script = CompiledScript::from_json(DEMO_SCRIPT).unwrap();
        g.controller = SessionController::new(script, store, SessionConfig::default());

        let out = g.process("load 1").unwrap();
        assert!(out.contains("Save 1 could not be restored and was deleted"));
        assert!(out.contains("1. empty"));
        assert_eq!(g.prompt(), "menu");
    }
}
