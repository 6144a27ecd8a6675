//! Interactive input parsed into view commands.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Search(String),
    Refresh,
    ToggleLayout,
    Help,
    Quit,
}

impl InputCommand {
    pub fn name(&self) -> &'static str {
        match self {
            InputCommand::Search(_) => "search",
            InputCommand::Refresh => "refresh",
            InputCommand::ToggleLayout => "toggle_layout",
            InputCommand::Help => "help",
            InputCommand::Quit => "quit",
        }
    }
}

pub const HELP: &str = "\
Type text to filter by title (an empty line clears the filter).
  :refresh, :r   fetch the catalog again
  :layout, :l    switch between grid and list
  :help, :h      show this help
  :quit, :q      exit";

/// Lines starting with ':' are commands; anything else is search text.
pub fn parse_input(line: &str) -> InputCommand {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let Some(command) = trimmed.trim().strip_prefix(':') else {
        return InputCommand::Search(trimmed.to_string());
    };
    match command.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => InputCommand::Refresh,
        "l" | "layout" | "grid" | "list" => InputCommand::ToggleLayout,
        "q" | "quit" | "exit" => InputCommand::Quit,
        _ => InputCommand::Help,
    }
}
