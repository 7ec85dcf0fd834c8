//! Console Commands
//!
//! Lines typed into the terminal session. Slash-prefixed words are commands;
//! everything else is a question for the assistant.

use crate::state::tabs_state::DashboardTab;

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to a tab
    Tab(DashboardTab),
    /// Search history for samples like the current one
    Similar,
    /// Analyze the current snapshot now
    Analyze,
    /// Reload the active panel
    Refresh,
    /// Print the dashboard summary
    Status,
    Help,
    Quit,
    /// Free text sent to the chat assistant
    Chat(String),
    /// Unknown slash command
    Unknown(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Command::Chat(line.to_string());
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        match name.as_str() {
            "tab" => match arg.and_then(DashboardTab::parse) {
                Some(tab) => Command::Tab(tab),
                None => Command::Unknown(line.to_string()),
            },
            "similar" => Command::Similar,
            "analyze" => Command::Analyze,
            "refresh" => Command::Refresh,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => match DashboardTab::parse(other) {
                Some(tab) => Command::Tab(tab),
                None => Command::Unknown(line.to_string()),
            },
        }
    }
}

pub const HELP: &str = "\
Commands:
  /tab <dashboard|history|forecast>   switch tab (or just /history, ...)
  /similar                            find samples like the current one
  /analyze                            analyze the current snapshot
  /refresh                            reload the active panel
  /status                             print the dashboard summary
  /quit                               exit
Anything else is sent to the assistant.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            Command::parse("  why is waste rising? "),
            Command::Chat("why is waste rising?".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_tab_commands() {
        assert_eq!(
            Command::parse("/tab History"),
            Command::Tab(DashboardTab::History)
        );
        assert_eq!(
            Command::parse("/forecast"),
            Command::Tab(DashboardTab::Forecast)
        );
        assert_eq!(
            Command::parse("/tab nowhere"),
            Command::Unknown("/tab nowhere".to_string())
        );
    }

    #[test]
    fn test_action_commands() {
        assert_eq!(Command::parse("/similar"), Command::Similar);
        assert_eq!(Command::parse("/ANALYZE"), Command::Analyze);
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/"), Command::Unknown("/".to_string()));
    }
}
