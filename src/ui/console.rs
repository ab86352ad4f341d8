// Console shell - line-oriented rendering shell over the AppController
//
// Reads commands from stdin, spawns the matching controller action, and prints
// notifications and results as StateChange events arrive.

use crate::models::{AppState, Channel, Credentials, QueryInput, Severity};
use crate::state::StateChange;
use crate::ui::controller::AppController;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
Commands:
  login <email> <password>     request an API token
  query <titleId> <buildId>    fetch cheat files for a game build
  toggle <id>                  expand or collapse a cheat file
  copy <id>                    copy a cheat file's content to the clipboard
  show                         print the current result
  token                        print the current API token
  help                         show this help
  quit                         exit";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Login(Credentials),
    Query(QueryInput),
    Toggle(String),
    Copy(String),
    Show,
    Token,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    /// Parse one input line. Missing arguments become empty strings so the
    /// controller's own validation reports them. The `login` password is the
    /// rest of the line, so it may contain spaces.
    pub fn parse(line: &str) -> Self {
        let (command, rest) = split_word(line);
        if command.is_empty() {
            return ConsoleCommand::Empty;
        }

        match command.to_ascii_lowercase().as_str() {
            "login" => {
                let (email, password) = split_word(rest);
                ConsoleCommand::Login(Credentials::new(email, password))
            }
            "query" => {
                let (title_id, rest) = split_word(rest);
                let (build_id, _) = split_word(rest);
                ConsoleCommand::Query(QueryInput::new(title_id, build_id))
            }
            "toggle" => ConsoleCommand::Toggle(split_word(rest).0.to_string()),
            "copy" => ConsoleCommand::Copy(split_word(rest).0.to_string()),
            "show" => ConsoleCommand::Show,
            "token" => ConsoleCommand::Token,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => ConsoleCommand::Unknown(other.to_string()),
        }
    }
}

/// First whitespace-delimited word and the remainder after the separating
/// whitespace
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Render the game header and cheat list for the current state
pub fn render_result(state: &AppState) -> String {
    let Some(result) = state.game_result.as_ref() else {
        return "No result loaded.".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", result.name);
    let _ = writeln!(out, "TitleID: {}   Slug: {}", result.titleid, result.slug);
    if let Some(artwork) = result.artwork() {
        let _ = writeln!(out, "Artwork: {}", artwork);
    }
    let _ = writeln!(
        out,
        "Total cheat files: {} (received {})",
        result.count,
        result.cheats.len()
    );

    for (index, cheat) in result.cheats.iter().enumerate() {
        let expanded = state.disclosure.is_expanded(&cheat.id);
        let marker = if expanded { "v" } else { ">" };
        let copied = if state.disclosure.is_copied(&cheat.id) {
            "  [copied]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{} #{}  Cheat file {}{}",
            marker,
            cheat.id,
            index + 1,
            copied
        );

        if !expanded {
            continue;
        }
        let _ = writeln!(out, "    Credits: {}", cheat.credits);
        let _ = writeln!(out, "    BuildID: {}", cheat.buildid);
        if let Some(description) = cheat.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "    Description: {}", description);
        }
        if !cheat.titles.is_empty() {
            let _ = writeln!(out, "    Cheats:");
            for title in &cheat.titles {
                let _ = writeln!(out, "      - {}", title);
            }
        }
        let _ = writeln!(out, "    Content:");
        for line in cheat.content.lines() {
            let _ = writeln!(out, "      {}", line);
        }
    }

    out
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "OK",
        Severity::Error => "ERROR",
        Severity::Info => "INFO",
    }
}

/// Interactive shell over stdin/stdout
pub struct ConsoleShell {
    controller: Arc<AppController>,
}

impl ConsoleShell {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { controller }
    }

    /// Run until `quit` or end of input
    pub async fn run(self) -> Result<()> {
        self.setup_state_subscription();

        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read console input")?
        {
            match ConsoleCommand::parse(&line) {
                ConsoleCommand::Quit => break,
                command => self.dispatch(command),
            }
        }

        tracing::info!("Console input closed");
        Ok(())
    }

    fn dispatch(&self, command: ConsoleCommand) {
        tracing::trace!("Console command: {:?}", command);
        let controller = Arc::clone(&self.controller);

        match command {
            // Requests run as independent tasks so they can overlap
            ConsoleCommand::Login(credentials) => {
                tokio::spawn(async move {
                    let _ = controller.authenticate(credentials).await;
                });
            }
            ConsoleCommand::Query(query) => {
                if !controller.state().read(|s| s.has_token()) {
                    println!("(no API token yet; run `login` first)");
                }
                tokio::spawn(async move {
                    let _ = controller.fetch_cheats(query).await;
                });
            }
            ConsoleCommand::Copy(id) => {
                tokio::spawn(async move {
                    controller.copy_cheat(&id).await;
                });
            }
            ConsoleCommand::Toggle(id) => {
                controller.toggle_expand(&id);
                print!("{}", render_result(&controller.snapshot()));
            }
            ConsoleCommand::Show => print!("{}", render_result(&controller.snapshot())),
            ConsoleCommand::Token => match controller.snapshot().token {
                Some(token) => println!(
                    "Current API token: {}\nValid until: {}",
                    token.token,
                    token.expiration_display()
                ),
                None => println!("No API token."),
            },
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Unknown(other) => println!("Unknown command `{}`. Try `help`.", other),
            ConsoleCommand::Empty | ConsoleCommand::Quit => {}
        }
    }

    /// Print notifications, busy flags, and result changes as they happen
    fn setup_state_subscription(&self) {
        let controller = Arc::clone(&self.controller);
        let mut rx = controller.subscribe();

        tokio::spawn(async move {
            tracing::debug!("State subscription task started");
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);
                        match change {
                            StateChange::NotificationPosted {
                                channel,
                                severity,
                                text,
                            } => println!("[{}] {}: {}", channel, severity_tag(severity), text),
                            StateChange::AuthBusyChanged { busy: true } => {
                                println!("[{}] requesting token...", Channel::Auth)
                            }
                            StateChange::QueryBusyChanged { busy: true } => {
                                println!("[{}] fetching cheats...", Channel::Query)
                            }
                            StateChange::GameResultChanged {
                                name: Some(_), ..
                            } => print!("{}", render_result(&controller.snapshot())),
                            StateChange::DisclosureChanged { .. } => {
                                tracing::trace!("Disclosure state changed");
                            }
                            _ => {}
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Console lagged behind by {} state events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("State subscription task terminated");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheatFile, GameResult};

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.replace_game_result(Some(GameResult {
            name: "Game X".to_string(),
            titleid: "0100A3D008C5C000".to_string(),
            slug: "game-x".to_string(),
            banner: None,
            image: Some("https://img/icon.jpg".to_string()),
            count: 3,
            cheats: vec![
                CheatFile {
                    id: "1".to_string(),
                    credits: "alice".to_string(),
                    buildid: "421C5411B487EB4D".to_string(),
                    description: Some("Battle cheats".to_string()),
                    titles: vec!["[Infinite HP]".to_string()],
                    content: "[Infinite HP]\n04000000 00000000".to_string(),
                },
                CheatFile {
                    id: "2".to_string(),
                    credits: "bob".to_string(),
                    buildid: "421C5411B487EB4D".to_string(),
                    description: None,
                    titles: Vec::new(),
                    content: "secret".to_string(),
                },
            ],
        }));
        state
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("login a@b.com pw"),
            ConsoleCommand::Login(Credentials::new("a@b.com", "pw"))
        );
        assert_eq!(
            ConsoleCommand::parse("  QUERY 0100A3D008C5C000 421C5411B487EB4D "),
            ConsoleCommand::Query(QueryInput::new("0100A3D008C5C000", "421C5411B487EB4D"))
        );
        assert_eq!(ConsoleCommand::parse("toggle 7"), ConsoleCommand::Toggle("7".to_string()));
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Empty);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Quit);
        assert_eq!(
            ConsoleCommand::parse("dance"),
            ConsoleCommand::Unknown("dance".to_string())
        );
    }

    #[test]
    fn test_parse_password_with_spaces() {
        assert_eq!(
            ConsoleCommand::parse("login a@b.com correct horse  battery"),
            ConsoleCommand::Login(Credentials::new("a@b.com", "correct horse  battery"))
        );
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert_eq!(
            ConsoleCommand::parse("login a@b.com"),
            ConsoleCommand::Login(Credentials::new("a@b.com", ""))
        );
        assert_eq!(
            ConsoleCommand::parse("query"),
            ConsoleCommand::Query(QueryInput::default())
        );
    }

    #[test]
    fn test_render_collapsed_result() {
        let out = render_result(&sample_state());

        assert!(out.contains("== Game X =="));
        assert!(out.contains("Artwork: https://img/icon.jpg"));
        assert!(out.contains("Total cheat files: 3 (received 2)"));
        assert!(out.contains("> #1  Cheat file 1"));
        assert!(out.contains("> #2  Cheat file 2"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_render_expanded_and_copied() {
        let mut state = sample_state();
        state.disclosure.toggle_expand("1");
        state.disclosure.mark_copied("1");

        let out = render_result(&state);

        assert!(out.contains("v #1  Cheat file 1  [copied]"));
        assert!(out.contains("Credits: alice"));
        assert!(out.contains("Description: Battle cheats"));
        assert!(out.contains("- [Infinite HP]"));
        assert!(out.contains("04000000 00000000"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_render_without_result() {
        assert_eq!(render_result(&AppState::default()), "No result loaded.");
    }
}
