//! Stdio console: a line-oriented participant surface.
//!
//! Plain lines are chat messages; `/`-prefixed lines are labeling and
//! session commands. Options are numbered from 1 on screen.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::lab::{Interaction, Lab, NoticeLevel, Outcome};
use crate::session::Role;
use crate::turn::{LabelSide, Phase, SessionState};
use crate::view::SessionView;

pub const CONSOLE_HELP: &str = "\
commands:
  /start <name>           enter your name and begin
  /good <n> [reason]      mark option n as good
  /bad <n> [reason]       mark option n as bad
  /good-reason <text>     edit the reason for the good label
  /bad-reason <text>      edit the reason for the bad label
  /pick <n>               continue the chat with option n (needs good and bad labels)
  /next                   move to the next session
  /export [path]          export the turn log to CSV
  /state                  show the full session
  /help                   show this help
  /quit                   leave
anything else is sent as a chat message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Interaction(Interaction),
    ShowState,
    Help,
    Quit,
    /// Unusable input; carries the usage hint to show.
    Invalid(String),
}

fn option_number(raw: Option<&str>, usage: &str) -> Result<usize, ConsoleCommand> {
    raw.and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
        .ok_or_else(|| ConsoleCommand::Invalid(format!("usage: {usage}")))
}

fn parse_mark(side: LabelSide, rest: &str, usage: &str) -> ConsoleCommand {
    let mut parts = rest.splitn(2, char::is_whitespace);
    match option_number(parts.next().filter(|s| !s.is_empty()), usage) {
        Ok(index) => {
            let reason = parts
                .next()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(ToString::to_string);
            ConsoleCommand::Interaction(Interaction::Mark {
                side,
                index,
                reason,
            })
        }
        Err(invalid) => invalid,
    }
}

/// Parse one console line; `None` for blank lines.
pub fn parse_console_command(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(ConsoleCommand::Interaction(Interaction::Message {
            text: line.to_string(),
        }));
    };
    let (verb, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(verb, rest)| (verb, rest.trim()));
    let parsed = match verb.to_ascii_lowercase().as_str() {
        "start" => ConsoleCommand::Interaction(Interaction::Start {
            name: rest.to_string(),
        }),
        "good" => parse_mark(LabelSide::Good, rest, "/good <n> [reason]"),
        "bad" => parse_mark(LabelSide::Bad, rest, "/bad <n> [reason]"),
        "good-reason" => ConsoleCommand::Interaction(Interaction::SetReason {
            side: LabelSide::Good,
            reason: rest.to_string(),
        }),
        "bad-reason" => ConsoleCommand::Interaction(Interaction::SetReason {
            side: LabelSide::Bad,
            reason: rest.to_string(),
        }),
        "pick" => match option_number(Some(rest).filter(|s| !s.is_empty()), "/pick <n>") {
            Ok(choice) => ConsoleCommand::Interaction(Interaction::Finalize { choice }),
            Err(invalid) => invalid,
        },
        "next" => ConsoleCommand::Interaction(Interaction::Advance),
        "export" => ConsoleCommand::Interaction(Interaction::Export {
            target: (!rest.is_empty()).then(|| rest.into()),
        }),
        "state" => ConsoleCommand::ShowState,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => ConsoleCommand::Invalid(format!("unknown command /{other}; try /help")),
    };
    Some(parsed)
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "assistant",
    }
}

/// Option cards, numbered from 1, with label markers and reasons.
pub fn render_options(view: &SessionView) -> String {
    if view.phase != Phase::AwaitingLabel {
        return String::new();
    }
    let mut out = String::from(
        "Pick the reply you prefer. Mark one option good and another bad first:\n",
    );
    for card in &view.options {
        let marker = match (card.good, card.bad) {
            (true, _) => " [good]",
            (_, true) => " [bad]",
            _ => "",
        };
        out.push_str(&format!("  {}. {}{}\n", card.index + 1, card.text, marker));
    }
    if !view.good_reason.is_empty() {
        out.push_str(&format!("  good reason: {}\n", view.good_reason));
    }
    if !view.bad_reason.is_empty() {
        out.push_str(&format!("  bad reason: {}\n", view.bad_reason));
    }
    out
}

/// Full session rendering: instructions, transcript, pending options.
pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    if view.experiment_started {
        out.push_str(&format!("[session {}] {}\n", view.session, view.instructions));
    } else {
        out.push_str("Enter your name with /start <name> to begin.\n");
    }
    for message in &view.messages {
        out.push_str(&format!("{}: {}\n", speaker(message.role), message.content));
    }
    out.push_str(&render_options(view));
    out
}

pub fn render_notices(outcome: &Outcome) -> String {
    outcome
        .notices
        .iter()
        .map(|notice| {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            format!("({tag}) {}\n", notice.message)
        })
        .collect()
}

/// What changed since `before` (message count, session number).
pub fn render_update(before: (usize, u8), view: &SessionView) -> String {
    let (before_messages, before_session) = before;
    let mut out = String::new();
    if view.session != before_session || before_messages > view.messages.len() {
        out.push_str(&format!("[session {}] {}\n", view.session, view.instructions));
    } else {
        for message in &view.messages[before_messages..] {
            if message.role == Role::Assistant {
                out.push_str(&format!("{}: {}\n", speaker(message.role), message.content));
            }
        }
    }
    out.push_str(&render_options(view));
    out
}

/// Run the console loop until EOF or `/quit`.
pub async fn run_console(lab: Lab, participant: Option<String>) -> Result<()> {
    let mut state = SessionState::new();
    if let Some(name) = participant {
        let outcome = lab.handle(&mut state, Interaction::Start { name }).await;
        print!("{}", render_notices(&outcome));
    }
    print!("{}", render_view(&SessionView::build(&lab, &state)));

    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = reader.next_line().await? {
        let Some(command) = parse_console_command(&line) else {
            continue;
        };
        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Help => println!("{CONSOLE_HELP}"),
            ConsoleCommand::ShowState => {
                print!("{}", render_view(&SessionView::build(&lab, &state)));
            }
            ConsoleCommand::Invalid(hint) => println!("(warning) {hint}"),
            ConsoleCommand::Interaction(interaction) => {
                let before = (state.messages().len(), state.session().number());
                let was_started = state.experiment_started();
                let outcome = lab.handle(&mut state, interaction).await;
                print!("{}", render_notices(&outcome));
                let view = SessionView::build(&lab, &state);
                if !was_started && view.experiment_started {
                    print!("{}", render_view(&view));
                } else if outcome.accepted {
                    print!("{}", render_update(before, &view));
                }
            }
        }
    }
    Ok(())
}
