use std::str::FromStr;

use blanks_core::{
    card::{CardState, HandCard},
    chat::ChatMessage,
    game_state::{Action, GameState, Outcome, Submission},
    prompt::{BlackInfo, Token},
    store::Change,
    Session, SessionEvent,
};
use itertools::Itertools;

static HELP: &str = "
*** Blanks ***
Fill the blanks of the prompt with cards from your hand. While nominating,
click cards in the order they should fill the blanks; clicking a card that is
already picked starts over. While electing, pick the submission you like best.";

#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Show,
    Click(usize),
    Elect(usize),
    Cancel,
    Join,
    Leave,
    Name(String),
    Say(String),
    Suggest(String),
    Focus,
    Blur,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCommandError;

impl CliCommand {
    fn usage() -> Vec<(&'static str, &'static str)> {
        vec![
            ("click <n>", "pick the n-th card of your hand"),
            ("elect <n>", "vote for the n-th submission"),
            ("cancel", "drop the cards picked so far"),
            ("join", "join the game"),
            ("leave", "leave the game (asks first, you lose your points)"),
            ("name <name>", "change your name"),
            ("say <text>", "chat"),
            ("suggest <card>", "suggest a new card"),
            ("focus / blur", "pretend the window gained / lost focus"),
            ("show", "print the table"),
            ("help", "this text"),
            ("quit", "quit"),
        ]
    }
}

impl FromStr for CliCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, rest) = s.split_once(' ').unwrap_or((s, ""));
        let rest = rest.trim();
        let position = || usize::from_str(rest).ok().filter(|&n| n > 0).ok_or(ParseCommandError);
        match head {
            "help" | "?" => Ok(CliCommand::Help),
            "show" => Ok(CliCommand::Show),
            "click" | "c" => Ok(CliCommand::Click(position()?)),
            "elect" | "e" => Ok(CliCommand::Elect(position()?)),
            "cancel" => Ok(CliCommand::Cancel),
            "join" => Ok(CliCommand::Join),
            "leave" => Ok(CliCommand::Leave),
            "name" if !rest.is_empty() => Ok(CliCommand::Name(rest.to_string())),
            "say" if !rest.is_empty() => Ok(CliCommand::Say(rest.to_string())),
            "suggest" if !rest.is_empty() => Ok(CliCommand::Suggest(rest.to_string())),
            "focus" => Ok(CliCommand::Focus),
            "blur" => Ok(CliCommand::Blur),
            "quit" | "q" => Ok(CliCommand::Quit),
            _ => Err(ParseCommandError),
        }
    }
}

pub fn print_help() {
    println!("{}", HELP);
    for (cmd, info) in CliCommand::usage() {
        println!("- [{}]: {}", cmd, info);
    }
}

/// Prints chat lines as they arrive, and lobby offers as they change.
pub fn attach(session: &mut Session) {
    session.on_chat_change(|change| match change {
        Change::Add(message) => print_chat(message),
        Change::Reset(messages) => messages.iter().for_each(print_chat),
        _ => {}
    });
    session.on_account_change(|change| {
        if let Change::Patch { previous, current } = change {
            if previous.action != current.action {
                if let Some(text) = current.action.and_then(offer) {
                    println!("~ {}", text);
                }
            }
        }
    });
}

fn offer(action: Action) -> Option<&'static str> {
    match action {
        Action::Join => Some("You can join the game ('join')"),
        Action::Leave => Some("You are playing ('leave' to quit the game)"),
        Action::GameFull => Some("The game is full"),
        Action::Nominate | Action::Elect => None,
    }
}

pub fn confirm_leave() {
    println!("Leave the game? You lose your points. Type 'leave' again to confirm.");
}

pub fn print_chat(message: &ChatMessage) {
    match &message.name {
        Some(name) => println!("<{}> {}", name, message.text.plain()),
        None => println!("* {}", message.text.plain()),
    }
}

pub fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::AttentionChanged(true) => println!("(!) Your turn"),
        SessionEvent::AttentionChanged(false) => {}
        SessionEvent::EndingSoon(n) => println!("~ Ending in {}...", n),
        SessionEvent::EndingSoonCleared => {}
        SessionEvent::ConnectionLost => println!("~ Connection closed"),
    }
}

pub fn print_table(session: &Session) {
    let game = session.game();
    println!("================================================");
    if session.attention_signalled() {
        println!("(!) Waiting for you");
    }
    println!("{}{}", game.status, if game.error { " [error]" } else { "" });
    if !game.roster.is_empty() {
        println!("Players: {}", format_roster(game));
    }
    if let Some(info) = &game.black_info {
        println!("Prompt: {} [pick {}]", info.text, info.blank_count);
        print_submissions(info, &game.submissions);
    }
    if !session.hand().is_empty() {
        println!("Hand:");
        for (i, card) in session.hand().iter().enumerate() {
            println!("- [{}]: {}", i + 1, format_card(card));
        }
    }
    let account = session.account();
    if let Some(action) = game.action.or(account.action) {
        println!("Action: {}", action);
    }
}

fn format_roster(game: &GameState) -> String {
    game.roster
        .iter()
        .map(|p| {
            let mut s = p.name.clone();
            if let Some(kind) = &p.kind {
                s += &format!(" <{}>", kind);
            }
            if p.score > 0 {
                s += &format!(" ({})", p.score);
            }
            if p.ready {
                s += " ready";
            }
            if p.abandoned {
                s += " gone";
            }
            s
        })
        .join(", ")
}

fn print_submissions(info: &BlackInfo, submissions: &[Submission]) {
    for (i, submission) in submissions.iter().enumerate() {
        let whites = submission.cards.iter().map(String::as_str).collect_vec();
        let marker = match submission.outcome {
            Outcome::Pending => "",
            Outcome::Winner => " <- winner",
            Outcome::Loser => "",
        };
        println!("  ({}) {}{}", i + 1, render_tokens(&info.fill(&whites)), marker);
    }
}

pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            Token::Text(text) => text.clone(),
            Token::White { white } => format!("*{}*", white),
        })
        .join("")
}

fn format_card(card: &HandCard) -> String {
    match (card.state, card.index) {
        (CardState::Normal, _) => card.id.clone(),
        (state, 0) => format!("{} ({})", card.id, state),
        (state, index) => format!("{} ({} #{})", card.id, state, index),
    }
}
