mod cli_view;
mod config;
mod login_store;
mod transport;

use std::{str::FromStr, time::Duration};

use anyhow::Result;
use blanks_core::{game_state::Action, Session};
use clap::Parser;
use cli_view::CliCommand;
use config::ClientConfig;
use log::{error, info, warn};
use login_store::FileLoginStore;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, Instant},
};
use transport::Connection;

/// How long the "game is full" notice stays before joining is offered again.
const GAME_FULL_NOTICE: Duration = Duration::from_millis(1500);

enum Flow {
    Continue,
    Quit,
}

/// Terminal state that lives between commands.
#[derive(Default)]
struct Prompt {
    leave_pending: bool,
}

fn run_command(session: &mut Session, prompt: &mut Prompt, command: CliCommand) -> Flow {
    let leave_pending = std::mem::take(&mut prompt.leave_pending);
    match command {
        CliCommand::Help => cli_view::print_help(),
        CliCommand::Show => cli_view::print_table(session),
        CliCommand::Click(n) => {
            let id = session.hand().iter().nth(n - 1).map(|c| c.id.clone());
            match id {
                Some(id) => {
                    if let Err(e) = session.click_card(&id) {
                        warn!("click on {id:?} failed: {e}");
                    }
                    cli_view::print_table(session);
                }
                None => println!("No card {}", n),
            }
        }
        CliCommand::Elect(n) => {
            if !session.elect_submission(n - 1) {
                println!("Cannot vote for {} now", n);
            }
        }
        CliCommand::Cancel => {
            session.reset_selections();
            cli_view::print_table(session);
        }
        CliCommand::Join => session.join_game(),
        CliCommand::Leave if leave_pending => session.leave_game(),
        CliCommand::Leave => {
            prompt.leave_pending = true;
            cli_view::confirm_leave();
        }
        CliCommand::Name(name) => {
            session.set_name(&name);
        }
        CliCommand::Say(text) => {
            session.send_chat(&text);
        }
        CliCommand::Suggest(card) => {
            session.suggest_card(&card);
        }
        CliCommand::Focus => session.set_focused(true),
        CliCommand::Blur => session.set_focused(false),
        CliCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = ClientConfig::parse();
    let mut session = Session::new(config.session());
    let mut login_store = FileLoginStore::new(&config.login_file);
    let mut connection = Connection::open(config.server, config.protocol_id)?;
    info!("connecting to {}", config.server);
    cli_view::attach(&mut session);
    cli_view::print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut prompt = Prompt::default();
    let mut pump = time::interval(Duration::from_millis(50));
    let mut clock = time::interval(Duration::from_secs(1));
    let mut last_updated = Instant::now();
    let mut logged_in = false;
    let mut ticking = false;
    let mut game_full_until: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = pump.tick() => {
                let now = Instant::now();
                let duration = now - last_updated;
                last_updated = now;

                let batches = match connection.update(duration) {
                    Ok(batches) => batches,
                    Err(e) => {
                        error!("transport failed: {e}");
                        session.connection_lost();
                        break;
                    }
                };
                for batch in &batches {
                    for e in session.apply_batch(batch) {
                        println!("~ {}", e);
                    }
                }
                if !batches.is_empty() {
                    cli_view::print_table(&session);
                }

                if session.account().action == Some(Action::GameFull) {
                    match game_full_until {
                        None => game_full_until = Some(now + GAME_FULL_NOTICE),
                        Some(until) if now >= until => {
                            session.reopen_join();
                            game_full_until = None;
                        }
                        Some(_) => {}
                    }
                } else {
                    game_full_until = None;
                }

                if connection.is_connected() {
                    if !logged_in {
                        session.login(&mut login_store)?;
                        logged_in = true;
                    }
                    for event in session.drain_outbox() {
                        connection.send(&event)?;
                    }
                } else if connection.is_disconnected() {
                    session.connection_lost();
                    break;
                }
                connection.flush()?;
            }
            _ = clock.tick() => {
                if session.countdown_active() {
                    session.tick();
                }
            }
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                if line.trim().is_empty() {
                    continue;
                }
                match CliCommand::from_str(&line) {
                    Ok(command) => {
                        if let Flow::Quit = run_command(&mut session, &mut prompt, command) {
                            break;
                        }
                    }
                    Err(_) => println!("Unknown command, try 'help'"),
                }
            }
        }

        // A freshly armed countdown counts its first second from now.
        let active = session.countdown_active();
        if active && !ticking {
            clock.reset();
        }
        ticking = active;

        for event in session.drain_events() {
            cli_view::print_event(&event);
        }
    }

    for event in session.drain_events() {
        cli_view::print_event(&event);
    }
    if session.game().error {
        println!("~ {}", session.game().status);
    }
    connection.disconnect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use blanks_core::{ClientEvent, SessionConfig};
    use serde_json::json;

    use super::*;

    #[test]
    fn leave_should_wait_for_confirmation() {
        let mut session = Session::new(SessionConfig::default());
        let mut prompt = Prompt::default();

        run_command(&mut session, &mut prompt, CliCommand::Leave);
        assert!(session.drain_outbox().is_empty());
        run_command(&mut session, &mut prompt, CliCommand::Leave);
        assert_eq!(session.drain_outbox(), vec![ClientEvent::Leave]);
    }

    #[test]
    fn any_other_command_should_drop_a_pending_leave() {
        let mut session = Session::new(SessionConfig::default());
        let mut prompt = Prompt::default();

        run_command(&mut session, &mut prompt, CliCommand::Leave);
        run_command(&mut session, &mut prompt, CliCommand::Focus);
        run_command(&mut session, &mut prompt, CliCommand::Leave);
        assert!(session.drain_outbox().is_empty());
    }

    #[test]
    fn cancel_should_reset_the_nomination() {
        let mut session = Session::new(SessionConfig::default());
        let mut prompt = Prompt::default();
        session.apply_batch(
            &json!([
                {"a": "set", "action": "nominate", "black": "_ and _"},
                {"a": "reset", "t": "hand", "objs": [{"id": "A"}, {"id": "B"}]},
            ])
            .to_string(),
        );

        run_command(&mut session, &mut prompt, CliCommand::Click(2));
        run_command(&mut session, &mut prompt, CliCommand::Cancel);
        assert!(session.hand().iter().all(|c| c.is_normal()));
        assert_eq!(session.drain_outbox(), vec![ClientEvent::Submit { cards: vec![] }]);
    }
}
