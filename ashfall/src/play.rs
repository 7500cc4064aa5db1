//! The interactive loop.
//!
//! A simple line-oriented protocol:
//! - Lines starting with `#` are client commands (quit, status, help)
//! - Everything else is a game command for the player's character
//!
//! Game time keeps running while the client waits for input, so combat
//! rounds and recovery ticks are printed as they happen.

use crate::ClientConfig;
use anyhow::{Context, Result};
use ashfall_core::commands::{ability_summary, render_room};
use ashfall_core::rules::Resolution;
use ashfall_core::{content, ActorId, GameSession, RulesEngine};
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::info;

pub async fn run(config: ClientConfig) -> Result<()> {
    let mut world = content::build_world(&config.rules).context("building the world")?;
    let player = content::spawn_player(&mut world, &config.rules, &config.player_name)
        .context("spawning the player")?;
    let engine = match config.seed {
        Some(seed) => RulesEngine::with_seed(config.rules.clone(), seed),
        None => RulesEngine::new(config.rules.clone()),
    };
    let mut session = GameSession::new(world, engine);
    info!(player = %config.player_name, "game started");

    println!("=== Ashfall ===");
    println!("Welcome, {}. Type 'help' for game commands, #help for client commands.", config.player_name);
    println!();
    if let Ok(actor) = session.world.actor(player) {
        for line in render_room(&session.world, actor.location, player) {
            println!("{line}");
        }
    }

    let mut lines = BufReader::new(io::stdin()).lines();
    let started = Instant::now();

    loop {
        let wait = session
            .next_due()
            .map(|due| units_to_duration(due.saturating_sub(session.now()), config.time_unit));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading input")? else {
                    break;
                };
                catch_up(&mut session, player, started, config.time_unit);
                let line = line.trim();
                if let Some(meta) = line.strip_prefix('#') {
                    if !client_command(&session, player, meta) {
                        println!("Goodbye!");
                        break;
                    }
                    continue;
                }
                if matches!(line, "quit" | "exit" | "logout") {
                    println!("Goodbye!");
                    break;
                }
                let resolution = session.handle_line(player, line);
                print_for(&session, player, &resolution);
            }
            _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {
                catch_up(&mut session, player, started, config.time_unit);
            }
        }
    }

    info!(player = %config.player_name, "game ended");
    Ok(())
}

/// Advance game time to match the wall clock and print what happened.
fn catch_up(session: &mut GameSession, player: ActorId, started: Instant, unit: Duration) {
    let elapsed = (started.elapsed().as_millis() / unit.as_millis().max(1)) as u64;
    let dt = elapsed.saturating_sub(session.now());
    for resolution in session.advance(dt) {
        print_for(session, player, &resolution);
    }
}

fn units_to_duration(units: u64, unit: Duration) -> Duration {
    unit.saturating_mul(u32::try_from(units).unwrap_or(u32::MAX))
}

fn print_for(session: &GameSession, player: ActorId, resolution: &Resolution) {
    let Ok(actor) = session.world.actor(player) else {
        return;
    };
    for line in resolution.messages_for(player, actor.location) {
        println!("{line}");
    }
}

/// Handle a `#` command. Returns false when the client should exit.
fn client_command(session: &GameSession, player: ActorId, command: &str) -> bool {
    match command.split_whitespace().next() {
        Some("quit") | Some("exit") => return false,
        Some("status") => match session.world.actor(player) {
            Ok(actor) => {
                let room = session
                    .world
                    .room(actor.location)
                    .map(|r| r.name.as_str())
                    .unwrap_or("nowhere");
                println!("[STATUS]");
                println!(
                    "  Character: {} (level {} {})",
                    actor.name,
                    actor.level(),
                    actor.base_class.map(|c| c.name()).unwrap_or("unclassed")
                );
                println!("  Location: {room}");
                println!("  HP: {}  Mana: {}", actor.hit_points, actor.mana);
                println!("  Abilities: {}", ability_summary(actor));
                println!("  In Combat: {}", actor.in_combat());
                println!("  Resting: {}", actor.resting);
                println!("  Time: {}", session.now());
            }
            Err(e) => println!("[ERROR] {e}"),
        },
        Some("help") => {
            println!("[HELP]");
            println!("  #quit    - Exit the game");
            println!("  #status  - Show your character at a glance");
            println!("  #help    - Show this help");
            println!("  (anything else is sent as a game command; try 'help')");
        }
        _ => println!("[ERROR] Unknown command. Type #help for help."),
    }
    true
}
