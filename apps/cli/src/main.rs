#![deny(warnings)]

//! Interactive console front end for the Finopoly board game.
//!
//! All game semantics live in `fin-runtime`; this binary only prompts,
//! parses and prints. Non-numeric menu input is reported and the action
//! simply lapses, matching the house rules.

use anyhow::{Context, Result};
use fin_core::{FinancingKind, SpecialAction, TileKind};
use fin_runtime::engine::{
    EventOutcome, FinancingOutcome, InvestOutcome, IpoOutcome, RoundOutcome, StrategicMove,
    StrategicOutcome, TurnStart, IPO_MIN_ROUND,
};
use fin_runtime::{GameConfig, GameState};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Optional YAML setup file: seed and pre-registered player names.
#[derive(Debug, Default, Deserialize)]
struct SetupFile {
    seed: Option<u64>,
    players: Option<Vec<String>>,
}

fn parse_args() -> (Option<u64>, Option<String>) {
    let mut seed: Option<u64> = None;
    let mut config: Option<String> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()),
            "--config" => config = it.next(),
            _ => {}
        }
    }
    (seed, config)
}

fn prompt(input: &mut impl BufRead, msg: &str) -> Result<String> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("reading stdin")?;
    Ok(line.trim().to_string())
}

/// Parses a menu number; `None` means the input was not a number (reported,
/// no re-prompt).
fn read_number(input: &mut impl BufRead, msg: &str) -> Result<Option<i64>> {
    let line = prompt(input, msg)?;
    match line.parse::<i64>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => {
            println!("Please enter a valid number.");
            Ok(None)
        }
    }
}

fn confirm(input: &mut impl BufRead, msg: &str) -> Result<bool> {
    Ok(prompt(input, msg)?.to_lowercase() == "y")
}

fn banner() {
    println!(
        r"
╔═══════════════════════════════════════════════════════════════╗
║                         FINOPOLY                              ║
║           The Financial Management Simulation Game            ║
╚═══════════════════════════════════════════════════════════════╝
"
    );
}

fn collect_players(input: &mut impl BufRead) -> Result<Vec<String>> {
    let count = loop {
        if let Some(n) = read_number(input, "Enter number of players (3-5): ")? {
            if (3..=5).contains(&n) {
                break n as usize;
            }
            println!("Please enter a valid number of players (3-5).");
        }
    };
    let mut names = Vec::with_capacity(count);
    for i in 1..=count {
        let name = prompt(input, &format!("Enter name for Player {i}: "))?;
        names.push(if name.is_empty() {
            format!("Player {i}")
        } else {
            name
        });
    }
    Ok(names)
}

fn handle_investment(
    game: &mut GameState,
    p: usize,
    card_index: usize,
    input: &mut impl BufRead,
) -> Result<()> {
    if let Some(owner) = game.project_owner(card_index) {
        println!(
            "This project is already owned by {}",
            game.players[owner].name
        );
        return Ok(());
    }
    let card = game.projects[card_index].clone();
    println!("\nInvestment Opportunity: {}", card.name);
    println!("Cost: ${}M", card.cost);
    println!(
        "Annual Cash Flow: ${}M for {} years",
        card.annual_cash_flow, card.life
    );
    println!("Risk Level: {:?}", card.risk_level);
    println!("User Gain: {}M users", card.user_gain);
    println!("NPV: ${:.2}M", card.npv()?);
    println!("IRR: {:.2}%", card.irr()? * 100.0);
    println!("Payback Period: {:.2} years", card.payback_period()?);

    if !game.players[p].can_afford(card.cost) {
        println!(
            "You cannot afford this project (Cash: ${}M)",
            game.players[p].cash
        );
        return Ok(());
    }
    if !confirm(
        input,
        &format!(
            "\nDo you want to invest in {} for ${}M? (y/n): ",
            card.name, card.cost
        ),
    )? {
        println!("You decided not to invest in this project.");
        return Ok(());
    }
    match game.buy_project(p, card_index)? {
        InvestOutcome::Purchased { user_gain, .. } => {
            println!("\nYou have successfully invested in {}!", card.name);
            println!("You gained {user_gain}M users!");
        }
        InvestOutcome::CannotAfford => println!("Transaction failed. Insufficient funds."),
        InvestOutcome::AlreadyOwned { owner } => {
            println!("This project is already owned by {owner}")
        }
    }
    Ok(())
}

fn handle_financing(game: &mut GameState, p: usize, input: &mut impl BufRead) -> Result<()> {
    println!("\nFinancing Opportunity");
    let options = game.available_financing(p)?;
    if options.is_empty() {
        println!("No financing options available at this time.");
        return Ok(());
    }
    println!("Available options:");
    for (i, o) in options.iter().enumerate() {
        println!(
            "{}. {}: {} ({})",
            i + 1,
            o.kind.label(),
            o.description,
            o.conditions
        );
    }
    let Some(choice) = read_number(input, "\nChoose a financing option (0 to skip): ")? else {
        return Ok(());
    };
    if choice == 0 {
        println!("You decided not to take any financing.");
        return Ok(());
    }
    let Some(option) = (choice > 0)
        .then(|| options.get(choice as usize - 1))
        .flatten()
    else {
        println!("Invalid choice.");
        return Ok(());
    };
    let requested = match option.kind {
        FinancingKind::Debt => {
            let Some(n) = read_number(
                input,
                &format!("How much debt do you want to take? (max ${}M): ", option.max_amount),
            )?
            else {
                return Ok(());
            };
            Decimal::new(n, 0)
        }
        FinancingKind::Equity => {
            let Some(n) = read_number(
                input,
                &format!(
                    "How much equity financing do you want to raise? (max ${}M): ",
                    option.max_amount
                ),
            )?
            else {
                return Ok(());
            };
            Decimal::new(n, 0)
        }
        _ => option.max_amount,
    };
    match game.take_financing(p, option.kind, requested)? {
        FinancingOutcome::Taken { kind, amount } => match kind {
            FinancingKind::Debt => {
                println!("You took ${amount}M in debt at 6% annual interest.")
            }
            FinancingKind::VcFunding => println!(
                "You received ${amount}M in VC funding, but lost 10% of your NPV."
            ),
            FinancingKind::Equity => println!(
                "You raised ${amount}M through equity, but diluted your NPV by 20%."
            ),
            FinancingKind::Ipo => println!(
                "You conducted an IPO and raised ${amount}M, but your final NPV will be reduced by 30%."
            ),
        },
        FinancingOutcome::Unavailable => println!("That option is not available right now."),
    }
    Ok(())
}

fn handle_event(game: &mut GameState, p: usize) -> Result<()> {
    let (kind, outcome) = game.draw_event(p)?;
    println!("\nEvent: {}", kind.name());
    println!("Description: {}", kind.description());
    println!("Impact: {}", kind.impact());
    match outcome {
        EventOutcome::RevenueLost(amount) => {
            println!("You lost ${amount:.2}M in revenue due to the economic downturn.")
        }
        EventOutcome::CashLost(amount) => println!("You lost ${amount}M."),
        EventOutcome::Mitigated => println!("Your earlier investments protected you!"),
        EventOutcome::UsersLost(n) => println!("You lost {n}M users."),
        EventOutcome::UsersGained(n) => println!("You gained {n}M users."),
        EventOutcome::CashGained(amount) => println!("You gained ${amount}M."),
        EventOutcome::TurnSkipped => println!("You will skip your next turn."),
        EventOutcome::NoEffect => {}
    }
    Ok(())
}

fn handle_special(
    game: &mut GameState,
    p: usize,
    action: SpecialAction,
    input: &mut impl BufRead,
) -> Result<()> {
    match action {
        SpecialAction::Ipo => {
            if game.round < IPO_MIN_ROUND || game.players[p].ipo_done {
                println!("\nIPO is only available in rounds 4 and 5, and only once per game.");
                return Ok(());
            }
            if !confirm(
                input,
                "\nDo you want to conduct an IPO? This will raise $100M but reduce your final NPV by 30%. (y/n): ",
            )? {
                println!("You decided not to conduct an IPO at this time.");
                return Ok(());
            }
            if let IpoOutcome::Completed { raised } = game.attempt_ipo(p)? {
                println!("You successfully conducted an IPO and raised ${raised}M!");
            }
        }
        SpecialAction::Strategy => {
            println!("\nStrategic Decision Point");
            if game.players[p].holdings.is_empty() {
                println!("You don't have any projects to make strategic decisions about.");
                return Ok(());
            }
            println!("Your projects:");
            for (i, h) in game.players[p].holdings.iter().enumerate() {
                println!("{}. {}", i + 1, h.card.name);
            }
            let Some(choice) =
                read_number(input, "\nChoose a project (0 to skip): ")?
            else {
                return Ok(());
            };
            if choice <= 0 || choice as usize > game.players[p].holdings.len() {
                println!("You decided not to make any strategic decisions.");
                return Ok(());
            }
            let holding = choice as usize - 1;
            println!("\nStrategic options:");
            println!("1. Expand (Increase annual cash flow by 50% for $20M)");
            println!("2. Pivot (Change project focus for $15M)");
            println!("3. Sell (Recover 50% of initial investment)");
            let Some(mv) = read_number(input, "\nChoose a strategic option (0 to skip): ")? else {
                return Ok(());
            };
            let mv = match mv {
                1 => StrategicMove::Expand,
                2 => StrategicMove::Pivot,
                3 => StrategicMove::Sell,
                _ => {
                    println!("Invalid choice or you decided to skip.");
                    return Ok(());
                }
            };
            let name = game.players[p].holdings[holding].card.name.clone();
            match game.strategic_move(p, holding, mv)? {
                StrategicOutcome::Expanded { new_cash_flow } => println!(
                    "You expanded {name}! Annual cash flow increased to ${new_cash_flow}M."
                ),
                StrategicOutcome::Pivoted {
                    new_cash_flow,
                    new_life,
                } => println!(
                    "You pivoted {name}! Annual cash flow increased to ${new_cash_flow}M and life extended to {new_life} years."
                ),
                StrategicOutcome::Sold { refund } => {
                    println!("You sold {name} and recovered ${refund}M.")
                }
                StrategicOutcome::CannotAfford => println!("You cannot afford this move."),
            }
        }
    }
    Ok(())
}

fn play_turn(game: &mut GameState, p: usize, input: &mut impl BufRead) -> Result<()> {
    match game.begin_turn(p)? {
        TurnStart::Skipped => {
            println!(
                "\n{}'s turn is skipped due to system crash.",
                game.players[p].name
            );
            return Ok(());
        }
        TurnStart::Moved { die, tile } => {
            println!("\nYou rolled a {die}!");
            println!("You landed on: {} (Position {})", tile.name, tile.position);
            match tile.kind {
                TileKind::Investment(idx) => handle_investment(game, p, idx, input)?,
                TileKind::Financing => handle_financing(game, p, input)?,
                TileKind::Event => handle_event(game, p)?,
                TileKind::Neutral => {
                    println!("\nRevenue Collection");
                    let revenue = game.collect_revenue(p)?;
                    println!("You collected ${revenue}M in revenue from your projects.");
                }
                TileKind::Special(action) => handle_special(game, p, action, input)?,
            }
        }
    }
    Ok(())
}

fn show_standings(game: &GameState) -> Result<()> {
    println!("\nCurrent Standings:");
    println!(
        "{:<12} {:>10} {:>10} {:>9} {:>10} {:>10}",
        "Player", "Cash ($M)", "Users (M)", "Projects", "NPV ($M)", "Debt ($M)"
    );
    for row in game.standings()? {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>9} {:>10.2} {:>10.2}",
            row.player, row.cash, row.users, row.projects, row.npv, row.debt
        );
    }
    Ok(())
}

fn show_final_results(game: &GameState) -> Result<()> {
    println!("\n{}", "=".repeat(50));
    println!("GAME OVER");
    println!("{}", "=".repeat(50));
    let rows = game.final_scores()?;
    println!("\nFinal Results:");
    println!(
        "{:<5} {:<12} {:>12} {:>10} {:>10} {:>10} {:>10}",
        "Rank", "Player", "Total Score", "NPV ($M)", "Users (M)", "Cash ($M)", "Strategic"
    );
    for (i, r) in rows.iter().enumerate() {
        println!(
            "{:<5} {:<12} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            i + 1,
            r.player,
            r.total,
            r.npv,
            r.users,
            r.cash,
            r.strategic
        );
    }
    if let Some(winner) = rows.first() {
        println!(
            "\nCongratulations, {}! You are the most successful CFO with a score of {:.2}!",
            winner.player, winner.total
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (seed_arg, config_path) = parse_args();
    let setup = match &config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => SetupFile::default(),
    };
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        "starting finopoly"
    );

    banner();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let names = match setup.players {
        Some(names) if (3..=5).contains(&names.len()) => names,
        _ => collect_players(&mut input)?,
    };
    let config = GameConfig {
        rng_seed: seed_arg.or(setup.seed).unwrap_or_else(rand_seed),
        ..GameConfig::default()
    };
    let mut game = GameState::new(config, &names);
    for player in &game.players {
        fin_core::validate_player(player)?;
    }

    println!("\nStarting Finopoly Game!");
    println!("Each player starts with $100M and 1M users.");
    println!("The goal is to maximize your company value over 5 rounds.");

    while !game.is_over() {
        for p in 0..game.players.len() {
            println!("\n{}", "=".repeat(50));
            println!("{}'s Turn (Round {})", game.players[p].name, game.round);
            println!("{}", "=".repeat(50));
            println!("Current Position: {}", game.players[p].position);
            println!("Cash: ${}M", game.players[p].cash);
            println!("Users: {}M", game.players[p].users);
            println!("Projects: {}", game.players[p].holdings.len());

            prompt(&mut input, "\nPress Enter to roll the dice...")?;
            play_turn(&mut game, p, &mut input)?;

            if p + 1 < game.players.len() {
                prompt(&mut input, "\nPress Enter for next player's turn...")?;
            }
        }

        println!("\n{}", "=".repeat(50));
        println!("End of Round {}", game.round);
        println!("{}", "=".repeat(50));
        for outcome in game.end_round() {
            match outcome {
                RoundOutcome::InterestPaid { player, amount } => {
                    println!("{player} paid ${amount}M in debt interest.")
                }
                RoundOutcome::Bankrupt { player, owed } => {
                    println!("{player} couldn't pay ${owed}M in debt interest and is bankrupt!")
                }
            }
        }
        show_standings(&game)?;
        game.advance_round();
        if !game.is_over() {
            println!("\nStarting Round {}...", game.round);
        }
    }

    show_final_results(&game)?;
    Ok(())
}

/// Entropy-based fallback seed when neither the flag nor the config sets one.
fn rand_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
