#![deny(warnings)]

//! Quick-play console front end: five investment rounds, three offers per
//! round, one financing choice each, and a closing liquidity summary.

use anyhow::{Context, Result};
use fin_runtime::quick::{QuickConfig, QuickFinancing, QuickOutcome, QuickSession};
use std::io::{self, BufRead, Write};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> Option<u64> {
    let mut seed: Option<u64> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg.as_str() == "--seed" {
            seed = it.next().and_then(|s| s.parse().ok());
        }
    }
    seed
}

fn prompt(input: &mut impl BufRead, msg: &str) -> Result<String> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("reading stdin")?;
    Ok(line.trim().to_string())
}

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

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let config = QuickConfig {
        rng_seed: parse_args().unwrap_or(42),
        ..QuickConfig::default()
    };
    info!(seed = config.rng_seed, "starting quick play");
    let mut session = QuickSession::new(config);

    println!("=== Finopoly Quick Play ===");
    println!("Five rounds. Pick a project, pick your financing, roll for the outcome.\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    while !session.is_over() {
        println!("--- Round {} ---", session.round);
        println!("Cash: ${}  Debt: ${}", session.cash, session.debt);

        let offers = session.draw_offers();
        for (i, o) in offers.iter().enumerate() {
            let npv = o.base_npv()?;
            println!(
                "{}. {} — cost ${}, ${}/yr for {} years, NPV ${:.0}{}",
                i + 1,
                o.name,
                o.cost,
                o.annual_cash_flow,
                o.life,
                npv,
                if o.high_risk { " [high risk]" } else { "" }
            );
        }

        let Some(choice) = read_number(&mut input, "Choose a project (0 to pass): ")? else {
            continue;
        };
        if choice == 0 {
            println!("You passed this round.\n");
            continue;
        }
        let Some(offer) = (choice > 0)
            .then(|| offers.get(choice as usize - 1))
            .flatten()
        else {
            println!("Invalid choice.\n");
            continue;
        };

        println!("Financing: 1. Debt  2. Equity  3. VC");
        let Some(mode) = read_number(&mut input, "Choose financing: ")? else {
            continue;
        };
        let financing = match mode {
            1 => QuickFinancing::Debt,
            2 => QuickFinancing::Equity,
            3 => QuickFinancing::Vc,
            _ => {
                println!("Invalid choice.\n");
                continue;
            }
        };

        match session.invest(offer, financing)? {
            QuickOutcome::Resolved {
                die,
                adjusted,
                multiplier,
                realized,
            } => {
                println!(
                    "Rolled {die} (adjusted {adjusted}) — outcome x{multiplier}: realized ${realized:.0}\n"
                );
            }
            QuickOutcome::VcUnavailable => {
                println!("VC funding is already used this session.\n")
            }
            QuickOutcome::CannotAfford => println!("Insufficient cash for that project.\n"),
        }
    }

    println!("=== Session Over ===");
    println!("Investments made: {}", session.investments);
    println!("Total realized NPV: ${:.0}", session.total_npv);
    println!("Cash: ${}  Debt: ${}", session.cash, session.debt);
    println!(
        "Liquidity ratio: {:.2}",
        session.liquidity_ratio()?
    );
    Ok(())
}
