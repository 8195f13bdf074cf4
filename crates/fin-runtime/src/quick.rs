//! Quick-play: a single-session, five-round investment loop with stochastic
//! outcome multipliers. Independent of the board game; shares the metric
//! calculators and money conventions (here plain dollars, not $M).

use fin_econ::{MetricError, DISCOUNT_RATE};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Flat penalty on VC-financed outcomes, in dollars.
pub fn vc_penalty() -> Decimal {
    Decimal::new(5_000_000, 0)
}

/// Interest rate charged on outstanding debt after each investment.
pub fn quick_debt_rate() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

/// Quick-play session parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuickConfig {
    pub rng_seed: u64,
    pub rounds: u32,
    /// Starting cash in dollars.
    pub starting_cash: Decimal,
    /// Projects offered per round.
    pub offers: usize,
}

impl Default for QuickConfig {
    fn default() -> Self {
        QuickConfig {
            rng_seed: 42,
            rounds: 5,
            starting_cash: Decimal::new(100_000_000, 0),
            offers: 3,
        }
    }
}

/// A quick-play project offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuickProject {
    pub name: String,
    pub cost: Decimal,
    pub life: u32,
    pub annual_cash_flow: Decimal,
    pub high_risk: bool,
}

impl QuickProject {
    /// Base NPV at the default discount rate, before the outcome roll.
    pub fn base_npv(&self) -> Result<f64, MetricError> {
        fin_econ::npv(self.cost, self.annual_cash_flow, self.life, DISCOUNT_RATE)
    }
}

/// How the investment is financed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickFinancing {
    /// Full cost goes on the balance sheet as debt; cash untouched.
    Debt,
    /// Cost paid from cash.
    Equity,
    /// Cost paid from cash, flat penalty on the outcome, single use.
    Vc,
}

/// Result of one quick-play investment.
#[derive(Clone, Debug, PartialEq)]
pub enum QuickOutcome {
    /// VC financing already used this session.
    VcUnavailable,
    CannotAfford,
    Resolved {
        die: u8,
        /// Die minus the high-risk handicap.
        adjusted: i8,
        multiplier: f64,
        /// Outcome value added to cumulative NPV and cash, net of any VC
        /// penalty.
        realized: f64,
    },
}

/// Session-scoped game state for the quick-play variant.
pub struct QuickSession {
    pub config: QuickConfig,
    pub cash: Decimal,
    pub debt: Decimal,
    pub total_npv: f64,
    pub round: u32,
    pub vc_used: bool,
    pub investments: u32,
    pool: Vec<QuickProject>,
    rng: ChaCha8Rng,
}

fn project(name: &str, cost: i64, life: u32, cash_flow: i64, high_risk: bool) -> QuickProject {
    QuickProject {
        name: name.to_string(),
        cost: Decimal::new(cost, 0),
        life,
        annual_cash_flow: Decimal::new(cash_flow, 0),
        high_risk,
    }
}

/// The fixed pool quick-play offers are sampled from.
pub fn default_pool() -> Vec<QuickProject> {
    vec![
        project("Cloud Migration", 25_000_000, 4, 9_000_000, false),
        project("International Expansion", 30_000_000, 5, 10_500_000, true),
        project("R&D Moonshot", 20_000_000, 3, 9_500_000, true),
        project("Logistics Automation", 25_000_000, 4, 8_500_000, false),
        project("Brand Relaunch", 15_000_000, 3, 6_500_000, false),
        project("Fintech Acquisition", 35_000_000, 5, 12_000_000, true),
    ]
}

impl QuickSession {
    pub fn new(config: QuickConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        QuickSession {
            cash: config.starting_cash,
            debt: Decimal::ZERO,
            total_npv: 0.0,
            round: 1,
            vc_used: false,
            investments: 0,
            pool: default_pool(),
            rng,
            config,
        }
    }

    pub fn is_over(&self) -> bool {
        self.round > self.config.rounds
    }

    /// Samples this round's offers without replacement from the pool.
    pub fn draw_offers(&mut self) -> Vec<QuickProject> {
        let n = self.config.offers.min(self.pool.len());
        self.pool
            .choose_multiple(&mut self.rng, n)
            .cloned()
            .collect()
    }

    /// Maps an adjusted die roll to the outcome multiplier.
    fn outcome_multiplier(adjusted: i8) -> f64 {
        match adjusted {
            i8::MIN..=2 => 0.75,
            3 | 4 => 1.0,
            _ => 1.25,
        }
    }

    /// Runs one investment: finance the cost, roll for the outcome, accrue
    /// realized NPV and cash, then charge debt interest. Advances the round
    /// on success.
    pub fn invest(
        &mut self,
        offer: &QuickProject,
        financing: QuickFinancing,
    ) -> Result<QuickOutcome, MetricError> {
        match financing {
            QuickFinancing::Vc if self.vc_used => return Ok(QuickOutcome::VcUnavailable),
            QuickFinancing::Debt => {
                // The single-deduction path: the cost is financed entirely
                // by debt and never leaves the cash balance.
                self.debt += offer.cost;
            }
            QuickFinancing::Equity | QuickFinancing::Vc => {
                if self.cash < offer.cost {
                    return Ok(QuickOutcome::CannotAfford);
                }
                self.cash -= offer.cost;
            }
        }
        if financing == QuickFinancing::Vc {
            self.vc_used = true;
        }

        let die: u8 = self.rng.gen_range(1..=6);
        let adjusted = die as i8 - if offer.high_risk { 1 } else { 0 };
        let multiplier = Self::outcome_multiplier(adjusted);
        let mut realized = offer.base_npv()? * multiplier;
        if financing == QuickFinancing::Vc {
            realized -= vc_penalty().to_f64().ok_or(MetricError::NonFinite)?;
        }

        self.total_npv += realized;
        self.cash += Decimal::from_f64(realized).ok_or(MetricError::NonFinite)?;
        self.cash -= self.debt * quick_debt_rate();

        self.investments += 1;
        self.round += 1;
        debug!(die, adjusted, multiplier, realized, "investment resolved");
        Ok(QuickOutcome::Resolved {
            die,
            adjusted,
            multiplier,
            realized,
        })
    }

    /// Cash over debt; cash over 1 when there is no debt.
    pub fn liquidity_ratio(&self) -> Result<f64, MetricError> {
        let cash = self.cash.to_f64().ok_or(MetricError::NonFinite)?;
        if self.debt == Decimal::ZERO {
            return Ok(cash);
        }
        let debt = self.debt.to_f64().ok_or(MetricError::NonFinite)?;
        Ok(cash / debt)
    }
}
