#![deny(warnings)]

//! Core domain models and invariants for Finopoly.
//!
//! This crate defines the serializable types shared across the game — project
//! cards, financing options, events, board tiles and per-player state — with
//! validation helpers to guarantee basic invariants. Monetary amounts are in
//! millions of USD, user counts in millions of users.

use fin_econ::{MetricError, DISCOUNT_RATE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equity-dilution fraction added per VC funding round.
pub const VC_DILUTION: f64 = 0.10;
/// Equity-dilution fraction added per equity raise (stackable).
pub const EQUITY_DILUTION: f64 = 0.20;
/// Multiplier applied to total NPV once a player has gone public.
pub const IPO_NPV_FACTOR: f64 = 0.7;

/// Annual interest rate charged on outstanding debt at end of round.
pub fn debt_interest_rate() -> Decimal {
    Decimal::new(6, 2) // 0.06
}

/// Qualitative risk rating of a project card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// An investable project card: a level annuity of `annual_cash_flow` over
/// `life` years, bought for `cost`, granting `user_gain` users on purchase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectCard {
    /// Display name; also the key for event mitigation checks.
    pub name: String,
    /// Upfront cost in $M.
    pub cost: Decimal,
    /// Cash-flow life in years.
    pub life: u32,
    /// Annual cash inflow in $M.
    pub annual_cash_flow: Decimal,
    /// Real-option tag, e.g. "Expand", "Scale".
    pub category: String,
    /// Qualitative risk rating.
    pub risk_level: RiskLevel,
    /// Users gained on purchase, in millions.
    pub user_gain: Decimal,
}

impl ProjectCard {
    /// Net present value at the default discount rate.
    pub fn npv(&self) -> Result<f64, MetricError> {
        fin_econ::npv(self.cost, self.annual_cash_flow, self.life, DISCOUNT_RATE)
    }

    /// Simplified linear IRR approximation.
    pub fn irr(&self) -> Result<f64, MetricError> {
        fin_econ::irr_approx(self.cost, self.annual_cash_flow, self.life)
    }

    /// Payback period in years.
    pub fn payback_period(&self) -> Result<f64, MetricError> {
        fin_econ::payback_period(self.cost, self.annual_cash_flow)
    }

    /// Profitability index at the default discount rate.
    pub fn profitability_index(&self) -> Result<f64, MetricError> {
        fin_econ::profitability_index(self.cost, self.annual_cash_flow, self.life, DISCOUNT_RATE)
    }
}

/// A purchased project in a player's portfolio. Strategic actions mutate the
/// held copy (cash flow, life); the catalog card stays pristine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Index of the card in the game's project catalog.
    pub card_index: usize,
    /// Mutable copy of the purchased card.
    pub card: ProjectCard,
    /// Round in which the project was bought.
    pub purchase_round: u32,
}

impl Holding {
    /// Years of cash flow left as of `current_round`.
    pub fn remaining_life(&self, current_round: u32) -> u32 {
        let elapsed = current_round.saturating_sub(self.purchase_round);
        self.card.life.saturating_sub(elapsed)
    }
}

/// The four ways a player can raise capital.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancingKind {
    /// Borrowing at 6% annual interest, capped per round.
    Debt,
    /// Venture capital: fixed amount, once per game, 10% dilution.
    VcFunding,
    /// Equity raise: 20% dilution per use, stackable.
    Equity,
    /// Initial public offering: rounds 4-5 only, 30% terminal NPV penalty.
    Ipo,
}

impl FinancingKind {
    pub fn label(self) -> &'static str {
        match self {
            FinancingKind::Debt => "Debt",
            FinancingKind::VcFunding => "VC Funding",
            FinancingKind::Equity => "Equity",
            FinancingKind::Ipo => "IPO",
        }
    }
}

/// A financing option as presented to the player. Effects are applied by
/// kind in [`Player::add_financing`], not by the option itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinancingOption {
    pub kind: FinancingKind,
    pub description: String,
    /// Largest amount obtainable in one use, in $M.
    pub max_amount: Decimal,
    /// Usage-condition text shown in menus.
    pub conditions: String,
}

/// One recorded financing round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancingRecord {
    pub kind: FinancingKind,
    pub amount: Decimal,
}

/// Market events drawn on Event tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    EconomicDownturn,
    CybersecurityBreach,
    DataLeakScandal,
    RegulatoryFine,
    SystemCrash,
    MarketExpansion,
    StrategicPartnership,
    TalentAcquisition,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::EconomicDownturn,
        EventKind::CybersecurityBreach,
        EventKind::DataLeakScandal,
        EventKind::RegulatoryFine,
        EventKind::SystemCrash,
        EventKind::MarketExpansion,
        EventKind::StrategicPartnership,
        EventKind::TalentAcquisition,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::EconomicDownturn => "Economic Downturn",
            EventKind::CybersecurityBreach => "Cybersecurity Breach",
            EventKind::DataLeakScandal => "Data Leak Scandal",
            EventKind::RegulatoryFine => "Regulatory Fine",
            EventKind::SystemCrash => "System Crash",
            EventKind::MarketExpansion => "Market Expansion",
            EventKind::StrategicPartnership => "Strategic Partnership",
            EventKind::TalentAcquisition => "Talent Acquisition",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EventKind::EconomicDownturn => "Economic downturn affects revenue",
            EventKind::CybersecurityBreach => "Security breach costs money",
            EventKind::DataLeakScandal => "Data leak affects user trust",
            EventKind::RegulatoryFine => "Regulatory issues lead to fine",
            EventKind::SystemCrash => "Major system failure",
            EventKind::MarketExpansion => "New market opportunity",
            EventKind::StrategicPartnership => "New partnership opportunity",
            EventKind::TalentAcquisition => "Key talent joins company",
        }
    }

    pub fn impact(self) -> &'static str {
        match self {
            EventKind::EconomicDownturn => "-15% revenue this round",
            EventKind::CybersecurityBreach => "-$15M cash unless secured",
            EventKind::DataLeakScandal => "Lose 1M users",
            EventKind::RegulatoryFine => "-$10M cash if compliance project missing",
            EventKind::SystemCrash => "Lose 1 turn",
            EventKind::MarketExpansion => "Gain 0.5M users",
            EventKind::StrategicPartnership => "Gain $10M cash",
            EventKind::TalentAcquisition => "Next project costs 10% less",
        }
    }
}

/// Sub-action carried by a Special tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAction {
    Ipo,
    Strategy,
}

/// What landing on a tile does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TileKind {
    /// Offers the catalog project at this index for purchase.
    Investment(usize),
    /// Opens the financing menu.
    Financing,
    /// Draws a random market event.
    Event,
    /// Collects annual revenue from all owned projects.
    Neutral,
    /// IPO opportunity or strategic decision point.
    Special(SpecialAction),
}

/// One cell of the circular board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub position: usize,
    pub name: String,
    pub kind: TileKind,
}

/// Mutable per-participant state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Cash in $M. May go negative transiently from event penalties, until
    /// the end-of-round bankruptcy check.
    pub cash: Decimal,
    /// Users in millions; never negative.
    pub users: Decimal,
    /// Board position index.
    pub position: usize,
    pub holdings: Vec<Holding>,
    pub financing_history: Vec<FinancingRecord>,
    /// Outstanding debt principal in $M.
    pub debt: Decimal,
    /// Cumulative equity-dilution fraction applied to total NPV.
    pub equity_dilution: f64,
    pub vc_funding_used: bool,
    pub ipo_done: bool,
    pub skip_next_turn: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, cash: Decimal, users: Decimal) -> Self {
        Player {
            name: name.into(),
            cash,
            users,
            position: 0,
            holdings: Vec::new(),
            financing_history: Vec::new(),
            debt: Decimal::ZERO,
            equity_dilution: 0.0,
            vc_funding_used: false,
            ipo_done: false,
            skip_next_turn: false,
        }
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.cash >= amount
    }

    /// Deducts `amount` if affordable; otherwise a no-op returning `false`.
    pub fn pay(&mut self, amount: Decimal) -> bool {
        if self.can_afford(amount) {
            self.cash -= amount;
            true
        } else {
            false
        }
    }

    pub fn receive(&mut self, amount: Decimal) {
        self.cash += amount;
    }

    pub fn add_users(&mut self, count: Decimal) {
        self.users += count;
    }

    /// Removes users, flooring at zero.
    pub fn lose_users(&mut self, count: Decimal) {
        self.users = (self.users - count).max(Decimal::ZERO);
    }

    /// Binds a purchased card to this player as of `current_round`.
    pub fn add_holding(&mut self, card_index: usize, card: ProjectCard, current_round: u32) {
        self.holdings.push(Holding {
            card_index,
            card,
            purchase_round: current_round,
        });
    }

    pub fn owns_project(&self, name: &str) -> bool {
        self.holdings.iter().any(|h| h.card.name == name)
    }

    /// Records a financing round and applies its permanent state change.
    pub fn add_financing(&mut self, kind: FinancingKind, amount: Decimal) {
        self.financing_history.push(FinancingRecord { kind, amount });
        match kind {
            FinancingKind::Debt => self.debt += amount,
            FinancingKind::VcFunding => {
                self.vc_funding_used = true;
                self.equity_dilution += VC_DILUTION;
            }
            FinancingKind::Equity => self.equity_dilution += EQUITY_DILUTION,
            // Penalty applied inside total_npv, not here.
            FinancingKind::Ipo => self.ipo_done = true,
        }
    }

    /// Interest owed on outstanding debt at end of round.
    pub fn debt_interest(&self) -> Decimal {
        self.debt * debt_interest_rate()
    }

    /// Sums annual cash flows of all holdings into cash; returns the total.
    pub fn collect_revenues(&mut self) -> Decimal {
        let total: Decimal = self.holdings.iter().map(|h| h.card.annual_cash_flow).sum();
        self.cash += total;
        total
    }

    /// Total NPV of the portfolio as of `current_round`: each holding's
    /// remaining cash flows discounted from year 1, then diluted by
    /// accumulated equity financing and the IPO penalty. Pure given fixed
    /// state.
    pub fn total_npv(&self, current_round: u32) -> Result<f64, MetricError> {
        let mut total = 0.0;
        for h in &self.holdings {
            let remaining = h.remaining_life(current_round);
            if remaining > 0 {
                total += fin_econ::present_value(h.card.annual_cash_flow, remaining, DISCOUNT_RATE)?;
            }
        }
        total *= 1.0 - self.equity_dilution;
        if self.ipo_done {
            total *= IPO_NPV_FACTOR;
        }
        Ok(total)
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Names must be non-empty.
    #[error("empty name")]
    EmptyName,
    /// Money fields must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Project life must be at least one year.
    #[error("project life must be > 0")]
    ZeroLife,
    /// User counts must be non-negative.
    #[error("negative user count is invalid")]
    NegativeUsers,
}

/// Validate a project card.
pub fn validate_project_card(card: &ProjectCard) -> Result<(), ValidationError> {
    if card.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if card.life == 0 {
        return Err(ValidationError::ZeroLife);
    }
    if card.cost < Decimal::ZERO || card.annual_cash_flow < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if card.user_gain < Decimal::ZERO {
        return Err(ValidationError::NegativeUsers);
    }
    Ok(())
}

/// Validate player state. Cash is allowed to be negative (transient event
/// penalties); users and debt are not.
pub fn validate_player(player: &Player) -> Result<(), ValidationError> {
    if player.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if player.users < Decimal::ZERO {
        return Err(ValidationError::NegativeUsers);
    }
    if player.debt < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}
