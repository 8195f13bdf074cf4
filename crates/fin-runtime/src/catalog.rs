//! Fixed card catalogs: projects, financing options, events.

use fin_core::{FinancingKind, FinancingOption, ProjectCard, RiskLevel};
use rust_decimal::Decimal;

fn card(
    name: &str,
    cost: i64,
    life: u32,
    cash_flow: i64,
    category: &str,
    risk: RiskLevel,
    user_gain_tenths: i64,
) -> ProjectCard {
    ProjectCard {
        name: name.to_string(),
        cost: Decimal::new(cost, 0),
        life,
        annual_cash_flow: Decimal::new(cash_flow, 0),
        category: category.to_string(),
        risk_level: risk,
        user_gain: Decimal::new(user_gain_tenths, 1),
    }
}

/// The eight project cards dealt onto Investment tiles.
pub fn default_projects() -> Vec<ProjectCard> {
    vec![
        card("Expand to Asia Market", 50, 3, 20, "Expand", RiskLevel::High, 20),
        card("Referral Program", 20, 3, 12, "Scale", RiskLevel::Low, 15),
        card("Retail Partnership", 40, 3, 18, "User Trust", RiskLevel::High, 18),
        card("AI Fraud Prevention", 30, 3, 15, "Efficiency Gain", RiskLevel::Medium, 10),
        card("Product Launch", 35, 2, 25, "Rebrand", RiskLevel::Medium, 25),
        card("Mobile App Redesign", 25, 2, 15, "User Experience", RiskLevel::Low, 12),
        card("Blockchain Integration", 45, 3, 17, "Security", RiskLevel::High, 15),
        card("Customer Support AI", 30, 2, 18, "Efficiency", RiskLevel::Medium, 8),
    ]
}

/// The four financing options offered on Financing tiles.
pub fn financing_catalog() -> Vec<FinancingOption> {
    vec![
        FinancingOption {
            kind: FinancingKind::Debt,
            description: "Loan at 6% annual interest".to_string(),
            max_amount: Decimal::new(50, 0),
            conditions: "Max $50M per round".to_string(),
        },
        FinancingOption {
            kind: FinancingKind::VcFunding,
            description: "Raise $40M but lose 10% NPV".to_string(),
            max_amount: Decimal::new(40, 0),
            conditions: "Once per game".to_string(),
        },
        FinancingOption {
            kind: FinancingKind::Equity,
            description: "Raise capital but dilute 20% NPV".to_string(),
            max_amount: Decimal::new(60, 0),
            conditions: "Once per round".to_string(),
        },
        FinancingOption {
            kind: FinancingKind::Ipo,
            description: "Raise $100M but lose 30% of final NPV".to_string(),
            max_amount: Decimal::new(100, 0),
            conditions: "Only in Round 4 or 5".to_string(),
        },
    ]
}
