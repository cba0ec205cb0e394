//! Strategy: an ordered list of rules.
//!
//! Rule order matters: within a side, the first rule whose condition holds
//! wins the bar.

use crate::domain::indicator::IndicatorType;
use crate::domain::rule::{Rule, Side};

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Strategy {
    /// Rules for one side, in declared order.
    pub fn rules_for(&self, side: Side) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.action.side == side)
    }

    /// Every distinct indicator referenced by any condition, in first-reference
    /// order.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        let mut seen = Vec::new();
        for ind in self.rules.iter().flat_map(|r| r.condition.indicators()) {
            if !seen.contains(&ind) {
                seen.push(ind);
            }
        }
        seen
    }

    /// The distinct SMA/EMA configurations, for chart overlays.
    pub fn moving_averages(&self) -> Vec<IndicatorType> {
        self.indicators()
            .into_iter()
            .filter(IndicatorType::is_moving_average)
            .collect()
    }
}
