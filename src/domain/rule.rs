//! Rule data structures.
//!
//! A rule pairs one [`Condition`] with one [`Action`]:
//! - `Condition`: left indicator, comparison operator, right operand and an
//!   optional percentage offset applied to the right operand
//! - `RightOperand`: a literal value or another indicator
//! - `Action`: buy or sell a whole number of units

use std::fmt;

use crate::domain::indicator::IndicatorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl Operator {
    /// Apply the comparison. `Eq` is exact floating equality.
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            Operator::Gt => left > right,
            Operator::Lt => left < right,
            Operator::Ge => left >= right,
            Operator::Le => left <= right,
            Operator::Eq => left == right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            "==" => Some(Operator::Eq),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RightOperand {
    Value(f64),
    Indicator(IndicatorType),
}

impl fmt::Display for RightOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RightOperand::Value(v) => write!(f, "{}", v),
            RightOperand::Indicator(ind) => write!(f, "{}", ind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: IndicatorType,
    pub operator: Operator,
    pub right: RightOperand,
    /// Percentage applied to the right operand as `right * (1 + pct/100)`.
    pub offset_pct: Option<f64>,
}

impl Condition {
    /// Every indicator the condition reads, left first.
    pub fn indicators(&self) -> impl Iterator<Item = IndicatorType> {
        let right = match self.right {
            RightOperand::Indicator(ind) => Some(ind),
            RightOperand::Value(_) => None,
        };
        std::iter::once(self.left).chain(right)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)?;
        match self.offset_pct {
            Some(pct) if pct > 0.0 => write!(f, " +{}%", pct),
            Some(pct) if pct < 0.0 => write!(f, " {}%", pct),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub side: Side,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub condition: Condition,
    pub action: Action,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = if self.action.quantity == 1 { "unit" } else { "units" };
        write!(
            f,
            "if {}, {} {} {}",
            self.condition, self.action.side, self.action.quantity, unit
        )
    }
}
