//! Strategy persistence port trait.

use std::path::Path;

use crate::domain::error::RulesimError;
use crate::domain::strategy::Strategy;

pub trait StrategyPort {
    fn load_strategy(&self, path: &Path) -> Result<Strategy, RulesimError>;
    fn save_strategy(&self, strategy: &Strategy, path: &Path) -> Result<(), RulesimError>;
}
