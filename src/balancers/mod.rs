use crate::models::{AssignmentTable, RackTopology};
use crate::BalancerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Core trait for topic balancers
pub trait Balancer: Send + Sync {
    /// Name of this balancer, as accepted by configuration
    fn name(&self) -> &str;

    /// Compute a new assignment for one topic.
    ///
    /// `topic` is used for diagnostics only. The input table is never
    /// mutated; the result has the same partition key set as `current`.
    /// On error the caller must leave the topic untouched.
    fn balance(
        &self,
        topic: &str,
        broker_count: u32,
        racks: &RackTopology,
        current: &AssignmentTable,
    ) -> Result<AssignmentTable, BalancerError>;
}

// Module declarations
mod round_robin;
mod smart_balance;

// Re-exports
pub use round_robin::RoundRobinBalancer;
pub use smart_balance::SmartBalanceBalancer;

/// The closed set of balancing strategies, selected once from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalancerStrategy {
    #[default]
    RoundRobin,
    SmartBalance,
}

impl BalancerStrategy {
    pub const ROUND_ROBIN: &'static str = "round-robin";
    pub const SMART_BALANCE: &'static str = "smart-balance";

    pub fn as_str(&self) -> &'static str {
        match self {
            BalancerStrategy::RoundRobin => Self::ROUND_ROBIN,
            BalancerStrategy::SmartBalance => Self::SMART_BALANCE,
        }
    }

    /// Resolve a configured name, falling back to round-robin when the name
    /// is missing or unknown
    pub fn from_name_or_default(name: Option<&str>) -> Self {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Self::default(),
            Some(name) => name.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    algorithm = name,
                    "unrecognized balancer algorithm, using {}",
                    Self::default()
                );
                Self::default()
            }),
        }
    }
}

impl fmt::Display for BalancerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown balancer algorithm '{0}', expected 'round-robin' or 'smart-balance'")]
pub struct UnknownStrategy(pub String);

impl FromStr for BalancerStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            Self::ROUND_ROBIN => Ok(BalancerStrategy::RoundRobin),
            Self::SMART_BALANCE => Ok(BalancerStrategy::SmartBalance),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl Balancer for BalancerStrategy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn balance(
        &self,
        topic: &str,
        broker_count: u32,
        racks: &RackTopology,
        current: &AssignmentTable,
    ) -> Result<AssignmentTable, BalancerError> {
        match self {
            BalancerStrategy::RoundRobin => {
                RoundRobinBalancer.balance(topic, broker_count, racks, current)
            }
            BalancerStrategy::SmartBalance => {
                SmartBalanceBalancer.balance(topic, broker_count, racks, current)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("round-robin".parse::<BalancerStrategy>(), Ok(BalancerStrategy::RoundRobin));
        assert_eq!("Smart-Balance".parse::<BalancerStrategy>(), Ok(BalancerStrategy::SmartBalance));
        assert!("random".parse::<BalancerStrategy>().is_err());
    }

    #[test]
    fn test_strategy_default_fallback() {
        assert_eq!(BalancerStrategy::from_name_or_default(None), BalancerStrategy::RoundRobin);
        assert_eq!(BalancerStrategy::from_name_or_default(Some("")), BalancerStrategy::RoundRobin);
        assert_eq!(
            BalancerStrategy::from_name_or_default(Some("least-loaded")),
            BalancerStrategy::RoundRobin
        );
        assert_eq!(
            BalancerStrategy::from_name_or_default(Some("smart-balance")),
            BalancerStrategy::SmartBalance
        );
    }

    #[test]
    fn test_strategy_display_round_trips_name() {
        for strategy in [BalancerStrategy::RoundRobin, BalancerStrategy::SmartBalance] {
            assert_eq!(strategy.to_string().parse::<BalancerStrategy>(), Ok(strategy));
            assert_eq!(strategy.name(), strategy.as_str());
        }
    }

    #[test]
    fn test_balancer_names_match_strategy_names() {
        assert_eq!(RoundRobinBalancer.name(), BalancerStrategy::ROUND_ROBIN);
        assert_eq!(SmartBalanceBalancer.name(), BalancerStrategy::SMART_BALANCE);
    }

    #[test]
    fn test_strategy_dispatch() {
        let current = AssignmentTable::from_iter([(0, vec![0]), (1, vec![0])]);
        let result = BalancerStrategy::RoundRobin
            .balance("t", 3, &RackTopology::new(), &current)
            .unwrap();
        assert_eq!(result.get(1), Some(&vec![1]));

        let err = BalancerStrategy::SmartBalance
            .balance("t", 3, &RackTopology::new(), &current)
            .unwrap_err();
        assert!(matches!(err, BalancerError::UnsupportedTopology(_)));
    }
}
