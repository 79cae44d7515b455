// Kafka Replica Balancer Library
// Computes replica reassignment plans for Kafka topics

pub mod models;
pub mod balancers;
pub mod matrix;
pub mod plan;
pub mod rebalancer;
pub mod config;

pub use models::{AssignmentTable, BrokerId, ClusterSnapshot, PartitionId, RackId, RackTopology};
pub use balancers::{Balancer, BalancerStrategy, RoundRobinBalancer, SmartBalanceBalancer};
pub use matrix::AssignmentMatrix;
pub use plan::{KafkaReassignment, PartitionChange, PlanSummary, ReassignmentPlan, TopicOutcome};
pub use rebalancer::Rebalancer;
pub use config::Config;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalancerError {
    #[error("Invalid broker count: {0}")]
    InvalidBrokerCount(u32),

    #[error("Unsupported topology: {0}")]
    UnsupportedTopology(String),

    #[error("Broker {broker} not found in any rack")]
    BrokerNotInAnyRack { broker: BrokerId },

    #[error("Incomplete rack topology: {0}")]
    IncompleteRackTopology(String),

    #[error("Rack compliance not met for partition {partition}: {replicas:?}")]
    RackComplianceViolation {
        partition: PartitionId,
        replicas: Vec<BrokerId>,
    },
}
