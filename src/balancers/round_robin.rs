use crate::models::{AssignmentTable, BrokerId, RackTopology, ReplicaList};
use crate::BalancerError;
use super::{Balancer, BalancerStrategy};

/// Spreads replicas by position arithmetic, ignoring racks and current placement.
///
/// Partitions are numbered by their position in ascending partition-ID
/// order, and replica `i` of the `p`-th partition goes to broker
/// `(p + i) mod broker_count`. Broker IDs are assumed to be `0..broker_count`.
///
/// Every topic starts from broker 0, so when many topics are balanced this
/// way low-numbered brokers collect more replicas than high-numbered ones.
/// That bias is part of the algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinBalancer;

impl Balancer for RoundRobinBalancer {
    fn name(&self) -> &str {
        BalancerStrategy::ROUND_ROBIN
    }

    fn balance(
        &self,
        topic: &str,
        broker_count: u32,
        _racks: &RackTopology,
        current: &AssignmentTable,
    ) -> Result<AssignmentTable, BalancerError> {
        if broker_count == 0 {
            return Err(BalancerError::InvalidBrokerCount(broker_count));
        }

        let balanced: AssignmentTable = current
            .iter()
            .enumerate()
            .map(|(position, (partition, replicas))| {
                (partition, positional_replicas(position, replicas.len(), broker_count))
            })
            .collect();

        tracing::debug!(
            topic,
            partitions = balanced.len(),
            broker_count,
            "round-robin assignment computed"
        );
        Ok(balanced)
    }
}

fn positional_replicas(position: usize, replication_factor: usize, broker_count: u32) -> ReplicaList {
    let brokers = broker_count as u64;
    (0..replication_factor)
        .map(|replica| ((position as u64 + replica as u64) % brokers) as BrokerId)
        .collect()
}
