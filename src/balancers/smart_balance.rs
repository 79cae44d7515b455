use crate::models::{AssignmentTable, BrokerId, PartitionId, RackId, RackTopology};
use crate::BalancerError;
use super::{Balancer, BalancerStrategy};
use std::collections::BTreeMap;

/// Number of racks the smart balancer places replicas across
pub const REQUIRED_RACK_COUNT: usize = 3;

/// Replication factor every balanced partition must have
pub const REQUIRED_REPLICATION_FACTOR: usize = 3;

/// Rebalances leaders towards the per-broker average while keeping every
/// partition rack compliant.
///
/// The algorithm is a single greedy pass over partitions in ascending ID:
///
/// 1. The target is `partitions / brokers` leaders per broker (floor).
/// 2. Leader counts are recomputed from the table before each partition, so
///    moves made earlier in the pass are visible.
/// 3. A partition whose leader holds more than the target moves its
///    leadership to the broker with the fewest leaders, unless the two
///    differ by at most one.
/// 4. After a move the followers are placed in the other two racks, each on
///    the rack's broker with the fewest follower replicas for this topic.
///
/// Ties always go to the lowest broker ID. A final check rejects the result
/// if any partition has two replicas in one rack.
///
/// Leader counts end within one of each other and a second pass over the
/// result changes nothing. Follower counts are only balanced greedily: with
/// many partitions per broker they can spread by 3 or 4 (6 brokers and 30
/// partitions ends at 4), so no bound is guaranteed for them.
///
/// Broker IDs are assumed to be `0..broker_count`, racks are addressed by
/// their position in ascending rack-ID order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartBalanceBalancer;

impl Balancer for SmartBalanceBalancer {
    fn name(&self) -> &str {
        BalancerStrategy::SMART_BALANCE
    }

    fn balance(
        &self,
        topic: &str,
        broker_count: u32,
        racks: &RackTopology,
        current: &AssignmentTable,
    ) -> Result<AssignmentTable, BalancerError> {
        validate_preconditions(broker_count, racks, current)?;

        let mut assignments = current.clone();
        let avg_leaders = assignments.len() / broker_count as usize;
        tracing::info!(
            topic,
            partitions = assignments.len(),
            broker_count,
            avg_leaders,
            "smart-balancing topic"
        );

        let partition_ids: Vec<PartitionId> = assignments.partition_ids().collect();
        for partition in partition_ids {
            rebalance_partition(partition, avg_leaders, broker_count, racks, &mut assignments)?;
        }

        verify_rack_compliance(racks, &assignments)?;

        tracing::debug!(topic, ?assignments, "final assignments");
        Ok(assignments)
    }
}

fn validate_preconditions(
    broker_count: u32,
    racks: &RackTopology,
    assignments: &AssignmentTable,
) -> Result<(), BalancerError> {
    if racks.rack_count() != REQUIRED_RACK_COUNT {
        return Err(BalancerError::UnsupportedTopology(format!(
            "expected {} racks, found {}",
            REQUIRED_RACK_COUNT,
            racks.rack_count()
        )));
    }

    if broker_count == 0 {
        return Err(BalancerError::InvalidBrokerCount(broker_count));
    }

    if broker_count as usize % REQUIRED_RACK_COUNT != 0 {
        return Err(BalancerError::UnsupportedTopology(format!(
            "expected broker count to be a multiple of {}, found {}",
            REQUIRED_RACK_COUNT, broker_count
        )));
    }

    if let Some((partition, factor)) = assignments
        .partitions_without_replication_factor(REQUIRED_REPLICATION_FACTOR)
        .first()
    {
        return Err(BalancerError::UnsupportedTopology(format!(
            "expected replication factor {}, partition {} has {}",
            REQUIRED_REPLICATION_FACTOR, partition, factor
        )));
    }

    racks.validate_complete(broker_count)
}

fn rebalance_partition(
    partition: PartitionId,
    avg_leaders: usize,
    broker_count: u32,
    racks: &RackTopology,
    assignments: &mut AssignmentTable,
) -> Result<(), BalancerError> {
    let leader_counts = assignments.leader_counts(broker_count);
    let Some(leader) = assignments.leader(partition) else {
        return Ok(());
    };

    let leader_load = leader_counts.get(&leader).copied().unwrap_or(0);
    if leader_load <= avg_leaders {
        tracing::trace!(partition, leader, leader_load, "leader within average, skipping");
        return Ok(());
    }

    let Some((target, target_load)) = least_loaded(&leader_counts, 0..broker_count) else {
        return Ok(());
    };

    if leader_load.saturating_sub(target_load) <= 1 {
        tracing::trace!(
            partition,
            leader,
            target,
            "leader count difference is at most one, skipping"
        );
        return Ok(());
    }

    let leader_rack = racks.rack_of(target)?;
    let leader_rack_index = racks
        .rack_index(leader_rack)
        .ok_or(BalancerError::BrokerNotInAnyRack { broker: target })?;

    set_replica(assignments, partition, 0, target);

    for slot in 1..REQUIRED_REPLICATION_FACTOR {
        let rack = follower_rack(racks, leader_rack_index, slot)?;
        let follower_counts = assignments.follower_counts(broker_count);
        let Some((follower, _)) = least_loaded(&follower_counts, racks.brokers_in(rack)) else {
            return Err(BalancerError::IncompleteRackTopology(format!(
                "rack {} has no brokers",
                rack
            )));
        };
        set_replica(assignments, partition, slot, follower);
    }

    tracing::debug!(
        partition,
        from = leader,
        to = target,
        replicas = ?assignments.get(partition),
        "moved partition leadership"
    );
    Ok(())
}

/// Rack for follower `slot`: `(leader_rack + slot) mod 3`
fn follower_rack(
    racks: &RackTopology,
    leader_rack_index: usize,
    slot: usize,
) -> Result<RackId, BalancerError> {
    let index = (leader_rack_index + slot) % REQUIRED_RACK_COUNT;
    racks.rack_at(index).ok_or_else(|| {
        BalancerError::UnsupportedTopology(format!("no rack at position {}", index))
    })
}

/// Broker with the lowest count among `candidates`; lowest ID wins ties
fn least_loaded(
    counts: &BTreeMap<BrokerId, usize>,
    candidates: impl IntoIterator<Item = BrokerId>,
) -> Option<(BrokerId, usize)> {
    candidates
        .into_iter()
        .map(|broker| (broker, counts.get(&broker).copied().unwrap_or(0)))
        .min_by_key(|(broker, count)| (*count, *broker))
}

fn set_replica(assignments: &mut AssignmentTable, partition: PartitionId, slot: usize, broker: BrokerId) {
    if let Some(replica) = assignments
        .get_mut(partition)
        .and_then(|replicas| replicas.get_mut(slot))
    {
        *replica = broker;
    }
}

/// Fail if any partition has two or more replicas in the same rack
fn verify_rack_compliance(
    racks: &RackTopology,
    assignments: &AssignmentTable,
) -> Result<(), BalancerError> {
    for (partition, replicas) in assignments.iter() {
        let mut seen: Vec<RackId> = Vec::with_capacity(replicas.len());
        for broker in replicas {
            let rack = racks.rack_of(*broker)?;
            if seen.contains(&rack) {
                tracing::warn!(partition, ?replicas, "partition is not rack compliant");
                return Err(BalancerError::RackComplianceViolation {
                    partition,
                    replicas: replicas.clone(),
                });
            }
            seen.push(rack);
        }
    }
    Ok(())
}
