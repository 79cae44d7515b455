use crate::balancers::{Balancer, BalancerStrategy};
use crate::models::{AssignmentTable, ClusterSnapshot};
use crate::plan::{PlanMetadata, ReassignmentPlan, TopicOutcome};

/// Runs one balancing strategy over every topic of a snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct Rebalancer {
    strategy: BalancerStrategy,
}

impl Rebalancer {
    pub fn new(strategy: BalancerStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> BalancerStrategy {
        self.strategy
    }

    /// Balance every topic in ascending name order.
    ///
    /// A topic whose balancer fails is recorded as skipped and left as it is
    /// in the cluster; the remaining topics are still attempted.
    pub fn rebalance(&self, snapshot: &ClusterSnapshot) -> ReassignmentPlan {
        let mut plan = ReassignmentPlan::new(PlanMetadata::new(self.strategy, snapshot.broker_count));

        tracing::info!(
            strategy = %self.strategy,
            broker_count = snapshot.broker_count,
            topics = snapshot.topics.len(),
            "starting balancing run"
        );

        for (topic, current) in &snapshot.topics {
            let outcome = self.balance_topic(topic, snapshot, current);
            plan.record(topic.clone(), outcome);
        }

        tracing::info!(summary = %plan.summary(), "balancing run finished");
        plan
    }

    fn balance_topic(
        &self,
        topic: &str,
        snapshot: &ClusterSnapshot,
        current: &AssignmentTable,
    ) -> TopicOutcome {
        tracing::debug!(topic, assignments = ?current, "balancing topic");

        match self
            .strategy
            .balance(topic, snapshot.broker_count, &snapshot.racks, current)
        {
            Ok(proposed) => {
                let outcome = TopicOutcome::from_assignments(topic, current, proposed);
                match &outcome {
                    TopicOutcome::Balanced { changes, .. } => {
                        for change in changes {
                            tracing::debug!(
                                topic,
                                brokers = ?change.affected_brokers(),
                                "{}",
                                change.description()
                            );
                        }
                        tracing::info!(topic, changes = changes.len(), "topic balanced")
                    }
                    _ => tracing::info!(topic, "topic already balanced"),
                }
                outcome
            }
            Err(err) => {
                tracing::warn!(topic, error = %err, "error balancing topic, skipping it");
                TopicOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RackTopology;

    fn snapshot() -> ClusterSnapshot {
        let racks = RackTopology::from_iter([(0, vec![0, 3]), (1, vec![1, 4]), (2, vec![2, 5])]);
        let mut snapshot = ClusterSnapshot::new(6, racks);
        snapshot.add_topic("orders", (0..12).map(|p| (p, vec![0, 1, 2])).collect());
        snapshot.add_topic("audit", AssignmentTable::from_iter([(0, vec![0, 1])]));
        snapshot.add_topic(
            "balanced",
            AssignmentTable::from_iter([
                (0, vec![0, 1, 2]),
                (1, vec![1, 2, 3]),
                (2, vec![2, 3, 4]),
            ]),
        );
        snapshot
    }

    #[test]
    fn test_failed_topic_does_not_abort_batch() {
        let plan = Rebalancer::new(BalancerStrategy::SmartBalance).rebalance(&snapshot());

        assert_eq!(plan.topics.len(), 3);
        assert!(plan.topics["audit"].is_skipped());
        assert!(matches!(plan.topics["orders"], TopicOutcome::Balanced { .. }));
        assert!(matches!(plan.topics["balanced"], TopicOutcome::Unchanged));

        let summary = plan.summary();
        assert_eq!(summary.balanced_topics, 1);
        assert_eq!(summary.skipped_topics, 1);
        assert_eq!(summary.unchanged_topics, 1);
        assert_eq!(summary.changed_partitions, 10);
        assert_eq!(summary.leader_moves, 10);
    }

    #[test]
    fn test_round_robin_run() {
        let plan = Rebalancer::default().rebalance(&snapshot());

        assert_eq!(plan.metadata.strategy, BalancerStrategy::RoundRobin);
        assert_eq!(plan.summary().skipped_topics, 0);
        assert!(matches!(plan.topics["balanced"], TopicOutcome::Unchanged));
        match &plan.topics["audit"] {
            TopicOutcome::Unchanged => {}
            other => panic!("unexpected outcome for audit: {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_is_left_untouched() {
        let snapshot = snapshot();
        let before = snapshot.get_topic("orders").cloned();
        Rebalancer::new(BalancerStrategy::SmartBalance).rebalance(&snapshot);
        assert_eq!(snapshot.get_topic("orders").cloned(), before);
    }

    #[test]
    fn test_empty_snapshot() {
        let plan = Rebalancer::default().rebalance(&ClusterSnapshot::default());
        assert!(plan.topics.is_empty());
        assert!(plan.is_empty());
    }
}
