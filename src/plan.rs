use crate::balancers::BalancerStrategy;
use crate::matrix::AssignmentMatrix;
use crate::models::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single partition's difference between current and proposed assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionChange {
    /// Same replica set, new leader
    ElectLeader {
        topic: TopicName,
        partition: PartitionId,
        previous_leader: BrokerId,
        new_leader: BrokerId,
    },

    /// Same replica set and leader, followers in a different order
    ReorderFollowers {
        topic: TopicName,
        partition: PartitionId,
        replicas: ReplicaList,
    },

    /// Replica set changes; data has to be copied to the added brokers
    MoveReplicas {
        topic: TopicName,
        partition: PartitionId,
        from: ReplicaList,
        to: ReplicaList,
    },
}

impl PartitionChange {
    /// Compare two replica lists of one partition
    pub fn between(
        topic: &str,
        partition: PartitionId,
        current: &[BrokerId],
        proposed: &[BrokerId],
    ) -> Option<Self> {
        if current == proposed {
            return None;
        }

        let current_set: BTreeSet<&BrokerId> = current.iter().collect();
        let proposed_set: BTreeSet<&BrokerId> = proposed.iter().collect();
        let change = if current_set != proposed_set || current.len() != proposed.len() {
            PartitionChange::MoveReplicas {
                topic: topic.to_string(),
                partition,
                from: current.to_vec(),
                to: proposed.to_vec(),
            }
        } else {
            match (current.first(), proposed.first()) {
                (Some(previous), Some(new)) if previous != new => PartitionChange::ElectLeader {
                    topic: topic.to_string(),
                    partition,
                    previous_leader: *previous,
                    new_leader: *new,
                },
                _ => PartitionChange::ReorderFollowers {
                    topic: topic.to_string(),
                    partition,
                    replicas: proposed.to_vec(),
                },
            }
        };
        Some(change)
    }

    pub fn partition(&self) -> PartitionId {
        match self {
            PartitionChange::ElectLeader { partition, .. }
            | PartitionChange::ReorderFollowers { partition, .. }
            | PartitionChange::MoveReplicas { partition, .. } => *partition,
        }
    }

    pub fn moves_leader(&self) -> bool {
        match self {
            PartitionChange::ElectLeader { .. } => true,
            PartitionChange::ReorderFollowers { .. } => false,
            PartitionChange::MoveReplicas { from, to, .. } => from.first() != to.first(),
        }
    }

    /// Number of replicas that land on a broker not previously hosting the partition
    pub fn added_replicas(&self) -> usize {
        match self {
            PartitionChange::MoveReplicas { from, to, .. } => {
                to.iter().filter(|broker| !from.contains(broker)).count()
            }
            _ => 0,
        }
    }

    /// Get the brokers affected by this change
    pub fn affected_brokers(&self) -> Vec<BrokerId> {
        match self {
            PartitionChange::ElectLeader {
                previous_leader,
                new_leader,
                ..
            } => vec![*previous_leader, *new_leader],
            PartitionChange::ReorderFollowers { replicas, .. } => {
                replicas.iter().skip(1).copied().collect()
            }
            PartitionChange::MoveReplicas { from, to, .. } => {
                let brokers: BTreeSet<BrokerId> = from.iter().chain(to.iter()).copied().collect();
                brokers.into_iter().collect()
            }
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            PartitionChange::ElectLeader {
                topic,
                partition,
                previous_leader,
                new_leader,
            } => format!(
                "Move leadership of {}/{} from broker {} to {}",
                topic, partition, previous_leader, new_leader
            ),
            PartitionChange::ReorderFollowers {
                topic,
                partition,
                replicas,
            } => format!("Reorder followers of {}/{} to {:?}", topic, partition, replicas),
            PartitionChange::MoveReplicas {
                topic,
                partition,
                from,
                to,
            } => format!("Reassign {}/{} from {:?} to {:?}", topic, partition, from, to),
        }
    }
}

/// What happened to one topic during a balancing run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicOutcome {
    Balanced {
        assignments: AssignmentTable,
        changes: Vec<PartitionChange>,
    },
    Unchanged,
    Skipped {
        reason: String,
    },
}

impl TopicOutcome {
    /// Build the outcome for a successfully balanced topic
    pub fn from_assignments(topic: &str, current: &AssignmentTable, proposed: AssignmentTable) -> Self {
        let changes: Vec<PartitionChange> = proposed
            .iter()
            .filter_map(|(partition, replicas)| {
                let before = current.get(partition).map(Vec::as_slice).unwrap_or(&[]);
                PartitionChange::between(topic, partition, before, replicas)
            })
            .collect();

        if changes.is_empty() {
            TopicOutcome::Unchanged
        } else {
            TopicOutcome::Balanced {
                assignments: proposed,
                changes,
            }
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TopicOutcome::Skipped { .. })
    }
}

/// Per-topic results of a balancing run, ready for submission
#[derive(Debug, Clone, Serialize)]
pub struct ReassignmentPlan {
    pub topics: BTreeMap<TopicName, TopicOutcome>,
    pub metadata: PlanMetadata,
}

impl ReassignmentPlan {
    pub fn new(metadata: PlanMetadata) -> Self {
        Self {
            topics: BTreeMap::new(),
            metadata,
        }
    }

    pub fn record(&mut self, topic: impl Into<TopicName>, outcome: TopicOutcome) {
        self.topics.insert(topic.into(), outcome);
    }

    /// Check if this plan changes nothing
    pub fn is_empty(&self) -> bool {
        self.changes().next().is_none()
    }

    pub fn changes(&self) -> impl Iterator<Item = &PartitionChange> + '_ {
        self.topics.values().flat_map(|outcome| match outcome {
            TopicOutcome::Balanced { changes, .. } => changes.as_slice(),
            _ => &[][..],
        })
    }

    /// Replica matrices to submit, one per balanced topic
    pub fn submissions(&self) -> Vec<(&str, AssignmentMatrix)> {
        self.topics
            .iter()
            .filter_map(|(topic, outcome)| match outcome {
                TopicOutcome::Balanced { assignments, .. } => {
                    Some((topic.as_str(), AssignmentMatrix::from_table(assignments)))
                }
                _ => None,
            })
            .collect()
    }

    /// Changed partitions in the JSON layout of `kafka-reassign-partitions.sh`
    pub fn to_kafka_reassignment(&self) -> KafkaReassignment {
        let partitions = self
            .topics
            .iter()
            .filter_map(|(topic, outcome)| match outcome {
                TopicOutcome::Balanced {
                    assignments,
                    changes,
                } => Some((topic, assignments, changes)),
                _ => None,
            })
            .flat_map(|(topic, assignments, changes)| {
                changes.iter().filter_map(move |change| {
                    let partition = change.partition();
                    assignments.get(partition).map(|replicas| PartitionReassignment {
                        topic: topic.clone(),
                        partition,
                        replicas: replicas.clone(),
                    })
                })
            })
            .collect();

        KafkaReassignment {
            version: 1,
            partitions,
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();

        for outcome in self.topics.values() {
            match outcome {
                TopicOutcome::Balanced { changes, .. } => {
                    summary.balanced_topics += 1;
                    summary.changed_partitions += changes.len();
                    summary.leader_moves += changes.iter().filter(|c| c.moves_leader()).count();
                    summary.replica_moves += changes.iter().map(|c| c.added_replicas()).sum::<usize>();
                }
                TopicOutcome::Unchanged => summary.unchanged_topics += 1,
                TopicOutcome::Skipped { .. } => summary.skipped_topics += 1,
            }
        }

        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub strategy: BalancerStrategy,
    pub broker_count: u32,
}

impl PlanMetadata {
    pub fn new(strategy: BalancerStrategy, broker_count: u32) -> Self {
        Self {
            created_at: chrono::Utc::now(),
            strategy,
            broker_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaReassignment {
    pub version: u32,
    pub partitions: Vec<PartitionReassignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionReassignment {
    pub topic: TopicName,
    pub partition: PartitionId,
    pub replicas: ReplicaList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub balanced_topics: usize,
    pub unchanged_topics: usize,
    pub skipped_topics: usize,
    pub changed_partitions: usize,
    pub leader_moves: usize,
    pub replica_moves: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Topics balanced: {}, unchanged: {}, skipped: {}, Partitions changed: {}, Leader moves: {}, Replica moves: {}",
            self.balanced_topics,
            self.unchanged_topics,
            self.skipped_topics,
            self.changed_partitions,
            self.leader_moves,
            self.replica_moves
        )
    }
}
