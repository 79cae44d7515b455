use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::{BrokerId, PartitionId, ReplicaList};

/// Partition to replica-list mapping for a single topic.
///
/// Iteration is always in ascending partition ID, which is the processing
/// order of every balancer and the row order of the submission matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentTable {
    partitions: BTreeMap<PartitionId, ReplicaList>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, partition: PartitionId, replicas: ReplicaList) -> Option<ReplicaList> {
        self.partitions.insert(partition, replicas)
    }

    pub fn get(&self, partition: PartitionId) -> Option<&ReplicaList> {
        self.partitions.get(&partition)
    }

    pub fn get_mut(&mut self, partition: PartitionId) -> Option<&mut ReplicaList> {
        self.partitions.get_mut(&partition)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partition_ids(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.partitions.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartitionId, &ReplicaList)> + '_ {
        self.partitions.iter().map(|(id, replicas)| (*id, replicas))
    }

    /// Leader of a partition, if it has any replica at all
    pub fn leader(&self, partition: PartitionId) -> Option<BrokerId> {
        self.get(partition).and_then(|replicas| replicas.first().copied())
    }

    /// Count leaders held by each broker.
    ///
    /// Every broker in `[0, broker_count)` gets an entry, even with zero
    /// leaders. Brokers outside that range appear only if they lead something.
    pub fn leader_counts(&self, broker_count: u32) -> BTreeMap<BrokerId, usize> {
        let mut counts: BTreeMap<BrokerId, usize> = (0..broker_count).map(|b| (b, 0)).collect();
        for replicas in self.partitions.values() {
            if let Some(leader) = replicas.first() {
                *counts.entry(*leader).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Count follower replicas (every position after the leader) per broker
    pub fn follower_counts(&self, broker_count: u32) -> BTreeMap<BrokerId, usize> {
        let mut counts: BTreeMap<BrokerId, usize> = (0..broker_count).map(|b| (b, 0)).collect();
        for replicas in self.partitions.values() {
            for follower in replicas.iter().skip(1) {
                *counts.entry(*follower).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Partitions whose replication factor differs from `expected`
    pub fn partitions_without_replication_factor(&self, expected: usize) -> Vec<(PartitionId, usize)> {
        self.iter()
            .filter(|(_, replicas)| replicas.len() != expected)
            .map(|(id, replicas)| (id, replicas.len()))
            .collect()
    }
}

impl FromIterator<(PartitionId, ReplicaList)> for AssignmentTable {
    fn from_iter<I: IntoIterator<Item = (PartitionId, ReplicaList)>>(iter: I) -> Self {
        Self {
            partitions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AssignmentTable {
    type Item = (PartitionId, ReplicaList);
    type IntoIter = std::collections::btree_map::IntoIter<PartitionId, ReplicaList>;

    fn into_iter(self) -> Self::IntoIter {
        self.partitions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AssignmentTable {
        AssignmentTable::from_iter([
            (2, vec![1, 2, 0]),
            (0, vec![0, 1, 2]),
            (1, vec![0, 2, 1]),
        ])
    }

    #[test]
    fn test_iteration_is_ascending_by_partition() {
        let ids: Vec<PartitionId> = table().partition_ids().collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_leader_counts_include_idle_brokers() {
        let counts = table().leader_counts(4);
        assert_eq!(counts.get(&0), Some(&2));
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(counts.get(&2), Some(&0));
        assert_eq!(counts.get(&3), Some(&0));
    }

    #[test]
    fn test_leader_counts_track_out_of_range_brokers() {
        let table = AssignmentTable::from_iter([(0, vec![9, 0, 1])]);
        let counts = table.leader_counts(3);
        assert_eq!(counts.get(&9), Some(&1));
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_follower_counts() {
        let counts = table().follower_counts(3);
        assert_eq!(counts.get(&0), Some(&1));
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&3));
    }

    #[test]
    fn test_replication_factor_mismatches() {
        let mut table = table();
        table.insert(3, vec![0, 1]);
        assert_eq!(table.partitions_without_replication_factor(3), vec![(3, 2)]);
    }

    #[test]
    fn test_json_shape() {
        let table = AssignmentTable::from_iter([(0, vec![0, 1, 2])]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"0":[0,1,2]}"#);

        let parsed: AssignmentTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
