use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::{AssignmentTable, RackTopology, TopicName};

/// Logical view of a cluster as fetched by the admin client.
///
/// Holds only assignment data: broker count, racks and the current replica
/// assignment of every topic. Broker IDs are expected to be `0..broker_count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub broker_count: u32,
    #[serde(default)]
    pub racks: RackTopology,
    #[serde(default)]
    pub topics: BTreeMap<TopicName, AssignmentTable>,
}

impl ClusterSnapshot {
    pub fn new(broker_count: u32, racks: RackTopology) -> Self {
        Self {
            broker_count,
            racks,
            topics: BTreeMap::new(),
        }
    }

    pub fn add_topic(&mut self, name: impl Into<TopicName>, assignments: AssignmentTable) {
        self.topics.insert(name.into(), assignments);
    }

    pub fn get_topic(&self, name: &str) -> Option<&AssignmentTable> {
        self.topics.get(name)
    }

    pub fn partition_count(&self) -> usize {
        self.topics.values().map(|t| t.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "broker_count": 6,
        "racks": {"0": [0, 3], "1": [1, 4], "2": [2, 5]},
        "topics": {
            "orders": {"0": [0, 1, 2], "1": [1, 2, 0]},
            "payments": {"0": [3, 4, 5]}
        }
    }"#;

    #[test]
    fn test_snapshot_from_json() {
        let snapshot: ClusterSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.broker_count, 6);
        assert_eq!(snapshot.racks.rack_count(), 3);
        assert_eq!(snapshot.partition_count(), 3);
        assert_eq!(snapshot.get_topic("orders").unwrap().leader(1), Some(1));
    }

    #[test]
    fn test_racks_and_topics_default_to_empty() {
        let snapshot: ClusterSnapshot = serde_json::from_str(r#"{"broker_count": 3}"#).unwrap();
        assert!(snapshot.racks.is_empty());
        assert!(snapshot.topics.is_empty());
    }
}
