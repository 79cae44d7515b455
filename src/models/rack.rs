use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use super::{BrokerId, RackId};
use crate::BalancerError;

/// Rack ID to broker set mapping, as supplied by the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RackTopology {
    racks: BTreeMap<RackId, BTreeSet<BrokerId>>,
}

impl RackTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_broker(&mut self, rack: RackId, broker: BrokerId) {
        self.racks.entry(rack).or_default().insert(broker);
    }

    pub fn rack_count(&self) -> usize {
        self.racks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.racks.is_empty()
    }

    /// Brokers of a rack in ascending ID order
    pub fn brokers_in(&self, rack: RackId) -> impl Iterator<Item = BrokerId> + '_ {
        self.racks.get(&rack).into_iter().flatten().copied()
    }

    /// Rack holding the given broker. Lowest rack ID wins if a broker is
    /// listed twice, which `validate_complete` rejects.
    pub fn rack_of(&self, broker: BrokerId) -> Result<RackId, BalancerError> {
        self.racks
            .iter()
            .find(|(_, brokers)| brokers.contains(&broker))
            .map(|(rack, _)| *rack)
            .ok_or(BalancerError::BrokerNotInAnyRack { broker })
    }

    /// Position of a rack in ascending rack-ID order.
    ///
    /// Rack IDs need not be `0..n`; placement arithmetic works on this index.
    pub fn rack_index(&self, rack: RackId) -> Option<usize> {
        self.racks.keys().position(|id| *id == rack)
    }

    /// Rack at a given position in ascending rack-ID order
    pub fn rack_at(&self, index: usize) -> Option<RackId> {
        self.racks.keys().nth(index).copied()
    }

    /// Check that every broker in `[0, broker_count)` sits in exactly one rack,
    /// that no rack is empty and that racks list no broker outside that range.
    pub fn validate_complete(&self, broker_count: u32) -> Result<(), BalancerError> {
        if let Some((rack, _)) = self.racks.iter().find(|(_, brokers)| brokers.is_empty()) {
            return Err(BalancerError::IncompleteRackTopology(format!(
                "rack {} has no brokers",
                rack
            )));
        }

        for (rack, brokers) in &self.racks {
            if let Some(broker) = brokers.range(broker_count..).next() {
                return Err(BalancerError::IncompleteRackTopology(format!(
                    "rack {} lists broker {} but the cluster has {} brokers",
                    rack, broker, broker_count
                )));
            }
        }

        for broker in 0..broker_count {
            let holders: Vec<RackId> = self
                .racks
                .iter()
                .filter(|(_, brokers)| brokers.contains(&broker))
                .map(|(rack, _)| *rack)
                .collect();

            match holders.len() {
                1 => {}
                0 => {
                    return Err(BalancerError::IncompleteRackTopology(format!(
                        "broker {} is not in any rack",
                        broker
                    )))
                }
                _ => {
                    return Err(BalancerError::IncompleteRackTopology(format!(
                        "broker {} is listed in racks {:?}",
                        broker, holders
                    )))
                }
            }
        }

        Ok(())
    }
}

impl FromIterator<(RackId, Vec<BrokerId>)> for RackTopology {
    fn from_iter<I: IntoIterator<Item = (RackId, Vec<BrokerId>)>>(iter: I) -> Self {
        let mut topology = Self::new();
        for (rack, brokers) in iter {
            let entry = topology.racks.entry(rack).or_default();
            entry.extend(brokers);
        }
        topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> RackTopology {
        RackTopology::from_iter([(0, vec![0, 3]), (1, vec![1, 4]), (2, vec![2, 5])])
    }

    #[test]
    fn test_rack_of() {
        let racks = topology();
        assert_eq!(racks.rack_of(4).unwrap(), 1);
        assert!(matches!(
            racks.rack_of(7),
            Err(BalancerError::BrokerNotInAnyRack { broker: 7 })
        ));
    }

    #[test]
    fn test_rack_index_with_sparse_ids() {
        let racks = RackTopology::from_iter([(10, vec![0]), (20, vec![1]), (30, vec![2])]);
        assert_eq!(racks.rack_index(20), Some(1));
        assert_eq!(racks.rack_at(2), Some(30));
        assert_eq!(racks.rack_index(5), None);
    }

    #[test]
    fn test_brokers_in_sorted() {
        let racks = RackTopology::from_iter([(0, vec![6, 0, 3])]);
        let brokers: Vec<BrokerId> = racks.brokers_in(0).collect();
        assert_eq!(brokers, vec![0, 3, 6]);
        assert_eq!(racks.brokers_in(1).count(), 0);
    }

    #[test]
    fn test_validate_complete() {
        assert!(topology().validate_complete(6).is_ok());
        assert!(matches!(
            topology().validate_complete(7),
            Err(BalancerError::IncompleteRackTopology(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_and_empty_racks() {
        let duplicated = RackTopology::from_iter([(0, vec![0, 1]), (1, vec![1]), (2, vec![2])]);
        assert!(duplicated.validate_complete(3).is_err());

        let empty = RackTopology::from_iter([(0, vec![0, 1, 2]), (1, vec![]), (2, vec![])]);
        assert!(empty.validate_complete(3).is_err());
    }

    #[test]
    fn test_validate_rejects_brokers_outside_cluster() {
        let racks = RackTopology::from_iter([(0, vec![0]), (1, vec![1, 7]), (2, vec![2])]);
        assert!(matches!(
            racks.validate_complete(3),
            Err(BalancerError::IncompleteRackTopology(_))
        ));
        assert!(racks.validate_complete(8).is_err());
    }
}
