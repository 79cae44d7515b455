use serde::{Deserialize, Serialize};
use crate::models::{AssignmentTable, PartitionId, ReplicaList};

/// Positional form of an [`AssignmentTable`] for APIs that take a replica matrix.
///
/// Row `i` of `replicas` belongs to `partitions[i]`. Rows are always in
/// ascending partition ID, so the pairing can be rebuilt from the table alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentMatrix {
    pub partitions: Vec<PartitionId>,
    pub replicas: Vec<ReplicaList>,
}

impl AssignmentMatrix {
    pub fn from_table(table: &AssignmentTable) -> Self {
        let (partitions, replicas) = table
            .iter()
            .map(|(partition, replicas)| (partition, replicas.clone()))
            .unzip();
        Self { partitions, replicas }
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Partition ID of a matrix row
    pub fn partition_at(&self, row: usize) -> Option<PartitionId> {
        self.partitions.get(row).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartitionId, &ReplicaList)> + '_ {
        self.partitions.iter().copied().zip(self.replicas.iter())
    }

    /// Drop partition IDs, keeping only the rows
    pub fn into_rows(self) -> Vec<ReplicaList> {
        self.replicas
    }

    pub fn to_table(&self) -> AssignmentTable {
        self.iter()
            .map(|(partition, replicas)| (partition, replicas.clone()))
            .collect()
    }
}

impl From<&AssignmentTable> for AssignmentMatrix {
    fn from(table: &AssignmentTable) -> Self {
        Self::from_table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_ascending_partition_ids() {
        let table = AssignmentTable::from_iter([
            (7, vec![1, 2, 0]),
            (0, vec![0, 1, 2]),
            (3, vec![2, 0, 1]),
        ]);
        let matrix = AssignmentMatrix::from_table(&table);

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.partitions, vec![0, 3, 7]);
        assert_eq!(matrix.partition_at(2), Some(7));
        assert_eq!(matrix.partition_at(3), None);
        assert_eq!(matrix.to_table(), table);
        assert_eq!(
            matrix.into_rows(),
            vec![vec![0, 1, 2], vec![2, 0, 1], vec![1, 2, 0]]
        );
    }

    #[test]
    fn test_empty_table() {
        let matrix = AssignmentMatrix::from(&AssignmentTable::new());
        assert!(matrix.is_empty());
        assert!(matrix.to_table().is_empty());
    }
}
