// Type aliases used across models
pub type BrokerId = u32;
pub type PartitionId = u32;
pub type RackId = u32;
pub type TopicName = String;

/// Ordered replica list for one partition; index 0 is the leader
pub type ReplicaList = Vec<BrokerId>;

// Module declarations
mod assignment;
mod rack;
mod cluster;

// Re-exports
pub use assignment::AssignmentTable;
pub use rack::RackTopology;
pub use cluster::ClusterSnapshot;
