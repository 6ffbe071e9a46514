pub mod common;
pub mod community;
pub mod pathfinding;
pub mod centrality;

pub use common::{GraphView, NodeId};
pub use community::{connected_components, ComponentsResult};
pub use pathfinding::{bfs_distances, diameter, eccentricity};
pub use centrality::{betweenness_centrality, BetweennessConfig};
