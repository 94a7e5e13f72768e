pub mod face;
pub mod node;
pub mod spec;

pub use face::{Face, FaceId};
pub use node::Node;

use crate::error::TopologyError;
use spec::TopologySpec;
use std::collections::HashSet;
use std::sync::Arc;

/// The set of nodes a simulation runs on
#[derive(Clone, Debug, Default)]
pub struct Topology {
    nodes: Vec<Arc<Node>>,
}

impl Topology {
    pub fn from_spec(spec: TopologySpec) -> Result<Self, TopologyError> {
        let mut node_names = HashSet::new();
        let mut nodes = Vec::with_capacity(spec.nodes.len());
        for (index, node) in spec.nodes.into_iter().enumerate() {
            if !node_names.insert(node.name.clone()) {
                return Err(TopologyError::DuplicateNode(node.name));
            }

            let mut face_ids = HashSet::new();
            let mut faces = Vec::with_capacity(node.faces.len());
            for face in node.faces {
                let id = FaceId(face.id);
                if !face_ids.insert(id) {
                    return Err(TopologyError::DuplicateFace {
                        node: node.name,
                        face: id,
                    });
                }

                faces.push(Face::new(id, face.description));
            }

            nodes.push(Arc::new(Node::new(index as u32, node.name, faces)));
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|n| &*n.name == name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
