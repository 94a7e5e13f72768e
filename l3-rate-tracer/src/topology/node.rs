use crate::topology::face::{Face, FaceId};
use std::sync::Arc;

#[derive(Debug)]
pub struct Node {
    pub(crate) id: u32,
    pub(crate) name: Arc<str>,
    pub(crate) faces: Vec<Face>,
}

impl Node {
    pub fn new(id: u32, name: impl Into<Arc<str>>, faces: Vec<Face>) -> Self {
        Self {
            id,
            name: name.into(),
            faces,
        }
    }

    /// The node's position in its topology
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id() == id)
    }
}
