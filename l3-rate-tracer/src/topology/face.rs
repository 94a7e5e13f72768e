use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Numeric face identifier, unique within a node
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u32);

impl Display for FaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A network attachment point of a node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    id: FaceId,
    description: Arc<str>,
}

impl Face {
    pub fn new(id: FaceId, description: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }

    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description, self.id)
    }
}
