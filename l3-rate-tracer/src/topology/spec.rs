pub struct TopologySpec {
    pub nodes: Vec<NodeSpec>,
}

pub struct NodeSpec {
    pub name: String,
    pub faces: Vec<FaceSpec>,
}

pub struct FaceSpec {
    pub id: u32,
    pub description: String,
}
