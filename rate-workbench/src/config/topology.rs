use l3_rate_tracer::topology::spec::{FaceSpec, NodeSpec, TopologySpec};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct TopologyJson {
    nodes: Vec<NodeJson>,
}

#[derive(Deserialize, Clone)]
struct NodeJson {
    name: String,
    faces: Vec<FaceJson>,
}

#[derive(Deserialize, Clone)]
struct FaceJson {
    id: u32,
    /// Human-readable face description, e.g. `netdev://[00:00:00:00:00:01]`
    #[serde(default)]
    description: String,
}

impl From<TopologyJson> for TopologySpec {
    fn from(json: TopologyJson) -> Self {
        let nodes = json
            .nodes
            .into_iter()
            .map(|n| NodeSpec {
                name: n.name,
                faces: n
                    .faces
                    .into_iter()
                    .map(|f| FaceSpec {
                        id: f.id,
                        description: f.description,
                    })
                    .collect(),
            })
            .collect();

        Self { nodes }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use l3_rate_tracer::{FaceId, Topology};

    #[test]
    fn test_parse_topology() {
        let json = r#"{
            "nodes": [
                { "name": "consumer", "faces": [{ "id": 1, "description": "netdev://a" }] },
                { "name": "producer", "faces": [{ "id": 1 }, { "id": 2 }] }
            ]
        }"#;
        let topology: TopologyJson = serde_json::from_str(json).unwrap();
        let topology = Topology::from_spec(topology.into()).unwrap();

        assert_eq!(topology.len(), 2);
        let consumer = topology.node("consumer").unwrap();
        assert_eq!(consumer.face(FaceId(1)).unwrap().description(), "netdev://a");
        assert_eq!(topology.node("producer").unwrap().faces().len(), 2);
    }
}
