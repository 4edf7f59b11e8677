use serde::{Deserialize, Serialize};

pub mod vrm;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootExtensions {
    #[serde(rename = "VRM")]
    pub vrm: vrm::VrmExtensionJson,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mesh: Option<u32>,
}

/// The parts of the glTF root that VRM metadata refers into.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtendedRoot {
    pub extensions: RootExtensions,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
}
