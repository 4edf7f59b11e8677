use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HumanBoneJson {
    pub bone: String,
    pub node: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanoidJson {
    pub human_bones: Vec<HumanBoneJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlendShapeBindJson {
    pub mesh: u32,
    pub index: u32,
    /// 0 to 100.
    pub weight: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendShapeGroupJson {
    pub name: String,
    #[serde(default)]
    pub preset_name: String,
    #[serde(default)]
    pub binds: Vec<BlendShapeBindJson>,
    #[serde(default)]
    pub is_binary: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendShapeMasterJson {
    #[serde(default)]
    pub blend_shape_groups: Vec<BlendShapeGroupJson>,
}

/// The VRM 0.x root extension.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VrmExtensionJson {
    #[serde(default)]
    pub exporter_version: Option<String>,
    #[serde(default)]
    pub spec_version: Option<String>,
    pub humanoid: HumanoidJson,
    #[serde(default)]
    pub blend_shape_master: BlendShapeMasterJson,
}
