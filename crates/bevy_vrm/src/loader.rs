use bevy::asset::io::Reader;
use bevy::asset::{Asset, AssetLoader, AsyncReadExt, Handle, LoadContext};
use bevy::gltf::{GltfLoader, GltfLoaderSettings};
use bevy::prelude::{FromWorld, World};
use bevy::reflect::TypePath;
use bevy::render::renderer::RenderDevice;
use bevy::render::texture::CompressedImageFormats;
use bevy::scene::Scene;
use bevy::tasks::futures_lite::io::Cursor;
use bevy::utils::ConditionalSendFuture;

use crate::meta::{VrmError, VrmMeta};

/// A loaded VRM: the glTF scenes plus the humanoid layout needed to drive them.
#[derive(Asset, TypePath, Debug)]
pub struct Vrm {
    pub scenes: Vec<Handle<Scene>>,
    pub meta: VrmMeta,
}

/// Loads `.vrm` files. Meshes, materials and scenes go through bevy's own glTF
/// loader; this only adds the VRM extension on top.
pub struct VrmLoader {
    gltf: GltfLoader,
}

impl FromWorld for VrmLoader {
    fn from_world(world: &mut World) -> Self {
        let supported_compressed_formats = match world.get_resource::<RenderDevice>() {
            Some(device) => CompressedImageFormats::from_features(device.features()),
            None => CompressedImageFormats::NONE,
        };
        Self {
            gltf: GltfLoader {
                supported_compressed_formats,
                custom_vertex_attributes: Default::default(),
            },
        }
    }
}

impl AssetLoader for VrmLoader {
    type Asset = Vrm;
    type Settings = ();
    type Error = VrmError;

    fn load<'a>(
        &'a self,
        reader: &'a mut Reader,
        _settings: &'a Self::Settings,
        load_context: &'a mut LoadContext,
    ) -> impl ConditionalSendFuture<Output=Result<Self::Asset, Self::Error>> {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;

            let meta = VrmMeta::from_slice(&bytes)?;
            tracing::debug!(
                "VRM {} has {} humanoid bones, {} blend shape presets",
                load_context.path().display(),
                meta.bones.len(),
                meta.blend_shapes.len(),
            );

            let mut gltf_reader = Cursor::new(bytes.as_slice());
            let gltf = self.gltf
                .load(&mut gltf_reader, &GltfLoaderSettings::default(), load_context)
                .await?;

            Ok(Vrm {
                scenes: gltf.scenes,
                meta,
            })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["vrm"]
    }
}
