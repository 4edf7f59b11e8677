use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::render::render_resource::{Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages};
use bevy::render::view::RenderLayers;
use bevy_vrm::{VrmPlugin, VrmSystems};
use clap::Parser;
use idol_api::CaptureSource;
use idol_motion::{DetectionLoop, SharedLandmarks, SharedSignal};

use crate::animate::{AvatarCamera, RenderState, Signal};
use crate::avatar::{AvatarSource, AvatarStatus};
use crate::overlay::{LandmarkGizmos, Landmarks};
use crate::tracking::ReplayDetector;
use crate::webcam::{BlankCapture, V4lCapture};

mod animate;
mod avatar;
mod overlay;
mod tracking;
mod webcam;

const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 768;

/// Layer the avatar and helpers live on.
const SCENE_LAYER: usize = 0;
const GIZMO_LAYER: usize = 1;
const DISPLAY_LAYER: usize = 2;

const GRID_SIZE: f32 = 10.;
const AXIS_LENGTH: f32 = 5.;

#[derive(Parser, Resource)]
struct Options {
    /// Avatar to show, relative to the asset directory.
    #[arg(long, default_value = "three-vrm-girl.vrm")]
    pub avatar: String,
    #[arg(long, default_value = "resource")]
    pub asset_dir: String,
    /// Directory holding the face model weights.
    #[arg(long, default_value = "./weights")]
    pub weights: PathBuf,
    /// Webcam to read, as in `/dev/videoN`. Without one, frames are blank.
    #[arg(long, short = 'c')]
    pub camera_index: Option<usize>,
    /// Recorded faces to replay, one JSON face per line.
    #[arg(long, short = 'f', default_value = "faces.jsonl")]
    pub faces: PathBuf,
}

fn background() -> Color {
    Color::srgb_u8(0xee, 0xee, 0xee)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let options = Options::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let capture: Box<dyn CaptureSource> = match options.camera_index {
        Some(index) => Box::new(V4lCapture::open(index)?),
        None => {
            tracing::warn!("no camera selected, tracking blank frames");
            Box::new(BlankCapture)
        }
    };
    let detector = ReplayDetector::from_file(&options.faces)?;

    let signal = SharedSignal::new();
    let landmarks = SharedLandmarks::new();
    let mut detection = DetectionLoop::new(detector, capture, signal.clone())
        .with_landmarks(landmarks.clone());
    let weights = options.weights.clone();
    runtime.spawn(async move {
        if let Err(err) = detection.load_models(&weights) {
            tracing::error!("failed to load face models: {}", err);
        }
        detection.run().await;
    });

    let mut app = App::new();
    app
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "idol mirror".to_string(),
                    resolution: (WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32).into(),
                    resizable: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: options.asset_dir.clone(),
                ..default()
            })
            .disable::<LogPlugin>())
        .add_plugins(VrmPlugin)
        .init_gizmo_group::<LandmarkGizmos>()
        .insert_resource(ClearColor(background()))
        .insert_resource(Signal(signal))
        .insert_resource(Landmarks(landmarks))
        .insert_resource(AvatarSource(options.avatar.clone()))
        .init_resource::<RenderState>()
        .init_resource::<AvatarStatus>()
        .insert_resource(options)
        .add_systems(Startup, (
            init,
            avatar::load_avatar,
        ))
        .add_systems(Update, (
            avatar::track_avatar_load,
            avatar::on_avatar_ready.after(VrmSystems::Resolve),
            (animate::debug_keys, animate::animate)
                .chain()
                .after(avatar::on_avatar_ready)
                .before(VrmSystems::ApplyPose),
            draw_helpers,
            overlay::draw_landmarks,
        ));

    app.run();

    // The detection task never finishes on its own.
    runtime.shutdown_background();
    Ok(())
}

fn init(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut gizmo_store: ResMut<GizmoConfigStore>,
) {
    let (gizmos, _) = gizmo_store.config_mut::<DefaultGizmoConfigGroup>();
    gizmos.render_layers = RenderLayers::layer(GIZMO_LAYER);
    let (overlay, _) = gizmo_store.config_mut::<LandmarkGizmos>();
    overlay.render_layers = RenderLayers::layer(DISPLAY_LAYER);

    // The avatar is painted offscreen so a skipped frame keeps the last
    // picture instead of a cleared window.
    let size = Extent3d {
        width: WINDOW_WIDTH,
        height: WINDOW_HEIGHT,
        ..default()
    };
    let mut canvas = Image {
        texture_descriptor: TextureDescriptor {
            label: Some("Avatar Canvas"),
            size,
            dimension: TextureDimension::D2,
            format: TextureFormat::Bgra8UnormSrgb,
            mip_level_count: 1,
            sample_count: 1,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST
                | TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        },
        ..default()
    };
    canvas.resize(size);
    let canvas = images.add(canvas);

    commands.spawn(DirectionalLightBundle {
        transform: Transform::from_xyz(0., 100., 30.)
            .looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn((
        Camera3dBundle {
            camera: Camera {
                order: -1,
                target: RenderTarget::Image(canvas.clone()),
                clear_color: ClearColorConfig::Custom(background()),
                ..default()
            },
            projection: Projection::Perspective(PerspectiveProjection {
                fov: 30f32.to_radians(),
                near: 0.1,
                far: 20.0,
                ..default()
            }),
            transform: Transform::from_xyz(0., 1.35, 1.2),
            ..default()
        },
        RenderLayers::from_layers(&[SCENE_LAYER, GIZMO_LAYER]),
        AvatarCamera,
    ));

    commands.spawn((
        Camera2dBundle::default(),
        RenderLayers::layer(DISPLAY_LAYER),
    ));
    commands.spawn((
        SpriteBundle {
            texture: canvas,
            ..default()
        },
        RenderLayers::layer(DISPLAY_LAYER),
    ));
}

/// Ground grid (10×10, one unit cells) and XYZ axes.
fn helper_lines() -> Vec<(Vec3, Vec3, Color)> {
    let grid = Color::srgb(0.6, 0.6, 0.6);
    let half = GRID_SIZE / 2.;
    let mut lines: Vec<(Vec3, Vec3, Color)> = (0..=GRID_SIZE as u32)
        .flat_map(|i| {
            let offset = i as f32 - half;
            [
                (Vec3::new(offset, 0., -half), Vec3::new(offset, 0., half), grid),
                (Vec3::new(-half, 0., offset), Vec3::new(half, 0., offset), grid),
            ]
        })
        .collect();

    lines.push((Vec3::ZERO, Vec3::X * AXIS_LENGTH, Color::srgb(1., 0., 0.)));
    lines.push((Vec3::ZERO, Vec3::Y * AXIS_LENGTH, Color::srgb(0., 1., 0.)));
    lines.push((Vec3::ZERO, Vec3::Z * AXIS_LENGTH, Color::srgb(0., 0., 1.)));
    lines
}

fn draw_helpers(mut gizmos: Gizmos) {
    for (start, end, color) in helper_lines() {
        gizmos.line(start, end, color);
    }
}
