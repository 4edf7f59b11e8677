use bevy::prelude::*;
use bevy_vrm::AvatarPose;
use idol_motion::tuning::DEBUG_JOY_WEIGHT;
use idol_motion::{AvatarRig, BlendShapePreset, RenderLoop, SharedSignal};

/// The detection loop's latest output.
#[derive(Resource, Clone)]
pub struct Signal(pub SharedSignal);

#[derive(Resource, Default)]
pub struct RenderState(pub RenderLoop);

/// Camera that paints the avatar. Deactivating it skips a paint but leaves
/// the previous picture on screen.
#[derive(Component)]
pub struct AvatarCamera;

pub fn animate(
    time: Res<Time>,
    signal: Res<Signal>,
    mut state: ResMut<RenderState>,
    mut poses: Query<&mut AvatarPose>,
    mut cameras: Query<&mut Camera, With<AvatarCamera>>,
) {
    let mut pose = poses.get_single_mut().ok();
    let rig = pose.as_mut().map(|pose| &mut pose.0);
    let tick = state.0.tick(&signal.0, rig, time.delta_seconds());

    for mut camera in &mut cameras {
        if camera.is_active != tick.draw {
            camera.is_active = tick.draw;
        }
    }
}

pub fn debug_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut poses: Query<&mut AvatarPose>,
) {
    let Ok(mut pose) = poses.get_single_mut() else {
        return;
    };

    if keys.just_pressed(KeyCode::KeyW) {
        pose.set_blend_shape(BlendShapePreset::Joy, DEBUG_JOY_WEIGHT);
    }
    if keys.just_pressed(KeyCode::KeyE) {
        pose.set_blend_shape(BlendShapePreset::Joy, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use idol_motion::HumanoidBone;

    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<RenderState>()
            .insert_resource(Signal(SharedSignal::new()))
            .add_systems(Update, animate);
        app
    }

    fn camera_states(app: &mut App, camera: Entity, frames: usize) -> Vec<bool> {
        (0..frames)
            .map(|_| {
                app.update();
                app.world().get::<Camera>(camera).unwrap().is_active
            })
            .collect()
    }

    #[test]
    fn test_avatar_camera_paints_two_of_three() {
        let mut app = app();
        let camera = app.world_mut().spawn((Camera::default(), AvatarCamera)).id();

        let states = camera_states(&mut app, camera, 6);
        assert_eq!(states, [true, true, false, true, true, false]);
    }

    #[test]
    fn test_avatar_is_posed_while_camera_toggles() {
        let mut app = app();
        app.world().resource::<Signal>().0.update(|signal| signal.lip_dist = Some(35.0));
        let camera = app.world_mut().spawn((Camera::default(), AvatarCamera)).id();
        let avatar = app.world_mut().spawn(AvatarPose::default()).id();

        let states = camera_states(&mut app, camera, 3);
        assert_eq!(states, [true, true, false]);

        let pose = app.world().get::<AvatarPose>(avatar).unwrap();
        assert_eq!(pose.revision(), 3);
        assert_eq!(pose.blend_shape(BlendShapePreset::A), 1.0);
        assert!(pose.bone_rotation(HumanoidBone::LeftUpperArm).is_some());
    }

    #[test]
    fn test_debug_keys_set_joy() {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, debug_keys);
        let avatar = app.world_mut().spawn(AvatarPose::default()).id();

        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::KeyW);
        app.update();
        assert_eq!(app.world().get::<AvatarPose>(avatar).unwrap().blend_shape(BlendShapePreset::Joy), DEBUG_JOY_WEIGHT);

        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.press(KeyCode::KeyE);
        app.update();
        assert_eq!(app.world().get::<AvatarPose>(avatar).unwrap().blend_shape(BlendShapePreset::Joy), 0.0);
    }
}
