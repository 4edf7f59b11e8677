//! Face tracking to avatar animation.
//!
//! The detection side ([`detection`], [`extract`]) and the render side
//! ([`render_loop`], [`mapper`]) never wait on each other. They only share the
//! latest values in a [`SharedSignal`], and a render frame may observe a
//! detection pass that landed at any point before it.

pub mod detection;
pub mod extract;
pub mod geometry;
pub mod mapper;
pub mod render_loop;
pub mod rig;
pub mod signal;
pub mod tuning;

pub use detection::{DetectionLoop, DetectionStep};
pub use extract::{extract, ExtractError, FaceSignals};
pub use mapper::{lip_ratio, AnimationMapper};
pub use render_loop::{FrameThrottle, RenderLoop, RenderTick};
pub use rig::{AvatarRig, Axis, BlendShapePreset, HumanoidBone, PoseRig};
pub use signal::{AnimationSignal, SharedLandmarks, SharedSignal};
