use crate::mapper::AnimationMapper;
use crate::rig::AvatarRig;
use crate::signal::SharedSignal;
use crate::tuning::RENDER_SKIP_INTERVAL;

/// Draws two frames out of every three.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameThrottle {
    frame: u64,
}

impl FrameThrottle {
    /// Count a frame and report whether it should be drawn.
    pub fn tick(&mut self) -> bool {
        self.frame += 1;
        self.frame % RENDER_SKIP_INTERVAL != 0
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTick {
    pub frame: u64,
    pub draw: bool,
}

/// One iteration per display refresh: map the signal onto the avatar (if
/// there is one yet), then decide whether this frame gets painted.
#[derive(Debug, Default)]
pub struct RenderLoop {
    throttle: FrameThrottle,
    mapper: AnimationMapper,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mapper(&self) -> &AnimationMapper {
        &self.mapper
    }

    pub fn tick<R: AvatarRig + ?Sized>(
        &mut self,
        signal: &SharedSignal,
        rig: Option<&mut R>,
        dt: f32,
    ) -> RenderTick {
        let draw = self.throttle.tick();
        if let Some(rig) = rig {
            signal.update(|signal| self.mapper.apply(signal, rig, dt));
        }

        RenderTick {
            frame: self.throttle.frame(),
            draw,
        }
    }
}
