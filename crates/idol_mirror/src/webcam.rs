use std::sync::Arc;

use bytes::Bytes;
use idol_api::{CaptureError, CaptureSource, Frame};
use parking_lot::Mutex;
use v4l::buffer::Type;
use v4l::io::mmap;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Format, FourCC};

const CAPTURE_WIDTH: u32 = 640;
const CAPTURE_HEIGHT: u32 = 480;

/// A V4L2 webcam. Frames are read on their own thread and only the newest
/// one is kept.
pub struct V4lCapture {
    latest: Arc<Mutex<Option<Frame>>>,
}

impl V4lCapture {
    fn capture_thread(
        device: v4l::Device, format: Format, latest: Arc<Mutex<Option<Frame>>>,
    ) -> std::io::Result<()> {
        let mut stream = mmap::Stream::with_buffers(&device, Type::VideoCapture, 4)?;

        loop {
            let (buffer, _metadata) = CaptureStream::next(&mut stream)?;
            let frame = Frame {
                width: format.width,
                height: format.height,
                payload: Bytes::copy_from_slice(buffer),
            };
            *latest.lock() = Some(frame);
        }
    }

    pub fn open(index: usize) -> Result<V4lCapture, CaptureError> {
        let fourcc = FourCC::new(b"YUYV");
        let device = v4l::Device::new(index)
            .map_err(|err| CaptureError::Unavailable(format!("/dev/video{}: {}", index, err)))?;
        let format = device.set_format(&Format::new(CAPTURE_WIDTH, CAPTURE_HEIGHT, fourcc))?;
        if format.fourcc != fourcc {
            return Err(CaptureError::UnsupportedFormat(format!(
                "camera doesn't support {}x{} {}", CAPTURE_WIDTH, CAPTURE_HEIGHT, fourcc,
            )));
        }

        tracing::info!("Webcam w={} h={} format={}", format.width, format.height, format.fourcc);

        let latest = Arc::new(Mutex::new(None));
        let latest_clone = latest.clone();
        std::thread::spawn(move || {
            if let Err(err) = Self::capture_thread(device, format, latest_clone) {
                tracing::error!("webcam error: {}", err);
            }
        });

        Ok(V4lCapture {
            latest,
        })
    }
}

impl CaptureSource for V4lCapture {
    fn latest_frame(&self) -> Option<Frame> {
        self.latest.lock().clone()
    }
}

/// No camera at all; every poll gets an empty frame.
pub struct BlankCapture;

impl CaptureSource for BlankCapture {
    fn latest_frame(&self) -> Option<Frame> {
        Some(Frame::blank())
    }
}
