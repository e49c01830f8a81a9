use std::time::Duration;

use log::debug;
use opencv::{
	core::Mat,
	highgui,
	imgproc::{cvt_color_def, COLOR_BGR2GRAY, COLOR_BGRA2GRAY},
	prelude::*,
	videoio::{VideoCapture, CAP_ANY},
};

use crate::{pipeline::{FrameSink, FrameSource}, DemoError, FrameError, GrayImage};

pub const WINDOW_NAME: &str = "Tag Detections";

/// Frames from a local video capture device
pub struct CameraSource {
	cap: VideoCapture,
	/// Scratch buffer for the grayscale conversion
	gray: Mat,
}

impl CameraSource {
	pub fn open(camera: i32) -> Result<Self, DemoError> {
		let cap = VideoCapture::new(camera, CAP_ANY)
			.map_err(|_| DemoError::SourceUnavailable { camera })?;
		if !cap.is_opened()? {
			return Err(DemoError::SourceUnavailable { camera });
		}
		Ok(Self {
			cap,
			gray: Mat::default(),
		})
	}
}

impl FrameSource for CameraSource {
	type Frame = Mat;

	fn read_frame(&mut self) -> Result<Mat, FrameError> {
		let mut frame = Mat::default();
		let ok = self.cap.read(&mut frame)
			.map_err(|e| FrameError::Capture(e.to_string()))?;
		if !ok || frame.empty() {
			return Err(FrameError::EmptyFrame);
		}
		Ok(frame)
	}

	fn to_gray(&mut self, frame: &Mat) -> Result<GrayImage, FrameError> {
		mat_to_gray(frame, &mut self.gray)
	}
}

/// Copy an 8-bit gray, BGR or BGRA frame into a [GrayImage].
///
/// `scratch` holds the converted frame for color input.
pub fn mat_to_gray(frame: &Mat, scratch: &mut Mat) -> Result<GrayImage, FrameError> {
	let code = match frame.channels() {
		1 => None,
		3 => Some(COLOR_BGR2GRAY),
		4 => Some(COLOR_BGRA2GRAY),
		n => return Err(FrameError::Capture(format!("unsupported frame with {n} channels"))),
	};
	let gray = match code {
		None => frame,
		Some(code) => {
			cvt_color_def(frame, scratch, code)
				.map_err(|e| FrameError::Capture(e.to_string()))?;
			&*scratch
		},
	};

	let mut im = GrayImage::zeroed(gray.cols() as usize, gray.rows() as usize);
	for y in 0..im.height() {
		let src = gray.at_row::<u8>(y as i32)
			.map_err(|e| FrameError::Capture(e.to_string()))?;
		im.row_mut(y).copy_from_slice(src);
	}
	Ok(im)
}

/// HighGUI window that shows annotated frames and reports key presses
pub struct HighGuiWindow {
	name: &'static str,
}

impl HighGuiWindow {
	pub fn new(name: &'static str) -> Result<Self, DemoError> {
		highgui::named_window(name, highgui::WINDOW_AUTOSIZE)
			.map_err(|e| DemoError::Display(e.to_string()))?;
		Ok(Self { name })
	}
}

impl FrameSink<Mat> for HighGuiWindow {
	fn show(&mut self, frame: &Mat) -> Result<(), DemoError> {
		highgui::imshow(self.name, frame)
			.map_err(|e| DemoError::Display(e.to_string()))
	}

	fn poll_key(&mut self, delay: Duration) -> Result<Option<char>, DemoError> {
		// wait_key(0) blocks forever
		let delay_ms = (delay.as_millis() as i32).max(1);
		let key = highgui::wait_key(delay_ms)
			.map_err(|e| DemoError::Display(e.to_string()))?;
		if key < 0 {
			return Ok(None);
		}
		Ok(Some(char::from((key & 0xff) as u8)))
	}
}

impl Drop for HighGuiWindow {
	fn drop(&mut self) {
		if let Err(e) = highgui::destroy_window(self.name) {
			debug!("Failed to close window {}: {e}", self.name);
		}
	}
}

#[cfg(test)]
mod test {
	use opencv::core::{Mat, Scalar, CV_8UC1, CV_8UC2, CV_8UC3, CV_8UC4};

	use super::mat_to_gray;
	use crate::FrameError;

	fn solid(typ: i32, value: f64) -> Mat {
		Mat::new_rows_cols_with_default(3, 5, typ, Scalar::all(value)).unwrap()
	}

	fn assert_uniform(frame: &Mat, value: u8) {
		let im = mat_to_gray(frame, &mut Mat::default()).unwrap();
		assert_eq!((im.width(), im.height()), (5, 3));
		assert!(im.rows().all(|row| row.iter().all(|&px| px == value)));
	}

	#[test]
	fn gray_passes_through() {
		assert_uniform(&solid(CV_8UC1, 42.), 42);
	}

	#[test]
	fn bgr_is_converted() {
		assert_uniform(&solid(CV_8UC3, 100.), 100);
	}

	#[test]
	fn bgra_is_converted() {
		assert_uniform(&solid(CV_8UC4, 100.), 100);
	}

	#[test]
	fn scratch_is_reused() {
		let mut scratch = Mat::default();
		mat_to_gray(&solid(CV_8UC3, 10.), &mut scratch).unwrap();
		let im = mat_to_gray(&solid(CV_8UC4, 200.), &mut scratch).unwrap();
		assert_eq!(im.row(2)[4], 200);
	}

	#[test]
	fn two_channels_rejected() {
		let err = mat_to_gray(&solid(CV_8UC2, 0.), &mut Mat::default()).unwrap_err();
		assert!(matches!(err, FrameError::Capture(_)));
	}
}
