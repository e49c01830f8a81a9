use nalgebra::Point2;
use opencv::{
	core::{Mat, Point, Scalar},
	imgproc::{get_text_size, line, put_text, FONT_HERSHEY_SCRIPT_SIMPLEX, LINE_AA},
};

use crate::{pipeline::Annotator, Detection, FrameError};

/// BGR
type Color = [u8; 3];

const GREEN: Color = [0, 0xff, 0];
const RED: Color = [0, 0, 0xff];
const BLUE: Color = [0xff, 0, 0];
const LABEL: Color = [0xff, 0x99, 0];

/// Colors of [Detection::edges]
const EDGE_COLORS: [Color; 4] = [GREEN, BLUE, BLUE, RED];

fn scalar([b, g, r]: Color) -> Scalar {
	Scalar::new(b as f64, g as f64, r as f64, 0.)
}

fn pixel(p: &Point2<f64>) -> Point {
	Point::new(p.x as i32, p.y as i32)
}

/// Outlines each tag and writes its id on the center
#[derive(Debug, Clone)]
pub struct TagOverlay {
	pub thickness: i32,
	pub font_scale: f64,
}

impl Default for TagOverlay {
	fn default() -> Self {
		Self {
			thickness: 2,
			font_scale: 1.0,
		}
	}
}

impl TagOverlay {
	fn draw(&self, frame: &mut Mat, detection: &Detection) -> opencv::Result<()> {
		for ((a, b), color) in detection.edges().into_iter().zip(EDGE_COLORS) {
			line(frame,
				pixel(&a),
				pixel(&b),
				scalar(color),
				self.thickness,
				LINE_AA,
				0)?;
		}

		let text = detection.id.to_string();
		let mut baseline = 0;
		let textsize = get_text_size(&text, FONT_HERSHEY_SCRIPT_SIMPLEX, self.font_scale, self.thickness, &mut baseline)?;
		let center = pixel(&detection.center);
		put_text(frame,
			&text,
			Point::new(center.x - textsize.width / 2, center.y + textsize.height / 2),
			FONT_HERSHEY_SCRIPT_SIMPLEX,
			self.font_scale,
			scalar(LABEL),
			self.thickness,
			LINE_AA,
			false)
	}
}

impl Annotator<Mat> for TagOverlay {
	fn annotate(&mut self, frame: &mut Mat, detection: &Detection) -> Result<(), FrameError> {
		self.draw(frame, detection)
			.map_err(|e| FrameError::Draw(e.to_string()))
	}
}

#[cfg(test)]
mod test {
	use nalgebra::Point2;
	use opencv::{
		core::{Mat, Scalar, Vec3b, CV_8UC3},
		prelude::*,
	};

	use super::{pixel, TagOverlay, EDGE_COLORS, GREEN, RED};
	use crate::{pipeline::Annotator, Detection};

	fn square() -> Detection {
		let corners = [
			Point2::new(20., 80.),
			Point2::new(80., 80.),
			Point2::new(80., 20.),
			Point2::new(20., 20.),
		];
		Detection::new(7, corners, Point2::new(50., 50.))
	}

	#[test]
	fn bottom_edge_green_left_edge_red() {
		assert_eq!(EDGE_COLORS[0], GREEN);
		assert_eq!(EDGE_COLORS[3], RED);

		let mut frame = Mat::new_rows_cols_with_default(100, 100, CV_8UC3, Scalar::all(0.)).unwrap();
		TagOverlay::default().annotate(&mut frame, &square()).unwrap();

		// Anti-aliasing may soften the exact value
		let [b, g, r] = frame.at_2d::<Vec3b>(80, 50).unwrap().0;
		assert!(g > 200 && b < 50 && r < 50, "bottom edge {:?}", (b, g, r));
		let [b, g, r] = frame.at_2d::<Vec3b>(50, 20).unwrap().0;
		assert!(r > 200 && b < 50 && g < 50, "left edge {:?}", (b, g, r));
	}

	#[test]
	fn pixel_truncates() {
		let p = pixel(&Point2::new(10.9, -0.5));
		assert_eq!((p.x, p.y), (10, 0));
	}
}
