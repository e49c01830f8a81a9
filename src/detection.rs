use nalgebra::Point2;

/// Represents the detection of a tag in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
	/// The decoded ID of the tag
	pub id: u32,

	/// The corners of the tag in image pixel coordinates. These always
	/// wrap counter-clockwise around the tag, starting at the corner the
	/// pose estimator treats as `(-s, s)`.
	pub corners: [Point2<f64>; 4],

	/// The center of the detection in image pixel coordinates.
	pub center: Point2<f64>,
}

impl Detection {
	pub fn new(id: u32, corners: [Point2<f64>; 4], center: Point2<f64>) -> Self {
		Self { id, corners, center }
	}

	/// Edges of the quad, closing back to the first corner
	pub fn edges(&self) -> [(Point2<f64>, Point2<f64>); 4] {
		let c = &self.corners;
		[(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
	}
}

impl AsRef<Detection> for Detection {
	fn as_ref(&self) -> &Detection {
		self
	}
}

/// Sort by tag id, keeping detector order between equal ids
pub fn sort_by_id<M: AsRef<Detection>>(markers: &mut [M]) {
	markers.sort_by_key(|marker| marker.as_ref().id);
}

#[cfg(test)]
mod test {
	use nalgebra::Point2;

	use super::{sort_by_id, Detection};

	fn square(id: u32, x: f64, y: f64) -> Detection {
		Detection::new(id, [
			Point2::new(x, y + 1.),
			Point2::new(x + 1., y + 1.),
			Point2::new(x + 1., y),
			Point2::new(x, y),
		], Point2::new(x + 0.5, y + 0.5))
	}

	#[test]
	fn edges_close_the_loop() {
		let det = square(0, 0., 0.);
		let edges = det.edges();
		assert_eq!(edges[0].0, det.corners[0]);
		assert_eq!(edges[3].1, det.corners[0]);
		for i in 0..4 {
			assert_eq!(edges[i].1, edges[(i + 1) % 4].0);
		}
	}

	#[test]
	fn sort_is_stable() {
		let mut dets = vec![square(5, 0., 0.), square(2, 0., 0.), square(5, 9., 9.)];
		sort_by_id(&mut dets);
		let ids = dets.iter().map(|d| d.id).collect::<Vec<_>>();
		assert_eq!(ids, vec![2, 5, 5]);
		assert_eq!(dets[1].center, Point2::new(0.5, 0.5));
		assert_eq!(dets[2].center, Point2::new(9.5, 9.5));
	}
}
