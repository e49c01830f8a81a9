/// Single-channel 8-bit intensity image, rows packed back to back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
	width: usize,
	height: usize,
	buf: Vec<u8>,
}

impl GrayImage {
	/// Create a black image
	pub fn zeroed(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			buf: vec![0; width * height],
		}
	}

	pub const fn width(&self) -> usize {
		self.width
	}

	pub const fn height(&self) -> usize {
		self.height
	}

	pub fn row(&self, y: usize) -> &[u8] {
		assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
		let start = y * self.width;
		&self.buf[start..start + self.width]
	}

	pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
		assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
		let start = y * self.width;
		&mut self.buf[start..start + self.width]
	}

	pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
		self.buf.chunks_exact(self.width.max(1)).take(self.height)
	}
}

#[cfg(test)]
mod test {
	use super::GrayImage;

	#[test]
	fn rows_in_order() {
		let mut img = GrayImage::zeroed(3, 2);
		img.row_mut(0).copy_from_slice(&[1, 2, 3]);
		img.row_mut(1).copy_from_slice(&[4, 5, 6]);
		let rows = img.rows().collect::<Vec<_>>();
		assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
	}

	#[test]
	fn empty_image_has_no_rows() {
		assert_eq!(GrayImage::zeroed(0, 4).rows().count(), 0);
		assert_eq!(GrayImage::zeroed(4, 0).rows().count(), 0);
	}

	#[test]
	#[should_panic]
	fn row_past_height() {
		let img = GrayImage::zeroed(2, 2);
		let _ = img.row(2);
	}
}
