//! Capture, display and drawing backed by OpenCV.
mod capture;
mod overlay;

pub use capture::{mat_to_gray, CameraSource, HighGuiWindow, WINDOW_NAME};
pub use overlay::TagOverlay;
