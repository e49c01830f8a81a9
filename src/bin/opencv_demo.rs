use std::{io::Write, process::exit};

use apriltag_demo::{
	apriltag_backend::{AprilTagDetector, AprilTagPoseEstimator},
	opencv_backend::{CameraSource, HighGuiWindow, TagOverlay, WINDOW_NAME},
	Args,
	DemoConfig,
	DemoError,
	Pipeline,
	TagFamily,
};
use clap::Parser;
use log::{error, info};

fn run(config: &DemoConfig) -> Result<(), DemoError> {
	let detector = AprilTagDetector::new(config.family, &config.detector)?;
	let source = CameraSource::open(config.camera)?;
	info!("Opened camera {}", config.camera);
	let sink = HighGuiWindow::new(WINDOW_NAME)?;

	let mut pipeline = Pipeline::new(
		source,
		detector,
		AprilTagPoseEstimator,
		TagOverlay::default(),
		sink,
		config.intrinsics,
		config.options.clone(),
	);
	info!("Detecting {} tags; press '{}' to quit", config.family, config.options.quit_key);

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let summary = pipeline.run(&mut out)?;

	info!("Processed {} frames ({} skipped)", summary.frames, summary.skipped);
	if !config.options.quiet && !summary.statistics.is_empty() {
		write!(out, "{}", summary.statistics)?;
	}
	out.flush()?;
	Ok(())
}

fn main() {
	let args = Args::parse();

	env_logger::Builder::new()
		.filter_level(args.log_level())
		.parse_default_env()
		.init();

	let config = match DemoConfig::from_args(&args) {
		Ok(config) => config,
		Err(DemoError::UnknownFamily(name)) => {
			println!("Unrecognized tag family name: {name}. Use e.g. \"tag36h11\".");
			println!("Valid family names:");
			for name in TagFamily::names() {
				println!(" - {name}");
			}
			exit(-1);
		},
		Err(e) => {
			error!("{e}");
			exit(-1);
		}
	};

	if let Err(e) = run(&config) {
		error!("{e}");
		exit(-1);
	}
}
