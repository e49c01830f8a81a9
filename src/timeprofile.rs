use std::{borrow::Cow, collections::HashMap, fmt::Display, time::{Duration, Instant}};

/// Named stage timestamps for one pass through the pipeline
#[derive(Clone, Debug)]
pub struct TimeProfile {
	/// Start timestamp
	now: Instant,
	/// Named timestamps
	stamps: Vec<TimeProfileEntry>,
}

impl Default for TimeProfile {
	fn default() -> Self {
		Self::starting_at(Instant::now())
	}
}

#[derive(Clone, Debug)]
struct TimeProfileEntry {
	name: Cow<'static, str>,
	timestamp: Instant,
}

impl TimeProfile {
	/// Start a profile at `now`
	pub fn starting_at(now: Instant) -> Self {
		Self {
			now,
			stamps: Vec::new(),
		}
	}

	/// Record a timestamp right now
	#[inline]
	pub fn stamp(&mut self, name: impl Into<Cow<'static, str>>) {
		self.stamp_at(name, Instant::now())
	}

	/// Mark a specific time
	pub fn stamp_at(&mut self, name: impl Into<Cow<'static, str>>, timestamp: Instant) {
		self.stamps.push(TimeProfileEntry {
			name: name.into(),
			timestamp,
		});
	}

	/// Stage names and the time each took since the previous stamp
	pub fn stages(&self) -> impl Iterator<Item = (&str, Duration)> + '_ {
		let mut last_time = self.now;
		self.stamps.iter().map(move |stamp| {
			let duration = stamp.timestamp.saturating_duration_since(last_time);
			last_time = stamp.timestamp;
			(stamp.name.as_ref(), duration)
		})
	}

	/// Duration from profile start to the last recorded timestamp
	pub fn total_duration(&self) -> Duration {
		match self.stamps.last() {
			Some(last) => last.timestamp.saturating_duration_since(self.now),
			None => Duration::ZERO,
		}
	}
}

impl Display for TimeProfile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		// Find maximums for scaling output
		let max_name_length = self.stamps.iter()
			.map(|stamp| stamp.name.len())
			.max()
			.unwrap_or(0)
			.max(1);

		let total_time = self.total_duration().as_secs_f64();

		for (i, (name, parttime)) in self.stages().enumerate() {
			let cumtime = self.stamps[i].timestamp.saturating_duration_since(self.now);
			let percent = if total_time > 0. { 100. * parttime.as_secs_f64() / total_time } else { 0. };

			writeln!(f, "{:2} {:width$} {:12.6} ms {:12.6} ms {:3.0}%",
				i,
				name,
				parttime.as_secs_f64() * 1000.,
				cumtime.as_secs_f64() * 1000.,
				percent,
				width=max_name_length
			)?;
		}
		Ok(())
	}
}

/// Tracks statistics of multiple time profiles
#[derive(Default, Debug)]
pub struct TimeProfileStatistics {
	/// Entry information
	values: HashMap<String, Vec<Duration>>,
	/// Entry keys, in order
	keys: Vec<String>,
	/// Profile totals
	totals: Vec<Duration>,
}

/// Summary of one stage across profiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSummary {
	pub count: usize,
	pub average: Duration,
	pub min: Duration,
	pub max: Duration,
	pub stddev: Duration,
}

impl StageSummary {
	fn of(entry: &[Duration]) -> Option<Self> {
		if entry.is_empty() {
			return None;
		}
		let mut max = Duration::ZERO;
		let mut min = Duration::MAX;
		let mut sum = 0.;
		for d in entry.iter().copied() {
			sum += d.as_secs_f64();
			max = max.max(d);
			min = min.min(d);
		}
		let len = entry.len() as f64;
		let avg = sum / len;
		let variance = entry.iter()
			.map(|d| (d.as_secs_f64() - avg).powi(2))
			.sum::<f64>() / len;
		Some(Self {
			count: entry.len(),
			average: Duration::from_secs_f64(avg),
			min,
			max,
			stddev: Duration::from_secs_f64(variance.sqrt()),
		})
	}
}

impl TimeProfileStatistics {
	pub fn add(&mut self, tp: &TimeProfile) {
		for (name, duration) in tp.stages() {
			match self.values.get_mut(name) {
				Some(entry) => entry.push(duration),
				None => {
					self.values.insert(name.to_owned(), vec![duration]);
					self.keys.push(name.to_owned());
				}
			}
		}
		self.totals.push(tp.total_duration());
	}

	/// Number of profiles added
	pub fn len(&self) -> usize {
		self.totals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.totals.is_empty()
	}

	pub fn stage(&self, name: &str) -> Option<StageSummary> {
		StageSummary::of(self.values.get(name)?)
	}

	pub fn total(&self) -> Option<StageSummary> {
		StageSummary::of(&self.totals)
	}
}

impl Display for TimeProfileStatistics {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let max_name = self.keys
			.iter()
			.map(|stamp| stamp.len())
			.max()
			.unwrap_or(0)
			.max("total".len());

		writeln!(f, " # {:width$} {:>15} {:>15} {:>15} {:>15}", "Name", "Average", "Min", "Max", "Std.dev", width=max_name)?;

		let rows = self.keys.iter()
			.filter_map(|key| Some((key.as_str(), self.stage(key)?)))
			.chain(self.total().map(|total| ("total", total)));

		for (i, (key, summary)) in rows.enumerate() {
			writeln!(f, "{:2} {:width$} {:12.6} ms {:12.6} ms {:12.6} ms {:12.6} ms",
				i,
				key,
				summary.average.as_secs_f64() * 1e3,
				summary.min.as_secs_f64() * 1e3,
				summary.max.as_secs_f64() * 1e3,
				summary.stddev.as_secs_f64() * 1e3,
				width=max_name
			)?;
		}

		Ok(())
	}
}
