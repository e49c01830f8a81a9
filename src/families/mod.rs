use std::{fmt::Display, str::FromStr};

use crate::DemoError;

/// AprilTag families the demo knows how to ask a detector for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
	Tag36h11,
	Tag25h9,
	Tag16h5,
	TagCircle21h7,
	TagStandard41h12,
}

/// Static description of a tag family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyInfo {
	pub family: TagFamily,
	/// A human-readable name, e.g., "tag36h11"
	pub name: &'static str,
}

/// Every supported family, in the order they are listed to the user.
///
/// This is the only place family names are spelled out.
pub const FAMILY_TABLE: [FamilyInfo; 5] = [
	FamilyInfo { family: TagFamily::Tag36h11, name: "tag36h11" },
	FamilyInfo { family: TagFamily::Tag25h9, name: "tag25h9" },
	FamilyInfo { family: TagFamily::Tag16h5, name: "tag16h5" },
	FamilyInfo { family: TagFamily::TagCircle21h7, name: "tagCircle21h7" },
	FamilyInfo { family: TagFamily::TagStandard41h12, name: "tagStandard41h12" },
];

impl TagFamily {
	pub fn for_name(name: &str) -> Option<TagFamily> {
		FAMILY_TABLE
			.iter()
			.find(|info| info.name == name)
			.map(|info| info.family)
	}

	pub fn names() -> impl Iterator<Item = &'static str> {
		FAMILY_TABLE.iter().map(|info| info.name)
	}

	pub fn info(&self) -> &'static FamilyInfo {
		// Table is indexed in declaration order
		&FAMILY_TABLE[*self as usize]
	}

	pub fn name(&self) -> &'static str {
		self.info().name
	}
}

impl Default for TagFamily {
	fn default() -> Self {
		Self::Tag36h11
	}
}

impl Display for TagFamily {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for TagFamily {
	type Err = DemoError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::for_name(s).ok_or_else(|| DemoError::UnknownFamily(s.to_owned()))
	}
}
