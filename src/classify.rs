//! Machinable vs. non-standard handling classification for postal packages.

// self
use crate::{_prelude::*, package::Dimensions};

const MAX_WEIGHT_LB: f64 = 25.0;
const MAX_LENGTH_IN: f64 = 22.0;
const MAX_WIDTH_IN: f64 = 18.0;
const MAX_HEIGHT_IN: f64 = 15.0;
const MAX_LENGTH_PLUS_GIRTH_IN: f64 = 108.0;

/// Handling category sent to the postal carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingCategory {
	/// Fits automated sorting equipment.
	Machinable,
	/// Requires manual handling.
	NonStandard,
}
impl ProcessingCategory {
	/// Wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProcessingCategory::Machinable => "MACHINABLE",
			ProcessingCategory::NonStandard => "NONSTANDARD",
		}
	}
}
impl Display for ProcessingCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Classifier verdict.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
	/// Resulting category.
	pub category: ProcessingCategory,
	/// One entry per violated threshold; empty when machinable.
	pub reasons: Vec<String>,
	/// `length + 2 × (width + height)` over the normalized sides.
	pub length_plus_girth: f64,
}

/// Sorts the sides descending so `length` is always the longest.
pub fn normalize_dimensions(dimensions: Dimensions) -> Dimensions {
	let mut sides = [dimensions.length, dimensions.width, dimensions.height];

	sides.sort_by(|a, b| b.total_cmp(a));

	Dimensions::new(sides[0], sides[1], sides[2])
}

/// Classifies a package; every threshold is checked so all violations are reported.
pub fn classify(weight: f64, dimensions: Dimensions) -> Classification {
	let Dimensions { length, width, height } = normalize_dimensions(dimensions);
	let length_plus_girth = length + 2.0 * (width + height);
	let mut reasons = Vec::new();

	if weight > MAX_WEIGHT_LB {
		reasons.push(format!("weight {weight} lb exceeds {MAX_WEIGHT_LB} lb"));
	}
	if length > MAX_LENGTH_IN {
		reasons.push(format!("length {length} in exceeds {MAX_LENGTH_IN} in"));
	}
	if width > MAX_WIDTH_IN {
		reasons.push(format!("width {width} in exceeds {MAX_WIDTH_IN} in"));
	}
	if height > MAX_HEIGHT_IN {
		reasons.push(format!("height {height} in exceeds {MAX_HEIGHT_IN} in"));
	}
	if length_plus_girth > MAX_LENGTH_PLUS_GIRTH_IN {
		reasons.push(format!(
			"length plus girth {length_plus_girth} in exceeds {MAX_LENGTH_PLUS_GIRTH_IN} in"
		));
	}

	let category = if reasons.is_empty() {
		ProcessingCategory::Machinable
	} else {
		ProcessingCategory::NonStandard
	};

	Classification { category, reasons, length_plus_girth }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn heavy_package_is_nonstandard() {
		let verdict = classify(30.0, Dimensions::new(10.0, 10.0, 10.0));

		assert_eq!(verdict.category, ProcessingCategory::NonStandard);
		assert_eq!(verdict.reasons.len(), 1);
		assert!(verdict.reasons[0].starts_with("weight"));
		assert_eq!(verdict.length_plus_girth, 50.0);
	}

	#[test]
	fn moderate_package_is_machinable() {
		let verdict = classify(5.0, Dimensions::new(20.0, 15.0, 10.0));

		assert_eq!(verdict.category, ProcessingCategory::Machinable);
		assert!(verdict.reasons.is_empty());
	}

	#[test]
	fn sides_are_sorted_before_checks() {
		// Height 20 would trip the height limit unsorted; sorted it becomes the 20 in length.
		let verdict = classify(1.0, Dimensions::new(5.0, 10.0, 20.0));

		assert_eq!(verdict.category, ProcessingCategory::Machinable);
		assert_eq!(normalize_dimensions(Dimensions::new(5.0, 10.0, 20.0)).length, 20.0);
	}

	#[test]
	fn every_violation_is_reported() {
		let verdict = classify(40.0, Dimensions::new(16.0, 40.0, 20.0));

		assert_eq!(verdict.category, ProcessingCategory::NonStandard);
		assert_eq!(verdict.reasons.len(), 5);
		assert_eq!(verdict.category.as_str(), "NONSTANDARD");
	}
}
