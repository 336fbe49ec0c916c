//! Carrier quotes, markup math, and the shopper-facing options they become.

// crates.io
use rust_decimal::RoundingStrategy;
// self
use crate::{_prelude::*, carrier::Service};

/// Id of the synthetic free option.
pub const FREE_SHIPPING_ID: &str = "free_shipping";
/// Label of the synthetic free option.
pub const FREE_SHIPPING_LABEL: &str = "Free Shipping";

/// One priced service returned by a carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
	/// Carrier service code.
	pub service_id: String,
	/// Shopper-facing service label.
	pub service_label: String,
	/// Carrier price before markup.
	pub original_amount: Decimal,
	/// Markup applied, in percent.
	pub markup_percent: f64,
	/// Price after markup; never negative.
	pub adjusted_amount: Decimal,
}
impl RateQuote {
	/// Prices `service` at `original_amount` plus `markup_percent`.
	pub fn new(service: Service, original_amount: Decimal, markup_percent: f64) -> Self {
		Self {
			service_id: service.code().into(),
			service_label: service.label().into(),
			original_amount,
			markup_percent,
			adjusted_amount: apply_markup(original_amount, markup_percent),
		}
	}
}

/// Quotes keyed by service label.
pub type RateQuotes = BTreeMap<String, RateQuote>;

/// Externally offered shipping option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
	/// `<method_id>:<service_slug>`, or [`FREE_SHIPPING_ID`].
	pub id: String,
	/// Shopper-facing label.
	pub label: String,
	/// Price charged to the shopper.
	pub cost: Decimal,
}
impl ShippingOption {
	/// Builds the option a shipping method registers for a quote.
	pub fn from_quote(method_id: &str, quote: &RateQuote) -> Self {
		Self {
			id: format!("{method_id}:{}", slugify(&quote.service_label)),
			label: quote.service_label.clone(),
			cost: quote.adjusted_amount,
		}
	}

	/// The single zero-cost option shown when a free-shipping override applies.
	pub fn free_shipping() -> Self {
		Self { id: FREE_SHIPPING_ID.into(), label: FREE_SHIPPING_LABEL.into(), cost: Decimal::ZERO }
	}

	/// Method id prefix of the option id (text before the first `:`).
	pub fn method_id(&self) -> &str {
		self.id.split_once(':').map_or(self.id.as_str(), |(method, _)| method)
	}
}

/// `original × (1 + markup / 100)`, rounded half away from zero to cents and clamped at zero.
pub fn apply_markup(original: Decimal, markup_percent: f64) -> Decimal {
	// Display yields the shortest round-trip form, so `7.5` stays exactly 7.5.
	let markup = Decimal::from_str(&markup_percent.to_string()).unwrap_or(Decimal::ZERO);
	let factor = Decimal::ONE + markup / Decimal::ONE_HUNDRED;

	original
		.saturating_mul(factor)
		.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
		.max(Decimal::ZERO)
}

/// Reads a non-negative money amount encoded as a JSON string or number.
pub fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
	let amount = match value {
		serde_json::Value::String(text) => Decimal::from_str(text.trim()).ok()?,
		serde_json::Value::Number(number) => Decimal::from_str(&number.to_string())
			.or_else(|_| Decimal::from_scientific(&number.to_string()))
			.ok()?,
		_ => return None,
	};

	(!amount.is_sign_negative()).then_some(amount)
}

/// Lowercase ASCII slug with `-` separators.
pub fn slugify(label: &str) -> String {
	let mut slug = String::with_capacity(label.len());

	for c in label.chars() {
		if c.is_ascii_alphanumeric() {
			slug.push(c.to_ascii_lowercase());
		} else if !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}

	while slug.ends_with('-') {
		slug.pop();
	}

	slug
}
