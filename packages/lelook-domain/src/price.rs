const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parses a display price such as `"$1,299.00"` into a number.
///
/// Currency symbols, `,` thousands separators and whitespace are stripped. Empty or
/// non-numeric input yields `None`, which callers treat as "unknown", never as zero.
pub fn parse_price(raw: &str) -> Option<f64> {
	let cleaned: String = raw
		.chars()
		.filter(|ch| !CURRENCY_SYMBOLS.contains(ch) && *ch != ',' && !ch.is_whitespace())
		.collect();

	if cleaned.is_empty() {
		return None;
	}

	cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Keeps a price when it lies within the optional bounds. Unparsable prices pass.
pub fn within_bounds(raw: &str, min_price: Option<f64>, max_price: Option<f64>) -> bool {
	let Some(price) = parse_price(raw) else {
		return true;
	};

	if let Some(min) = min_price
		&& price < min
	{
		return false;
	}
	if let Some(max) = max_price
		&& price > max
	{
		return false;
	}

	true
}
