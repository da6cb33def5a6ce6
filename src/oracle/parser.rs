//! Best-effort extraction of battery specs from generative-model text.
//!
//! The fallback prompt asks for a fixed three-line format, but models
//! wrap it in preamble and postamble, so each field is searched for
//! independently and is optional. Only a reply with no recognizable
//! field at all is an error.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::ApiError;
use crate::spec::{BatterySpec, Source, SpecQuery};

// Patterns are compiled once per process and shared across calls.
fn capacity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)capacity:\s*([0-9.]+)\s*kWh").expect("capacity pattern"))
}

fn power_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)power:\s*([0-9.]+)\s*kW").expect("power pattern"))
}

fn chemistry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)chemistry:\s*([^\n]+)").expect("chemistry pattern"))
}

/// Parse a generation reply into a spec for `query`.
///
/// Extracted numbers pass through unvalidated; missing fields stay at
/// zero/empty. Fails only when capacity, power and chemistry are all
/// absent.
pub fn parse_spec_response(
    text: &str,
    query: &SpecQuery,
    confidence: f32,
) -> Result<BatterySpec, ApiError> {
    let mut spec = BatterySpec {
        make: query.make.clone(),
        model: query.model.clone(),
        year: query.year,
        capacity_kwh: 0.0,
        power_kw: 0.0,
        chemistry: String::new(),
        confidence,
        source: Source::Llm,
    };

    if let Some(caps) = capacity_re().captures(text) {
        if let Ok(value) = caps[1].parse::<f64>() {
            spec.capacity_kwh = value;
        }
    }

    if let Some(caps) = power_re().captures(text) {
        if let Ok(value) = caps[1].parse::<f64>() {
            spec.power_kw = value;
        }
    }

    if let Some(caps) = chemistry_re().captures(text) {
        spec.chemistry = caps[1].trim().to_string();
    }

    if spec.capacity_kwh == 0.0 && spec.power_kw == 0.0 && spec.chemistry.is_empty() {
        return Err(ApiError::UnparseableResponse(format!(
            "no capacity, power or chemistry found in reply for {}",
            query
        )));
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SpecQuery {
        SpecQuery::new("Rivian", "R1T", 2023)
    }

    #[test]
    fn parses_the_full_three_line_format() {
        let text = "Capacity: 135 kWh\nPower: 200 kW\nChemistry: NMC";
        let spec = parse_spec_response(text, &query(), 0.5).unwrap();

        assert_eq!(spec.capacity_kwh, 135.0);
        assert_eq!(spec.power_kw, 200.0);
        assert_eq!(spec.chemistry, "NMC");
        assert_eq!(spec.confidence, 0.5);
        assert_eq!(spec.source, Source::Llm);
    }

    #[test]
    fn tolerates_preamble_postamble_and_case() {
        let text = "Sure, here are the specs you asked for:\n\n\
                    CAPACITY: 131.5 KWH\n\
                    power: 147 kw\n\
                    Chemistry:   LFP  \n\n\
                    Note that this is an estimate based on similar models.";
        let spec = parse_spec_response(text, &query(), 0.5).unwrap();

        assert_eq!(spec.capacity_kwh, 131.5);
        assert_eq!(spec.power_kw, 147.0);
        assert_eq!(spec.chemistry, "LFP");
    }

    #[test]
    fn a_single_field_is_enough() {
        let spec = parse_spec_response("Chemistry: NMC", &query(), 0.5).unwrap();

        assert_eq!(spec.capacity_kwh, 0.0);
        assert_eq!(spec.power_kw, 0.0);
        assert_eq!(spec.chemistry, "NMC");
    }

    #[test]
    fn fails_when_no_field_is_recognizable() {
        let err = parse_spec_response(
            "I'm sorry, I don't have information about that vehicle.",
            &query(),
            0.5,
        )
        .unwrap_err();

        assert!(matches!(err, ApiError::UnparseableResponse(_)));
    }

    #[test]
    fn unparseable_numbers_leave_fields_unset() {
        // "..." fails float parsing; chemistry still rescues the reply
        let text = "Capacity: ... kWh\nChemistry: solid-state";
        let spec = parse_spec_response(text, &query(), 0.5).unwrap();

        assert_eq!(spec.capacity_kwh, 0.0);
        assert_eq!(spec.chemistry, "solid-state");
    }

    #[test]
    fn query_identity_is_carried_into_the_result() {
        let spec = parse_spec_response("Power: 200 kW", &query(), 0.5).unwrap();

        assert_eq!(spec.make, "Rivian");
        assert_eq!(spec.model, "R1T");
        assert_eq!(spec.year, 2023);
    }
}
