//! Date and time capability.
//!
//! Current time in any IANA zone, and wall-clock conversion between zones.

use chrono::{DateTime, NaiveTime, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domains::tools::ToolError;
use crate::domains::tools::capability::{Capability, OperationDescriptor, ToolContext};
use crate::domains::tools::spec::{ParamSpec, TypeSpec};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NowParams {
    /// IANA timezone name; UTC when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NowOutput {
    pub current_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertParams {
    /// Wall-clock time as `HH:MM` (24-hour).
    pub time: String,
    pub source_timezone: String,
    pub target_timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertOutput {
    pub source_time: String,
    pub target_time: String,
    pub time_difference: String,
    pub source_timezone: String,
    pub target_timezone: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct DateTimeTool;

impl DateTimeTool {
    #[instrument(skip_all)]
    async fn now(_ctx: ToolContext, params: NowParams) -> Result<NowOutput, ToolError> {
        let current_time = current_time(params.timezone.as_deref(), Utc::now())?;
        info!("Current time requested: {}", current_time);
        Ok(NowOutput { current_time })
    }

    #[instrument(skip_all, fields(source = %params.source_timezone, target = %params.target_timezone))]
    async fn convert(_ctx: ToolContext, params: ConvertParams) -> Result<ConvertOutput, ToolError> {
        convert_time(
            &params.time,
            &params.source_timezone,
            &params.target_timezone,
            Utc::now(),
        )
    }
}

impl Capability for DateTimeTool {
    const NAMESPACE: Option<&'static str> = Some("time");
    const DESCRIPTION: &'static str = "Current time and timezone conversion";

    fn operations() -> Vec<OperationDescriptor> {
        vec![
            OperationDescriptor::new(
                "now",
                "Get the current time as an ISO 8601 string, in UTC or the given IANA timezone.",
                Self::now,
            )
            .param(
                ParamSpec::new("timezone", TypeSpec::optional(TypeSpec::String))
                    .describe("IANA timezone name, e.g. 'Asia/Shanghai'. Defaults to UTC."),
            )
            .returns(TypeSpec::object([ParamSpec::new(
                "current_time",
                TypeSpec::String,
            )])),
            OperationDescriptor::new(
                "convert",
                "Convert an HH:MM wall-clock time from one IANA timezone to another, using today's date.",
                Self::convert,
            )
            .param(ParamSpec::new("time", TypeSpec::String).describe("Time in 24-hour HH:MM format"))
            .param(ParamSpec::new("source_timezone", TypeSpec::String).describe("Source IANA timezone"))
            .param(ParamSpec::new("target_timezone", TypeSpec::String).describe("Target IANA timezone"))
            .returns(TypeSpec::object([
                ParamSpec::new("source_time", TypeSpec::String),
                ParamSpec::new("target_time", TypeSpec::String),
                ParamSpec::new("time_difference", TypeSpec::String),
                ParamSpec::new("source_timezone", TypeSpec::String),
                ParamSpec::new("target_timezone", TypeSpec::String),
            ])),
        ]
    }
}

// ============================================================================
// Time computations
// ============================================================================

fn parse_zone(name: &str) -> Result<Tz, ToolError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ToolError::invalid_request(format!("Unknown timezone: '{}'", name)))
}

fn iso(dt: &DateTime<Tz>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// ISO 8601 timestamp at second precision.
pub fn current_time(timezone: Option<&str>, now: DateTime<Utc>) -> Result<String, ToolError> {
    let zone = match timezone.filter(|tz| !tz.trim().is_empty()) {
        Some(name) => parse_zone(name)?,
        None => Tz::UTC,
    };
    Ok(iso(&now.with_timezone(&zone)))
}

/// Interpret `time` on `today`'s date in the source zone and express it in
/// the target zone.
pub fn convert_time(
    time: &str,
    source_timezone: &str,
    target_timezone: &str,
    today: DateTime<Utc>,
) -> Result<ConvertOutput, ToolError> {
    let source = parse_zone(source_timezone)?;
    let target = parse_zone(target_timezone)?;
    let wall_clock = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|_| {
        ToolError::invalid_request("Invalid time format. Expected HH:MM [24-hour format]")
    })?;

    let date = today.with_timezone(&source).date_naive();
    let source_dt = source
        .from_local_datetime(&date.and_time(wall_clock))
        .earliest()
        .ok_or_else(|| {
            ToolError::invalid_request(format!(
                "{} does not exist in {} on {}",
                time, source_timezone, date
            ))
        })?;
    let target_dt = source_dt.with_timezone(&target);

    let offset_seconds = target_dt.offset().fix().local_minus_utc()
        - source_dt.offset().fix().local_minus_utc();

    Ok(ConvertOutput {
        source_time: iso(&source_dt),
        target_time: iso(&target_dt),
        time_difference: format_hours(offset_seconds),
        source_timezone: source_timezone.to_string(),
        target_timezone: target_timezone.to_string(),
    })
}

/// `+5.0h`, `-3.5h`, `+5.75h`.
fn format_hours(seconds: i32) -> String {
    let hours = f64::from(seconds) / 3600.0;
    if hours.fract() == 0.0 {
        format!("{:+.1}h", hours)
    } else {
        let text = format!("{:+.2}", hours);
        format!("{}h", text.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(5 * 3600), "+5.0h");
        assert_eq!(format_hours(-3 * 3600), "-3.0h");
        assert_eq!(format_hours(5 * 3600 + 45 * 60), "+5.75h");
        assert_eq!(format_hours(-(3 * 3600 + 30 * 60)), "-3.5h");
        assert_eq!(format_hours(0), "+0.0h");
    }

    #[test]
    fn test_current_time_formats() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 45).unwrap();
        assert_eq!(current_time(None, now).unwrap(), "2025-01-15T12:30:45+00:00");
        assert_eq!(
            current_time(Some("Asia/Tokyo"), now).unwrap(),
            "2025-01-15T21:30:45+09:00"
        );
        assert!(current_time(Some("Mars/Olympus"), now).is_err());
    }

    #[test]
    fn test_convert_fractional_offset() {
        let out = convert_time("09:00", "UTC", "Asia/Kathmandu", reference_day()).unwrap();
        assert_eq!(out.time_difference, "+5.75h");
        assert_eq!(out.target_time, "2025-01-15T14:45:00+05:45");
    }

    #[test]
    fn test_convert_across_dst_zones() {
        // January: New York on EST (UTC-5), London on GMT
        let out = convert_time("10:00", "America/New_York", "Europe/London", reference_day())
            .unwrap();
        assert_eq!(out.source_time, "2025-01-15T10:00:00-05:00");
        assert_eq!(out.target_time, "2025-01-15T15:00:00+00:00");
        assert_eq!(out.time_difference, "+5.0h");
    }

    #[test]
    fn test_convert_rejects_bad_input() {
        assert!(matches!(
            convert_time("9am", "UTC", "UTC", reference_day()),
            Err(ToolError::InvalidRequest(_))
        ));
        assert!(matches!(
            convert_time("09:00", "Nowhere/City", "UTC", reference_day()),
            Err(ToolError::InvalidRequest(_))
        ));
    }
}
