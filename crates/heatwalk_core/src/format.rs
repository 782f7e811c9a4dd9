//! Display strings for distances, durations and maneuvers.

use crate::model::TurnSign;

pub const M_PER_MI: f64 = 1609.344;
pub const FT_PER_M: f64 = 3.28084;

/// `"275 ft"` below ~950 ft, then `"0.4 mi"` / `"12 mi"`.
pub fn distance_imperial(m: f64) -> String {
    let ft = m * FT_PER_M;
    if ft < 950.0 {
        return format!("{} ft", ((ft / 25.0).round() * 25.0) as i64);
    }
    miles(m)
}

pub fn miles(m: f64) -> String {
    if !m.is_finite() {
        return "—".to_string();
    }
    let mi = m / M_PER_MI;
    if mi < 10.0 {
        format!("{mi:.1} mi")
    } else {
        format!("{} mi", mi.round() as i64)
    }
}

/// Live ETA: `"0 min"` allowed, hours split out past 60 minutes.
pub fn eta(sec: f64) -> String {
    let min = (sec / 60.0).round().max(0.0) as i64;
    let (h, m) = (min / 60, min % 60);
    if h > 0 {
        format!("{h} hr {m} min")
    } else {
        format!("{min} min")
    }
}

/// Route-preview duration; never shows less than one minute.
pub fn trip_duration(sec: f64) -> String {
    if !sec.is_finite() {
        return "—".to_string();
    }
    let total = ((sec / 60.0).round() as i64).max(1);
    let (h, m) = (total / 60, total % 60);
    if h >= 1 {
        format!("{h} hr {m} min")
    } else {
        format!("{total} min")
    }
}

pub fn turn_phrase(sign: TurnSign) -> &'static str {
    match sign {
        TurnSign::UTurn => "Make a U-turn",
        TurnSign::SharpLeft => "Sharp left",
        TurnSign::Left => "Turn left",
        TurnSign::SlightLeft => "Slight left",
        TurnSign::Continue => "Continue",
        TurnSign::SlightRight => "Slight right",
        TurnSign::Right => "Turn right",
        TurnSign::SharpRight => "Sharp right",
        TurnSign::Arrive => "Arrive",
        TurnSign::KeepLeft => "Keep left",
        TurnSign::KeepRight => "Keep right",
    }
}

/// Instruction line for display, falling back to the maneuver phrase.
pub fn instruction_line(text: &str, sign: TurnSign, street: Option<&str>) -> String {
    if !text.trim().is_empty() {
        return text.to_string();
    }
    match street {
        Some(s) if !s.is_empty() => format!("{} onto {s}", turn_phrase(sign)),
        _ => turn_phrase(sign).to_string(),
    }
}
