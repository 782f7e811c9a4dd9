use anyhow::{Result, bail};
use heatwalk_core::{Position, Profile};

pub const TIP_NEGATIVE_COORDS: &str =
    "Note: for negative coordinates, use the '=' form, e.g.:\n  route --from=-97.743,30.267 --to=-97.740,30.270";

/// Parse `"LNG,LAT"` into a validated position.
pub fn parse_lng_lat(raw: &str, ctx: &str) -> Result<Position> {
    let Some((lng, lat)) = raw.split_once(',') else {
        bail!("Invalid {ctx}: '{raw}' (expected LNG,LAT)\n\n{TIP_NEGATIVE_COORDS}");
    };

    let (Ok(lng), Ok(lat)) = (lng.trim().parse::<f64>(), lat.trim().parse::<f64>()) else {
        bail!("Invalid {ctx}: '{raw}' (LNG and LAT must be numbers)");
    };

    let p = Position::new(lng, lat);
    if !p.is_valid() {
        bail!("Invalid {ctx}: lng must be within [-180, 180] and lat within [-90, 90], got {lng},{lat}");
    }
    Ok(p)
}

pub fn parse_profile(raw: &str) -> Result<Profile> {
    match Profile::parse(raw) {
        Some(p) => Ok(p),
        None => bail!("Unknown profile '{raw}' (use fastest, balanced or coolest)"),
    }
}

pub fn validate_endpoints(from: Position, to: Position) -> Result<()> {
    if from == to {
        bail!("FROM and TO must be different");
    }
    Ok(())
}

pub fn validate_simulation(pace_mps: f64, interval_s: f64) -> Result<()> {
    if !(pace_mps.is_finite() && pace_mps > 0.0) {
        bail!("--pace-mps must be > 0 (got {pace_mps})");
    }
    if !(interval_s.is_finite() && interval_s > 0.0) {
        bail!("--interval-s must be > 0 (got {interval_s})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_longitudes() {
        let p = parse_lng_lat("-97.743, 30.267", "origin").unwrap();
        assert_eq!(p, Position::new(-97.743, 30.267));
    }

    #[test]
    fn rejects_malformed_and_out_of_range() {
        assert!(parse_lng_lat("-97.743", "origin").is_err());
        assert!(parse_lng_lat("east,30", "origin").is_err());
        assert!(parse_lng_lat("-97.7,95", "origin").is_err());
        assert!(parse_lng_lat("NaN,30", "origin").is_err());
    }

    #[test]
    fn profile_names() {
        assert_eq!(parse_profile("coolest").unwrap(), Profile::Cool);
        assert_eq!(parse_profile("Fast").unwrap(), Profile::Fast);
        assert!(parse_profile("scenic").is_err());
    }

    #[test]
    fn simulation_bounds() {
        assert!(validate_simulation(1.4, 1.0).is_ok());
        assert!(validate_simulation(0.0, 1.0).is_err());
        assert!(validate_simulation(1.4, -1.0).is_err());
    }
}
