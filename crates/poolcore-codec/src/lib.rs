//! Field-level text codec: converts between the wire/storage text
//! representation of a value (as it arrives in a line-delimited message or
//! is read back out of a row) and the corresponding Rust type.
//!
//! Every `text_to_*` parser mirrors the leniency of its C counterpart
//! (`atoll`/`atoi`/`atof` never fail on garbage input, they just read as
//! much of a leading number as they can and return zero otherwise) except
//! for the two timestamp parsers, which reject unparsable input outright
//! since a malformed date is never silently acceptable.

use poolcore_core::{PoolError, Tv, COMPARE_EXPIRY, DEFAULT_EXPIRY};

/// Copies `fld` into an owned `String`, aborting the process if `fld` would
/// not fit in a field of `cap` bytes (including a terminating nul).
///
/// A database row wider than the structure meant to hold it is a
/// programmer error, not an input error: it means the schema and the code
/// have drifted apart, and continuing would silently truncate data. This
/// mirrors `_txt_to_data`'s `TYPE_STR` case, which calls `quithere()` to
/// abort the process on the same condition.
pub fn text_to_str(field_name: &str, fld: &str, cap: usize) -> String {
    if fld.len() + 1 > cap {
        tracing::error!(
            field = field_name,
            len = fld.len(),
            cap,
            "field value wider than its storage capacity"
        );
        panic!(
            "field {field_name}: value of {} bytes does not fit in a {cap}-byte field",
            fld.len()
        );
    }
    fld.to_string()
}

/// Parses a leading integer prefix of `fld`, `atoll`-style: leading
/// whitespace and sign are honoured, trailing garbage is ignored, and a
/// string with no leading digits parses as zero.
pub fn text_to_bigint(fld: &str) -> i64 {
    parse_leading_int(fld)
}

/// As [`text_to_bigint`], narrowed to `i32`, `atoi`-style.
pub fn text_to_int(fld: &str) -> i32 {
    parse_leading_int::<i64>(fld) as i32
}

/// Parses a leading floating-point prefix of `fld`, `atof`-style.
pub fn text_to_double(fld: &str) -> f64 {
    let trimmed = fld.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit()
                || c == '.'
                || c == '-'
                || c == '+'
                || c == 'e'
                || c == 'E'
                || (i == 0 && (c == '-' || c == '+')))
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0.0)
}

/// A blob field never fails to parse: it is simply an owned copy of the
/// input text.
pub fn text_to_blob(fld: &str) -> String {
    fld.to_string()
}

fn parse_leading_int<T>(fld: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let trimmed = fld.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or_default()
}

/// Parses a full human-readable timestamp of the form
/// `YYYY-MM-DD HH:MM:SS[.uuuuuu]{+|-}TZ[:TZM]` into a [`Tv`], interpreting
/// the clock fields as UTC and then correcting for the stated timezone
/// offset.
///
/// Any parsed value strictly beyond [`COMPARE_EXPIRY`] is canonicalised to
/// [`DEFAULT_EXPIRY`] rather than kept as-is, matching the convention that
/// a "current" row's expiry is represented by a single well-known sentinel
/// rather than by whatever far-future date a caller happened to supply.
/// The comparison is strict here (unlike [`text_to_ctv`]'s `>=`), mirroring
/// the original's `TYPE_TV`/`TYPE_CTV` cases, which differ the same way.
pub fn text_to_tv(field_name: &str, fld: &str) -> Result<Tv, PoolError> {
    use chrono::{NaiveDate, TimeZone, Utc};

    let bad = || PoolError::BadTimestamp(field_name.to_string(), fld.to_string());

    let (datetime_part, tz_part) = split_at_tz_sign(fld).ok_or_else(bad)?;
    let tz_sign = if tz_part.starts_with('-') { -1i64 } else { 1i64 };
    let tz_digits = &tz_part[1..];
    let (tz_hh, tz_mm) = match tz_digits.split_once(':') {
        Some((hh, mm)) => (hh.parse::<i64>().map_err(|_| bad())?, mm.parse::<i64>().map_err(|_| bad())?),
        None => (tz_digits.parse::<i64>().map_err(|_| bad())?, 0),
    };

    let (date_part, time_part) = datetime_part.split_once(' ').ok_or_else(bad)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| bad())?;

    let (hms_part, usec) = match time_part.split_once('.') {
        Some((hms, frac)) => {
            let frac = format!("{frac:0<6}");
            (hms, frac[..6].parse::<i64>().map_err(|_| bad())?)
        }
        None => (time_part, 0),
    };
    let mut hms = hms_part.splitn(3, ':');
    let hh: u32 = hms.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let mm: u32 = hms.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let ss: u32 = hms.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;

    let naive = date.and_hms_opt(hh, mm, ss).ok_or_else(bad)?;
    let tim = Utc.from_utc_datetime(&naive).timestamp();

    if tim > COMPARE_EXPIRY.sec {
        return Ok(DEFAULT_EXPIRY);
    }

    let tz_offset_secs = tz_sign * (tz_hh * 60 + tz_mm) * 60;
    let sec = tim - tz_offset_secs;
    Ok(Tv::new(sec, usec))
}

/// Finds the `+`/`-` that introduces the timezone suffix, scanning from the
/// right so a `-` inside the date portion is never mistaken for it.
fn split_at_tz_sign(fld: &str) -> Option<(&str, &str)> {
    let idx = fld.rfind(['+', '-'])?;
    if idx == 0 {
        return None;
    }
    Some((&fld[..idx], &fld[idx..]))
}

/// Parses the compact `seconds,nanoseconds` form used for coinbase/compact
/// timestamp fields into a [`Tv`], rounding nanoseconds to the nearest
/// microsecond. A bare seconds value with no comma is also accepted, with
/// microseconds defaulting to zero.
pub fn text_to_ctv(field_name: &str, fld: &str) -> Result<Tv, PoolError> {
    let bad = || PoolError::BadCompactTimestamp(field_name.to_string(), fld.to_string());

    let mut parts = fld.splitn(2, ',');
    let sec: i64 = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
    let usec = match parts.next() {
        Some(nsec_str) => {
            let nsec: i64 = nsec_str.trim().parse().map_err(|_| bad())?;
            (nsec + 500) / 1000
        }
        None => 0,
    };

    if sec >= COMPARE_EXPIRY.sec {
        Ok(DEFAULT_EXPIRY)
    } else {
        Ok(Tv::new(sec, usec))
    }
}

/// Renders a [`Tv`] as `YYYY-MM-DD HH:MM:SS.uuuuuu+00`, always in UTC.
pub fn tv_to_text(tv: &Tv) -> String {
    use chrono::{TimeZone, Utc};
    let dt = Utc.timestamp_opt(tv.sec, 0).single().expect("tv.sec out of range");
    format!("{}.{:06}+00", dt.format("%Y-%m-%d %H:%M:%S"), tv.usec)
}

/// Renders a [`Tv`] in the compact `seconds,microseconds` form.
pub fn ctv_to_text(tv: &Tv) -> String {
    format!("{},{}", tv.sec, tv.usec)
}

/// Renders only the seconds component of a [`Tv`], dropping microseconds.
pub fn tvs_to_text(tv: &Tv) -> String {
    tv.sec.to_string()
}

pub fn bigint_to_text(v: i64) -> String {
    v.to_string()
}

pub fn int_to_text(v: i32) -> String {
    v.to_string()
}

/// Renders a double with six digits after the decimal point, matching
/// `printf("%f", ...)`.
pub fn double_to_text(v: f64) -> String {
    format!("{v:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_timestamp_with_timezone_and_microseconds() {
        let tv = text_to_tv("createdate", "2014-06-05 12:34:56.789012+09:30").unwrap();
        assert_eq!(tv.sec, 1_401_937_496);
        assert_eq!(tv.usec, 789_012);
    }

    #[test]
    fn rerenders_timestamp_as_utc() {
        let tv = text_to_tv("createdate", "2014-06-05 12:34:56.789012+09:30").unwrap();
        let text = tv_to_text(&tv);
        assert_eq!(text, "2014-06-05 03:04:56.789012+00");
    }

    #[test]
    fn parses_compact_timestamp_rounding_nanoseconds() {
        let tv = text_to_ctv("workinfoid", "1401901496,789012000").unwrap();
        assert_eq!(tv.sec, 1_401_901_496);
        assert_eq!(tv.usec, 789_012);
        assert_eq!(ctv_to_text(&tv), "1401901496,789012");
    }

    #[test]
    fn bare_seconds_compact_timestamp_defaults_usec_to_zero() {
        let tv = text_to_ctv("workinfoid", "1401901496").unwrap();
        assert_eq!(tv.usec, 0);
    }

    #[test]
    fn timestamp_past_compare_expiry_canonicalises_to_default_expiry() {
        let tv = text_to_tv("expirydate", "9999-01-01 00:00:00.000000+00").unwrap();
        assert_eq!(tv, DEFAULT_EXPIRY);
    }

    #[test]
    fn compact_timestamp_past_compare_expiry_canonicalises() {
        let tv = text_to_ctv("expirydate", "999999999999,0").unwrap();
        assert_eq!(tv, DEFAULT_EXPIRY);
    }

    #[test]
    fn timestamp_exactly_at_compare_expiry_is_kept_unswapped() {
        // TV clamps only strictly beyond COMPARE_EXPIRY; CTV clamps at or
        // beyond it. A value landing exactly on the threshold must
        // therefore come out differently from the two parsers.
        let tv = text_to_tv("expirydate", "6600-01-01 00:00:00.000000+00").unwrap();
        assert_eq!(tv.sec, COMPARE_EXPIRY.sec);
        assert_ne!(tv, DEFAULT_EXPIRY);

        let ctv = text_to_ctv("expirydate", "146108707200,0").unwrap();
        assert_eq!(ctv, DEFAULT_EXPIRY);
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let err = text_to_tv("createdate", "not-a-date").unwrap_err();
        assert!(matches!(err, PoolError::BadTimestamp(_, _)));
    }

    #[test]
    fn leading_integer_prefix_is_lenient() {
        assert_eq!(text_to_bigint("42abc"), 42);
        assert_eq!(text_to_bigint("garbage"), 0);
        assert_eq!(text_to_int("-7 units"), -7);
    }

    #[test]
    fn double_round_trips_with_six_decimals() {
        let text = double_to_text(1.5);
        assert_eq!(text, "1.500000");
        assert_eq!(text_to_double(&text), 1.5);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn oversized_str_field_aborts() {
        text_to_str("workername", "this string is far too long", 4);
    }
}
