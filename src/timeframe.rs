use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Whole hours on the converted scale. `pm` adds 12, so the scale runs
/// from 0 (`0am`) to 24 (`12pm`).
pub type Hour = u32;

/// A `[start, end]` pair of time-of-day tokens such as `"9am"` or `"5PM"`.
///
/// Tokens are kept verbatim; they are converted on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    pub start: String,
    pub end: String,
}

impl Timeframe {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Convert both endpoints without checking their order.
    pub fn convert(&self) -> Result<HourRange, BookingError> {
        Ok(HourRange {
            start: convert_time(&self.start)?,
            end: convert_time(&self.end)?,
        })
    }

    /// Convert both endpoints and require `start < end`.
    pub fn hours(&self) -> Result<HourRange, BookingError> {
        let range = self.convert()?;
        if range.start >= range.end {
            return Err(BookingError::InvalidTimeframe {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(range)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// A converted timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start: Hour,
    pub end: Hour,
}

impl HourRange {
    /// True if either of our endpoints falls strictly inside `accepted`.
    ///
    /// Endpoint-only: touching boundaries never conflict, and a range that
    /// swallows `accepted` whole (or matches it exactly) is not reported.
    pub fn conflicts_with(&self, accepted: &HourRange) -> bool {
        let inside = |t: Hour| accepted.start < t && t < accepted.end;
        inside(self.start) || inside(self.end)
    }
}

/// Convert a time-of-day token into an hour on the comparable scale.
///
/// The token is a digit prefix followed by `am` or `pm`, case-insensitive,
/// surrounding whitespace ignored. `pm` adds 12 to the parsed number, which
/// yields `12am -> 12` and `12pm -> 24`.
pub fn convert_time(token: &str) -> Result<Hour, BookingError> {
    let normalized = token.trim().to_ascii_lowercase();
    let digits_len = normalized
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let invalid = || BookingError::InvalidTimeFormat(token.to_string());
    if digits_len == 0 {
        return Err(invalid());
    }
    let (digits, meridiem) = normalized.split_at(digits_len);
    let hour: Hour = digits.parse().map_err(|_| invalid())?;
    if hour > 12 {
        return Err(invalid());
    }
    match meridiem {
        "am" => Ok(hour),
        "pm" => Ok(hour + 12),
        _ => Err(invalid()),
    }
}

/// Does `candidate` conflict with an already accepted timeframe?
pub fn timeframes_conflict(candidate: &Timeframe, accepted: &Timeframe) -> Result<bool, BookingError> {
    let candidate = candidate.convert()?;
    let accepted = accepted.convert()?;
    Ok(candidate.conflicts_with(&accepted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tf(start: &str, end: &str) -> Timeframe {
        Timeframe::new(start, end)
    }

    #[test]
    fn convert_basic_tokens() {
        assert_eq!(convert_time("9am").unwrap(), 9);
        assert_eq!(convert_time("5pm").unwrap(), 17);
        assert_eq!(convert_time("1pm").unwrap(), 13);
    }

    #[test]
    fn convert_noon_and_midnight_quirk() {
        assert_eq!(convert_time("12am").unwrap(), 12);
        assert_eq!(convert_time("12pm").unwrap(), 24);
    }

    #[test]
    fn convert_is_case_insensitive() {
        assert_eq!(convert_time("5PM").unwrap(), 17);
        assert_eq!(convert_time("9Am").unwrap(), 9);
        assert_eq!(convert_time(" 10am ").unwrap(), 10);
        assert_eq!(convert_time("09am").unwrap(), 9);
    }

    #[test]
    fn convert_rejects_garbage() {
        for token in ["", "am", "pm", "noon", "9", "9xm", "9 am", "13pm", "99999999999am", "-1am"] {
            assert!(
                matches!(convert_time(token), Err(BookingError::InvalidTimeFormat(_))),
                "expected {token:?} to be rejected"
            );
        }
    }

    #[test]
    fn conflict_when_candidate_inside_accepted() {
        // accepted is 9..24 on the converted scale
        assert!(timeframes_conflict(&tf("10am", "11am"), &tf("9am", "12pm")).unwrap());
    }

    #[test]
    fn conflict_on_partial_overlap() {
        assert!(timeframes_conflict(&tf("8am", "10am"), &tf("9am", "11am")).unwrap());
        assert!(timeframes_conflict(&tf("10am", "1pm"), &tf("9am", "11am")).unwrap());
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        assert!(!timeframes_conflict(&tf("9am", "10am"), &tf("10am", "11am")).unwrap());
        assert!(!timeframes_conflict(&tf("11am", "1pm"), &tf("10am", "11am")).unwrap());
    }

    #[test]
    fn containment_is_not_detected() {
        // 8..13 swallows 9..10 but neither endpoint is strictly inside it
        assert!(!timeframes_conflict(&tf("8am", "1pm"), &tf("9am", "10am")).unwrap());
    }

    #[test]
    fn exact_match_is_not_detected() {
        assert!(!timeframes_conflict(&tf("9am", "11am"), &tf("9am", "11am")).unwrap());
    }

    #[test]
    fn conflict_is_asymmetric() {
        let small = tf("9am", "10am");
        let large = tf("8am", "1pm");
        assert!(timeframes_conflict(&small, &large).unwrap());
        assert!(!timeframes_conflict(&large, &small).unwrap());
    }

    #[test]
    fn conflict_propagates_bad_tokens() {
        let err = timeframes_conflict(&tf("nine", "10am"), &tf("9am", "11am")).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTimeFormat(t) if t == "nine"));
        let err = timeframes_conflict(&tf("9am", "10am"), &tf("9am", "eleven")).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTimeFormat(_)));
    }

    #[test]
    fn hours_requires_ordered_range() {
        assert_eq!(tf("9am", "5pm").hours().unwrap(), HourRange { start: 9, end: 17 });
        assert!(matches!(
            tf("5pm", "9am").hours(),
            Err(BookingError::InvalidTimeframe { .. })
        ));
        assert!(matches!(
            tf("9am", "9am").hours(),
            Err(BookingError::InvalidTimeframe { .. })
        ));
        // 12pm sits at the top of the scale, so it can't start a range
        assert!(tf("12pm", "1pm").hours().is_err());
        assert!(tf("12am", "12pm").hours().is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(tf("9am", "5pm").to_string(), "[9am, 5pm]");
    }
}
