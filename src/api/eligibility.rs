use crate::errors::ApiError;
use chrono::{Duration, NaiveDate};

/// Creation-time admissibility check for a requested absence window.
///
/// `recorded_end` is the end date of the requester's most recently accepted
/// absence; a new request must start strictly after it. Acceptance trusts
/// whatever range was stored here, so this is the only place the window is
/// enforced.
pub fn check_window(
    start: NaiveDate,
    end: NaiveDate,
    recorded_end: Option<NaiveDate>,
) -> Result<(), ApiError> {
    if end < start {
        return Err(ApiError::bad_request("End date cannot precede start date"));
    }

    if let Some(last_end) = recorded_end {
        if start <= last_end {
            let earliest = last_end + Duration::days(1);
            return Err(ApiError::bad_request(format!(
                "Your last accepted absence ends on {last_end}; a new absence may start on {earliest} at the earliest"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn end_before_start_always_fails() {
        let err = check_window(d("2024-03-15"), d("2024-03-10"), None).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn single_day_absence_is_valid() {
        assert!(check_window(d("2024-03-15"), d("2024-03-15"), None).is_ok());
    }

    #[test]
    fn no_recorded_end_date_means_any_start() {
        assert!(check_window(d("2020-01-01"), d("2020-01-05"), None).is_ok());
    }

    #[test]
    fn start_on_recorded_end_date_is_rejected_and_names_it() {
        let err = check_window(d("2024-03-10"), d("2024-03-15"), Some(d("2024-03-10"))).unwrap_err();
        match err {
            ApiError::BadRequest(msg) => {
                assert!(msg.contains("2024-03-10"));
                assert!(msg.contains("2024-03-11"));
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn start_before_recorded_end_date_is_rejected() {
        let err = check_window(d("2024-03-05"), d("2024-03-08"), Some(d("2024-03-10"))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn start_day_after_recorded_end_date_is_accepted() {
        assert!(check_window(d("2024-03-11"), d("2024-03-15"), Some(d("2024-03-10"))).is_ok());
    }
}
