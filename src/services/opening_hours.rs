// src/services/opening_hours.rs
// DOCUMENTATION: Opening hours evaluation in Korea Standard Time
// PURPOSE: isOpenNow for enterprise detail and validation of weekly schedules

use crate::db::HoursRow;
use crate::errors::DirectoryError;
use crate::models::{ClosedDay, EnterpriseHours, HoursEntry};
use chrono::{Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};

/// KST is UTC+9 with no daylight saving
const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Current wall-clock time in Korea
pub fn now_kst() -> NaiveDateTime {
    match FixedOffset::east_opt(KST_OFFSET_SECS) {
        Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
        None => Utc::now().naive_utc(),
    }
}

/// Parse "HH:MM" or "HH:MM:SS"
pub fn parse_time(value: &str) -> Result<NaiveTime, DirectoryError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| DirectoryError::InvalidInput(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Validate a submitted weekly schedule and convert it to rows
pub fn validate_schedule(entries: &[HoursEntry]) -> Result<Vec<HoursRow>, DirectoryError> {
    if entries.len() > 7 {
        return Err(DirectoryError::InvalidInput(
            "At most 7 days can be provided".to_string(),
        ));
    }

    let mut seen = [false; 7];
    let mut rows = Vec::with_capacity(entries.len());

    for entry in entries {
        let day = usize::try_from(entry.day_of_week)
            .ok()
            .filter(|d| *d < 7)
            .ok_or_else(|| DirectoryError::InvalidInput("dayOfWeek must be 0-6".to_string()))?;
        if seen[day] {
            return Err(DirectoryError::InvalidInput(format!(
                "Duplicate dayOfWeek {}",
                day
            )));
        }
        seen[day] = true;

        if entry.is_closed {
            rows.push(HoursRow {
                day_of_week: entry.day_of_week,
                is_closed: true,
                open_time: None,
                close_time: None,
            });
            continue;
        }

        let (Some(open), Some(close)) = (entry.open_time.as_deref(), entry.close_time.as_deref())
        else {
            return Err(DirectoryError::InvalidInput(format!(
                "openTime and closeTime are required for open day {}",
                day
            )));
        };

        rows.push(HoursRow {
            day_of_week: entry.day_of_week,
            is_closed: false,
            open_time: Some(parse_time(open)?),
            close_time: Some(parse_time(close)?),
        });
    }

    Ok(rows)
}

fn day_index(date: chrono::NaiveDate) -> i16 {
    date.weekday().num_days_from_monday() as i16
}

/// Whether the schedule is open at the given local time
/// DOCUMENTATION: A closed date closes the whole calendar day. A period whose
/// close time is not after its open time runs past midnight into the next day.
pub fn is_open_at(hours: &[EnterpriseHours], closed_days: &[ClosedDay], at: NaiveDateTime) -> bool {
    let today = at.date();
    let time = at.time();

    if closed_days.iter().any(|d| d.closed_date == today) {
        return false;
    }

    let period = |day: i16| {
        hours
            .iter()
            .find(|h| h.day_of_week == day && !h.is_closed)
            .and_then(|h| Some((h.open_time?, h.close_time?)))
    };

    if let Some((open, close)) = period(day_index(today)) {
        let open_now = if close > open {
            time >= open && time < close
        } else {
            time >= open
        };
        if open_now {
            return true;
        }
    }

    let yesterday = today - Duration::days(1);
    if closed_days.iter().any(|d| d.closed_date == yesterday) {
        return false;
    }
    match period(day_index(yesterday)) {
        Some((open, close)) if close <= open => time < close,
        _ => false,
    }
}

pub fn is_open_now(hours: &[EnterpriseHours], closed_days: &[ClosedDay]) -> bool {
    is_open_at(hours, closed_days, now_kst())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours(day: i16, open: NaiveTime, close: NaiveTime) -> EnterpriseHours {
        EnterpriseHours {
            day_of_week: day,
            is_closed: false,
            open_time: Some(open),
            close_time: Some(close),
        }
    }

    // 2024-01-01 is a Monday (day 0)
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_time(t(h, m))
    }

    #[test]
    fn test_regular_day() {
        let schedule = vec![hours(0, t(9, 0), t(18, 0))];
        assert!(is_open_at(&schedule, &[], monday_at(9, 0)));
        assert!(is_open_at(&schedule, &[], monday_at(17, 59)));
        assert!(!is_open_at(&schedule, &[], monday_at(18, 0)));
        assert!(!is_open_at(&schedule, &[], monday_at(8, 59)));
        // No row for Tuesday
        assert!(!is_open_at(&schedule, &[], monday_at(10, 0) + Duration::days(1)));
    }

    #[test]
    fn test_overnight_period() {
        // Friday 18:00 - 02:00
        let schedule = vec![hours(4, t(18, 0), t(2, 0))];
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();

        assert!(is_open_at(&schedule, &[], friday.and_time(t(23, 30))));
        assert!(is_open_at(&schedule, &[], saturday.and_time(t(1, 59))));
        assert!(!is_open_at(&schedule, &[], saturday.and_time(t(2, 0))));
        assert!(!is_open_at(&schedule, &[], friday.and_time(t(17, 0))));
    }

    #[test]
    fn test_closed_day_overrides_schedule() {
        let schedule = vec![hours(0, t(9, 0), t(18, 0))];
        let closed = vec![ClosedDay {
            id: Uuid::new_v4(),
            closed_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            note: Some("New Year".to_string()),
        }];
        assert!(!is_open_at(&schedule, &closed, monday_at(12, 0)));
    }

    #[test]
    fn test_validate_schedule() {
        let entries = vec![
            HoursEntry {
                day_of_week: 0,
                is_closed: false,
                open_time: Some("09:00".to_string()),
                close_time: Some("18:30:00".to_string()),
            },
            HoursEntry {
                day_of_week: 6,
                is_closed: true,
                open_time: Some("10:00".to_string()),
                close_time: None,
            },
        ];
        let rows = validate_schedule(&entries).unwrap();
        assert_eq!(rows[0].close_time, Some(t(18, 30)));
        assert!(rows[1].is_closed && rows[1].open_time.is_none());

        let duplicate = vec![entries[0].clone(), entries[0].clone()];
        assert!(validate_schedule(&duplicate).is_err());

        let missing = vec![HoursEntry {
            day_of_week: 2,
            is_closed: false,
            open_time: Some("09:00".to_string()),
            close_time: None,
        }];
        assert!(validate_schedule(&missing).is_err());
        assert!(parse_time("25:00").is_err());
    }
}
