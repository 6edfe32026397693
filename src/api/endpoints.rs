use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::ApiClient;
use crate::error::{NikeError, Result};

/// Aggregate sport data.
pub const GENERAL_DATA_PATH: &str = "/me/sport";
pub const ACTIVITIES_PATH: &str = "/me/sport/activities";

/// Offset used by the activity listing when none is given.
pub const DEFAULT_OFFSET: u32 = 1;
/// Page size used by the activity listing when none is given.
pub const DEFAULT_COUNT: u32 = 5;

const NO_PARAMS: [(&str, &str); 0] = [];

pub fn activity_details_path(activity_id: &str) -> String {
    format!("{ACTIVITIES_PATH}/{activity_id}")
}

pub fn activity_gps_path(activity_id: &str) -> String {
    format!("{ACTIVITIES_PATH}/{activity_id}/gps")
}

impl ApiClient {
    /// What Nike calls "Aggregate Sport Data": lifetime totals across all activities.
    pub async fn general_data(&self) -> Result<Value> {
        self.request(GENERAL_DATA_PATH, NO_PARAMS).await
    }

    /// The most recent activities, using the API's default paging.
    pub async fn activities(&self) -> Result<Value> {
        self.activities_offset_limit(DEFAULT_OFFSET, DEFAULT_COUNT).await
    }

    /// Retrieves `count` activities starting from `offset`.
    pub async fn activities_offset_limit(&self, offset: u32, count: u32) -> Result<Value> {
        self.request(ACTIVITIES_PATH, [("offset", offset), ("count", count)]).await
    }

    /// Retrieves activities between two `yyyy-mm-dd` dates.
    ///
    /// The result is paginated; its `paging.next` field holds the next page's URL.
    /// Fails without making a request if `start_date` falls after `end_date`.
    pub async fn activities_date_from_to(&self, start_date: &str, end_date: &str) -> Result<Value> {
        check_date_range(start_date, end_date)?;
        self.request(
            ACTIVITIES_PATH,
            [("startDate", start_date), ("endDate", end_date)],
        )
        .await
    }

    pub async fn activity_details(&self, activity_id: &str) -> Result<Value> {
        self.request(&activity_details_path(activity_id), NO_PARAMS).await
    }

    /// GPS waypoints recorded during an activity.
    pub async fn activity_gps(&self, activity_id: &str) -> Result<Value> {
        self.request(&activity_gps_path(activity_id), NO_PARAMS).await
    }
}

/// Only the ordering is checked; dates we can't read are left to the API to reject.
fn check_date_range(start_date: &str, end_date: &str) -> Result<()> {
    if let (Some(start), Some(end)) = (parse_date(start_date), parse_date(end_date)) {
        if start > end {
            return Err(NikeError::InvalidArgument(format!(
                "end date {end_date} is before start date {start_date}"
            )));
        }
    }
    Ok(())
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn activity_paths_embed_the_id() {
        assert_eq!(activity_details_path("abc123"), "/me/sport/activities/abc123");
        assert_eq!(activity_gps_path("abc123"), "/me/sport/activities/abc123/gps");
    }

    #[test]
    fn start_after_end_is_rejected() {
        let error = check_date_range("2020-06-01", "2020-01-01").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn ordered_or_equal_dates_are_accepted() {
        assert!(check_date_range("2020-01-01", "2020-06-01").is_ok());
        assert!(check_date_range("2020-01-01", "2020-01-01").is_ok());
    }

    #[test]
    fn timestamps_compare_by_date() {
        assert!(check_date_range("2020-06-01T10:00:00Z", "2020-01-01").is_err());
    }

    #[test]
    fn unreadable_dates_are_not_validated() {
        assert!(check_date_range("yesterday", "2020-01-01").is_ok());
    }
}
