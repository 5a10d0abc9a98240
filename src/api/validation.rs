use super::ApiError;
use super::types::IncidentQuery;
use crate::db::IncidentFilter;
use crate::domain::IncidentId;

const MAX_TITLE_LEN: usize = 255;

pub fn validate_incident_id(id: i32) -> Result<IncidentId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid incident ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(IncidentId::new(id))
}

/// Trimmed, non-blank title.
pub fn validate_title(title: Option<&str>) -> Result<String, ApiError> {
    let trimmed = title.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Title cannot be empty!"));
    }

    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Title must be {} characters or less",
            MAX_TITLE_LEN
        )));
    }

    Ok(trimmed.to_string())
}

pub fn validate_year(year: i32) -> Result<i32, ApiError> {
    if !(1..=9999).contains(&year) {
        return Err(ApiError::validation(format!(
            "Invalid year: {}. Year must be between 1 and 9999",
            year
        )));
    }
    Ok(year)
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates and returns an
/// RFC 3339 string.
pub fn validate_date(date: &str) -> Result<String, ApiError> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(date) {
        return Ok(parsed.to_rfc3339());
    }

    if let Ok(day) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        let midnight = day.and_time(chrono::NaiveTime::MIN).and_utc();
        return Ok(midnight.to_rfc3339());
    }

    Err(ApiError::validation(format!(
        "Invalid date: {}. Expected RFC 3339 or YYYY-MM-DD",
        date
    )))
}

/// Empty query values count as absent.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn parse_incident_filter(query: &IncidentQuery) -> Result<IncidentFilter, ApiError> {
    let year = match present(query.year.as_ref()) {
        Some(raw) => {
            let year = raw.parse::<i32>().map_err(|_| {
                ApiError::validation(format!("Invalid year filter: {}. Expected an integer", raw))
            })?;
            Some(validate_year(year)?)
        }
        None => None,
    };

    let published = match present(query.published.as_ref()) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(ApiError::validation(format!(
                "Invalid published filter: {}. Expected true or false",
                other
            )));
        }
        None => None,
    };

    Ok(IncidentFilter {
        title: present(query.title.as_ref()).map(str::to_string),
        year,
        kind: present(query.kind.as_ref()).map(str::to_string),
        status: present(query.status.as_ref()).map(str::to_string),
        published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_incident_id() {
        assert_eq!(validate_incident_id(1).unwrap(), IncidentId::new(1));
        assert!(validate_incident_id(0).is_err());
        assert!(validate_incident_id(-5).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title(Some("  Fire  ")).unwrap(), "Fire");
        assert!(validate_title(None).is_err());
        assert!(validate_title(Some("   ")).is_err());
        assert!(validate_title(Some(&"x".repeat(256))).is_err());
        assert!(validate_title(Some(&"x".repeat(255))).is_ok());
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("2024-05-06").unwrap(),
            "2024-05-06T00:00:00+00:00"
        );
        assert_eq!(
            validate_date("2024-05-06T10:30:00+02:00").unwrap(),
            "2024-05-06T10:30:00+02:00"
        );
        assert!(validate_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_incident_filter() {
        let query = IncidentQuery {
            title: Some("leak".to_string()),
            year: Some("2023".to_string()),
            kind: Some(String::new()),
            status: None,
            published: Some("true".to_string()),
        };

        let filter = parse_incident_filter(&query).unwrap();
        assert_eq!(filter.title.as_deref(), Some("leak"));
        assert_eq!(filter.year, Some(2023));
        assert_eq!(filter.kind, None);
        assert_eq!(filter.published, Some(true));
    }

    #[test]
    fn test_parse_incident_filter_rejects_garbage() {
        let query = IncidentQuery {
            year: Some("twenty".to_string()),
            ..IncidentQuery::default()
        };
        assert!(parse_incident_filter(&query).is_err());

        let query = IncidentQuery {
            published: Some("yes".to_string()),
            ..IncidentQuery::default()
        };
        assert!(parse_incident_filter(&query).is_err());
    }
}
