use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const MAX_FIELD_LEN: usize = 100;
pub const VALID_STATUSES: [i64; 3] = [0, 1, 2];
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

// Stored employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String, // JSON string: {"phone": "...", "email": "..."}
    pub department: String,
    pub position: String,
    pub location: String,
    pub status: i64,
}

// POST body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String,
    pub department: String,
    pub position: String,
    pub location: String,
    pub status: i64,
}

// PUT body - absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_info: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: Option<i64>,
}

fn check_text(field: &str, value: &str, max_len: Option<usize>) -> ApiResult<()> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ApiError::InvalidRequest(format!("{field}: must not be empty")));
    }
    if let Some(max) = max_len {
        if len > max {
            return Err(ApiError::InvalidRequest(format!(
                "{field}: must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

fn check_status(status: i64) -> ApiResult<()> {
    if !VALID_STATUSES.contains(&status) {
        return Err(ApiError::InvalidRequest(format!("status: must be 0, 1 or 2, got {status}")));
    }
    Ok(())
}

impl EmployeeCreate {
    pub fn validate(&self) -> ApiResult<()> {
        check_text("first_name", &self.first_name, Some(MAX_FIELD_LEN))?;
        check_text("last_name", &self.last_name, Some(MAX_FIELD_LEN))?;
        check_text("contact_info", &self.contact_info, None)?;
        check_text("department", &self.department, Some(MAX_FIELD_LEN))?;
        check_text("position", &self.position, Some(MAX_FIELD_LEN))?;
        check_text("location", &self.location, Some(MAX_FIELD_LEN))?;
        check_status(self.status)
    }
}

impl EmployeeUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        let bounded = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("department", &self.department),
            ("position", &self.position),
            ("location", &self.location),
        ];
        for (field, value) in bounded {
            if let Some(value) = value {
                check_text(field, value, Some(MAX_FIELD_LEN))?;
            }
        }
        if let Some(contact_info) = &self.contact_info {
            check_text("contact_info", contact_info, None)?;
        }
        if let Some(status) = self.status {
            check_status(status)?;
        }
        Ok(())
    }

    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.first_name {
            employee.first_name = v;
        }
        if let Some(v) = self.last_name {
            employee.last_name = v;
        }
        if let Some(v) = self.contact_info {
            employee.contact_info = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.location {
            employee.location = v;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
    }
}

/// Parsed `status` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    AnyOf(Vec<i64>),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> ApiResult<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }

        let mut values = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            let value: i64 = part.parse().map_err(|_| {
                invalid_status(format!("invalid literal for status: '{}'", part))
            })?;
            if !VALID_STATUSES.contains(&value) {
                return Err(invalid_status(format!("Invalid status value: {}", value)));
            }
            if !values.contains(&value) {
                values.push(value);
            }
        }

        Ok(StatusFilter::AnyOf(values))
    }
}

fn invalid_status(reason: String) -> ApiError {
    ApiError::InvalidRequest(format!(
        "Invalid status parameter. Must be 0, 1, 2, all, or comma-separated values. Error: {}",
        reason
    ))
}

// Raw search query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated search criteria handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: StatusFilter,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            name: None,
            department: None,
            position: None,
            location: None,
            status: StatusFilter::All,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

// Empty query values behave as if the parameter was not sent
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<SearchParams> for SearchFilter {
    type Error = ApiError;

    fn try_from(params: SearchParams) -> ApiResult<Self> {
        let status = match params.status.as_deref() {
            Some(raw) => StatusFilter::parse(raw)?,
            None => StatusFilter::All,
        };

        let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ApiError::InvalidRequest(format!(
                "limit: must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        let offset = params.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::InvalidRequest(
                "offset: must be greater than or equal to 0".to_string(),
            ));
        }

        Ok(Self {
            name: non_empty(params.name),
            department: non_empty(params.department),
            position: non_empty(params.position),
            location: non_empty(params.location),
            status,
            limit,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee() -> EmployeeCreate {
        EmployeeCreate {
            first_name: "Mary".into(),
            last_name: "Johnson".into(),
            contact_info: r#"{"phone": "555-0100", "email": "mary@example.com"}"#.into(),
            department: "Engineering".into(),
            position: "Engineer".into(),
            location: "Berlin".into(),
            status: 1,
        }
    }

    #[test]
    fn parses_status_filters() {
        assert_eq!(StatusFilter::parse("all").unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse("ALL").unwrap(), StatusFilter::All);
        assert_eq!(StatusFilter::parse("2").unwrap(), StatusFilter::AnyOf(vec![2]));
        assert_eq!(
            StatusFilter::parse("0, 1,1").unwrap(),
            StatusFilter::AnyOf(vec![0, 1])
        );
    }

    #[test]
    fn rejects_bad_status_filters() {
        for raw in ["3", "0,5", "active", "", "0,,1", "-1"] {
            let err = StatusFilter::parse(raw).unwrap_err();
            assert!(
                err.to_string().starts_with("Invalid status parameter."),
                "{raw}: {err}"
            );
        }
    }

    #[test]
    fn search_defaults_and_bounds() {
        let filter = SearchFilter::try_from(SearchParams::default()).unwrap();
        assert_eq!(filter, SearchFilter::default());

        let params = SearchParams {
            name: Some(String::new()),
            limit: Some(1000),
            offset: Some(20),
            ..Default::default()
        };
        let filter = SearchFilter::try_from(params).unwrap();
        assert_eq!(filter.name, None);
        assert_eq!((filter.limit, filter.offset), (1000, 20));

        for (limit, offset) in [(Some(0), None), (Some(1001), None), (None, Some(-1))] {
            let params = SearchParams {
                limit,
                offset,
                ..Default::default()
            };
            assert!(SearchFilter::try_from(params).is_err());
        }
    }

    #[test]
    fn validates_create_body() {
        assert!(new_employee().validate().is_ok());

        let mut employee = new_employee();
        employee.first_name = String::new();
        assert!(employee.validate().is_err());

        let mut employee = new_employee();
        employee.department = "x".repeat(101);
        assert!(employee.validate().is_err());

        let mut employee = new_employee();
        employee.status = 3;
        assert!(employee.validate().is_err());
    }

    #[test]
    fn update_touches_only_sent_fields() {
        let mut employee = Employee {
            id: 7,
            first_name: "Mary".into(),
            last_name: "Johnson".into(),
            contact_info: "{}".into(),
            department: "Engineering".into(),
            position: "Engineer".into(),
            location: "Berlin".into(),
            status: 1,
        };
        let update = EmployeeUpdate {
            position: Some("Manager".into()),
            status: Some(2),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.apply(&mut employee);

        assert_eq!(employee.position, "Manager");
        assert_eq!(employee.status, 2);
        assert_eq!(employee.first_name, "Mary");

        let bad = EmployeeUpdate {
            last_name: Some(String::new()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
