//! Request and response DTOs for the Web API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::resource::{Resource, ResourceFilter};

/// Successful upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Public view link of the uploaded file.
    pub link: String,
}

impl UploadResponse {
    /// Create a success response for the given link.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            success: true,
            link: link.into(),
        }
    }
}

/// Resource query response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceListResponse {
    /// Always true.
    pub success: bool,
    /// Matching resources, newest first. Empty when nothing matches.
    pub data: Vec<Resource>,
}

impl ResourceListResponse {
    /// Create a success response with the given records.
    pub fn new(data: Vec<Resource>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Bare acknowledgement for counter actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    /// Always true.
    pub success: bool,
}

impl AckResponse {
    /// Create an acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Query parameters for `GET /resources`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResourceQuery {
    /// Exact-match college filter.
    pub college: Option<String>,
    /// Exact-match category filter.
    pub category: Option<String>,
    /// Exact-match course filter.
    pub course: Option<String>,
    /// Exact-match semester filter.
    pub semester: Option<String>,
    /// Exact-match subject filter.
    pub subject: Option<String>,
}

impl ResourceQuery {
    /// Convert to a store filter. Empty parameters count as absent.
    pub fn into_filter(self) -> ResourceFilter {
        fn clean(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        ResourceFilter {
            college: clean(self.college),
            category: clean(self.category),
            course: clean(self.course),
            semester: clean(self.semester),
            subject: clean(self.subject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response() {
        let response = UploadResponse::new("https://drive.example.com/x");
        assert!(response.success);
        assert_eq!(response.link, "https://drive.example.com/x");
    }

    #[test]
    fn test_query_into_filter_drops_empty_values() {
        let query = ResourceQuery {
            college: Some("IIT Delhi".to_string()),
            category: Some("".to_string()),
            course: Some("   ".to_string()),
            ..Default::default()
        };

        let filter = query.into_filter();
        assert_eq!(filter.college.as_deref(), Some("IIT Delhi"));
        assert!(filter.category.is_none());
        assert!(filter.course.is_none());
        assert!(filter.semester.is_none());
    }

    #[test]
    fn test_empty_query_is_empty_filter() {
        assert!(ResourceQuery::default().into_filter().is_empty());
    }
}
