use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

/// Partial edit. Absent fields keep their prior values; the owner is never
/// part of the payload contract and client-supplied ids are ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateBookmarkRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}
