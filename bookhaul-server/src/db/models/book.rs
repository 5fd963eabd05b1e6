//! Book Model

use serde::{Deserialize, Serialize};
use shared::Category;
use surrealdb::RecordId;

use super::serde_helpers;

/// Uploaded image reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    pub public_id: String,
}

impl ImageRef {
    /// Build from a URL, deriving the public id from its last path segment
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let public_id = public_id_from_url(&url);
        Self { url, public_id }
    }
}

/// Last path segment without query string or extension
pub fn public_id_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => segment.to_string(),
    }
}

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    pub author: String,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    /// Publication year
    #[serde(default)]
    pub publication_date: Option<i64>,
    pub price: f64,
    #[serde(default)]
    pub old_price: Option<f64>,
    pub cover_image: ImageRef,
    /// Units in stock, never negative
    pub quantity: i64,
    #[serde(default)]
    pub sold: i64,
    #[serde(default)]
    pub trending: bool,
    /// Mean review rating, one decimal place
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Book {
    /// "book:key" form of the id, empty for unsaved books
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Partial update merged into an existing book
///
/// Absent fields stay untouched; `Some(0)` quantity is a real update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending: Option<bool>,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url("http://localhost:5000/api/images/abc123.png"),
            "abc123"
        );
        assert_eq!(public_id_from_url("https://cdn.example/x/cover.jpg?w=200"), "cover");
        assert_eq!(public_id_from_url("https://cdn.example/x/noext"), "noext");
        assert_eq!(public_id_from_url("plain"), "plain");
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = BookPatch {
            quantity: Some(0),
            updated_at: 42,
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"quantity": 0, "updatedAt": 42}));
    }

    #[test]
    fn test_book_json_shape() {
        let json = serde_json::json!({
            "id": "book:dune",
            "title": "Dune",
            "author": "Frank Herbert",
            "category": "Science Fiction",
            "price": 12.5,
            "coverImage": {"url": "u", "publicId": "p"},
            "quantity": 3,
            "createdAt": 1,
            "updatedAt": 1
        });
        let book: Book = serde_json::from_value(json).unwrap();
        assert_eq!(book.id_string(), "book:dune");
        assert_eq!(book.category, Category::ScienceFiction);
        assert_eq!(book.sold, 0);
        assert_eq!(book.average_rating, 0.0);

        let out = serde_json::to_value(&book).unwrap();
        assert_eq!(out["id"], "book:dune");
        assert_eq!(out["coverImage"]["publicId"], "p");
    }
}
