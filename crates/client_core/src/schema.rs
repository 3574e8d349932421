//! Per-resource configuration: the field schema a view edits and the REST
//! endpoints its collection lives behind. Books and users differ only here.

use serde_json::Value;
use shared::domain::{Fields, ResourceId};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub default: Value,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Value::String(String::new()),
        }
    }

    pub fn nullable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    /// Display name of one record, e.g. "Book".
    pub singular: String,
    /// Lowercase collection name used in messages, e.g. "books".
    pub plural: String,
    pub fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    /// A fresh add-draft: every field at its default.
    pub fn default_draft(&self) -> Fields {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    pub list_path: String,
    pub create_path: String,
    /// Prefix for item routes; the record id is appended as the last segment.
    pub item_path: String,
    pub lookup_path: Option<String>,
    /// Key under `data` that holds the list in list responses.
    pub collection_key: String,
}

impl EndpointSet {
    pub fn item(&self, id: ResourceId) -> String {
        format!("{}/{}", self.item_path.trim_end_matches('/'), id)
    }

    pub fn lookup_key(&self) -> Option<&str> {
        self.lookup_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Books,
    Users,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceProfile {
    pub kind: ResourceKind,
    pub schema: ResourceSchema,
    pub endpoints: EndpointSet,
}

impl ResourceProfile {
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Books => Self::books(),
            ResourceKind::Users => Self::users(),
        }
    }

    pub fn books() -> Self {
        Self {
            kind: ResourceKind::Books,
            schema: ResourceSchema {
                singular: "Book".into(),
                plural: "books".into(),
                fields: vec![
                    FieldSpec::text("title"),
                    FieldSpec::text("author"),
                    FieldSpec::text("year"),
                    FieldSpec::text("description"),
                    FieldSpec::nullable("category_id"),
                ],
            },
            endpoints: EndpointSet {
                list_path: "/api/books".into(),
                create_path: "/api/book".into(),
                item_path: "/api/books".into(),
                lookup_path: Some("/api/category".into()),
                collection_key: "books".into(),
            },
        }
    }

    pub fn users() -> Self {
        Self {
            kind: ResourceKind::Users,
            schema: ResourceSchema {
                singular: "User".into(),
                plural: "users".into(),
                fields: vec![
                    FieldSpec::text("username"),
                    FieldSpec::text("password"),
                    FieldSpec::text("fullname"),
                    FieldSpec::text("status"),
                    FieldSpec::nullable("level_id"),
                ],
            },
            endpoints: EndpointSet {
                list_path: "/api/users".into(),
                create_path: "/api/users".into(),
                item_path: "/api/users".into(),
                lookup_path: None,
                collection_key: "users".into(),
            },
        }
    }
}
