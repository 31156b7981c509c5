//! API Data Transfer Objects
//!
//! Request and response payloads exchanged with the notes backend. These
//! mirror the backend contracts field for field; the envelope around them
//! lives in [`super::envelope`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Tenants
// ============================================

/// Membership role inside a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    Owner,
    Admin,
    Member,
}

impl fmt::Display for TenantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TenantRole::Owner => "owner",
            TenantRole::Admin => "admin",
            TenantRole::Member => "member",
        };
        f.write_str(s)
    }
}

/// A tenant (workspace)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Tenant as listed for the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Option<TenantRole>,
    #[serde(default)]
    pub member_count: Option<u32>,
}

/// `GET /me/tenants`, `GET /tenants`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTenantsResponse {
    #[serde(default)]
    pub tenants: Vec<TenantSummary>,
}

/// `POST /tenants`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTenantResponse {
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// `POST /tenants/:id/leave`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTenantResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub result: String,
}

// ============================================
// Notes
// ============================================

/// A note inside a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub tenant_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<String>,
}

/// `GET /tenants/:id/notes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTenantNotesResponse {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub total: u64,
}

/// `POST /tenants/:id/notes` and `PATCH /notes/:id` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteContentRequest {
    pub content: String,
}

/// Note as returned by create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: String,
    pub tenant_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `DELETE /notes/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    pub note_id: String,
    pub result: String,
}
