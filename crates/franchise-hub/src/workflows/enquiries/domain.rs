use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::TextPayload;
use crate::workflows::franchises::domain::{Franchise, FranchiseId, FranchiseRef};

/// Identifier wrapper for persisted enquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnquiryId(pub u64);

impl fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the visitor is enquiring about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnquiryType {
    #[serde(rename = "ADMISSION")]
    Admission,
    #[serde(rename = "FRANCHISE_OPPORTUNITY", alias = "FRANCHISE")]
    FranchiseOpportunity,
    #[serde(rename = "CONTACT")]
    Contact,
}

impl EnquiryType {
    pub const ALL: [EnquiryType; 3] = [
        EnquiryType::Admission,
        EnquiryType::FranchiseOpportunity,
        EnquiryType::Contact,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            EnquiryType::Admission => "ADMISSION",
            EnquiryType::FranchiseOpportunity => "FRANCHISE_OPPORTUNITY",
            EnquiryType::Contact => "CONTACT",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            EnquiryType::Admission => "Admission",
            EnquiryType::FranchiseOpportunity => "Franchise Opportunity",
            EnquiryType::Contact => "Contact",
        }
    }

    /// Exact wire code; the legacy `FRANCHISE` code is accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ADMISSION" => Some(EnquiryType::Admission),
            "FRANCHISE_OPPORTUNITY" | "FRANCHISE" => Some(EnquiryType::FranchiseOpportunity),
            "CONTACT" => Some(EnquiryType::Contact),
            _ => None,
        }
    }
}

/// Back-office workflow state. New records always start at `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnquiryStatus {
    #[default]
    #[serde(rename = "new")]
    New,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "closed")]
    Closed,
}

impl EnquiryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnquiryStatus::New => "new",
            EnquiryStatus::InProgress => "in-progress",
            EnquiryStatus::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "new" => Some(EnquiryStatus::New),
            "in-progress" => Some(EnquiryStatus::InProgress),
            "closed" => Some(EnquiryStatus::Closed),
            _ => None,
        }
    }
}

/// Untrusted intake payload as posted by the public site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnquirySubmission {
    #[serde(alias = "type")]
    pub enquiry_type: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub city: Option<String>,
    pub child_age: Option<String>,
    pub franchise_slug: Option<String>,
}

impl TextPayload for EnquirySubmission {
    const FIELDS: &'static [&'static str] = &[
        "enquiry_type",
        "type",
        "name",
        "email",
        "phone",
        "message",
        "city",
        "child_age",
        "franchise_slug",
    ];
}

/// Validated enquiry fields shared by the global record and every fan-out copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryDraft {
    pub enquiry_type: EnquiryType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub city: Option<String>,
    pub child_age: Option<String>,
}

/// Enquiry awaiting an identifier from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnquiry {
    pub draft: EnquiryDraft,
    pub franchise: Option<FranchiseRef>,
    pub created_at: DateTime<Utc>,
}

impl NewEnquiry {
    pub fn global(draft: EnquiryDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            draft,
            franchise: None,
            created_at,
        }
    }

    pub fn scoped(draft: EnquiryDraft, franchise: &Franchise, created_at: DateTime<Utc>) -> Self {
        Self {
            draft,
            franchise: Some(franchise.reference()),
            created_at,
        }
    }
}

/// Persisted enquiry. `franchise == None` marks a globally visible back-office record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryRecord {
    pub id: EnquiryId,
    pub enquiry_type: EnquiryType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub city: Option<String>,
    pub child_age: Option<String>,
    pub status: EnquiryStatus,
    pub franchise: Option<FranchiseRef>,
    pub created_at: DateTime<Utc>,
}

impl EnquiryRecord {
    pub fn from_new(id: EnquiryId, new: NewEnquiry) -> Self {
        let NewEnquiry {
            draft,
            franchise,
            created_at,
        } = new;

        Self {
            id,
            enquiry_type: draft.enquiry_type,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            message: draft.message,
            city: draft.city,
            child_age: draft.child_age,
            status: EnquiryStatus::New,
            franchise,
            created_at,
        }
    }

    pub fn is_global(&self) -> bool {
        self.franchise.is_none()
    }

    pub fn franchise_id(&self) -> Option<FranchiseId> {
        self.franchise.as_ref().map(|franchise| franchise.id)
    }

    pub fn view(&self) -> EnquiryView {
        EnquiryView {
            id: self.id,
            enquiry_type: self.enquiry_type,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            message: self.message.clone(),
            city: self.city.clone(),
            child_age: self.child_age.clone(),
            status: self.status,
            franchise: self.franchise_id(),
            franchise_name: self.franchise.as_ref().map(|franchise| franchise.name.clone()),
            created_at: self.created_at,
        }
    }
}

/// Response representation returned by intake and listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnquiryView {
    pub id: EnquiryId,
    pub enquiry_type: EnquiryType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub city: Option<String>,
    pub child_age: Option<String>,
    pub status: EnquiryStatus,
    pub franchise: Option<FranchiseId>,
    pub franchise_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enquiry_type_parse_accepts_exact_codes_only() {
        assert_eq!(EnquiryType::parse(" ADMISSION "), Some(EnquiryType::Admission));
        assert_eq!(EnquiryType::parse("admission"), None);
        assert_eq!(EnquiryType::parse("franchise opportunity"), None);
        assert_eq!(EnquiryType::parse("franchise-opportunity"), None);
        assert_eq!(
            EnquiryType::parse("FRANCHISE"),
            Some(EnquiryType::FranchiseOpportunity)
        );
        assert_eq!(EnquiryType::parse("careers"), None);
        for kind in EnquiryType::ALL {
            assert_eq!(EnquiryType::parse(kind.code()), Some(kind));
        }
    }

    #[test]
    fn status_parse_matches_wire_labels() {
        assert_eq!(EnquiryStatus::parse("in-progress"), Some(EnquiryStatus::InProgress));
        assert_eq!(EnquiryStatus::parse("archived"), None);
        assert_eq!(EnquiryStatus::parse("Closed"), None);
    }

    #[test]
    fn status_serializes_with_wire_labels() {
        let encoded = serde_json::to_string(&EnquiryStatus::InProgress).expect("encodes");
        assert_eq!(encoded, "\"in-progress\"");
        let decoded: EnquiryStatus = serde_json::from_str("\"closed\"").expect("decodes");
        assert_eq!(decoded, EnquiryStatus::Closed);
        assert_eq!(EnquiryStatus::default(), EnquiryStatus::New);
    }

    #[test]
    fn submission_accepts_type_alias() {
        let submission: EnquirySubmission =
            serde_json::from_str(r#"{"type":"CONTACT","name":"A"}"#).expect("decodes");
        assert_eq!(submission.enquiry_type.as_deref(), Some("CONTACT"));
        assert_eq!(submission.email, None);
    }
}
