use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::TextPayload;

/// Identifier wrapper for franchise locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FranchiseId(pub u64);

/// Identifier for the back-office account that owns one or more franchises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

/// Non-owning reference to the owning back-office account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: OwnerId,
    pub email: Option<String>,
}

/// Canonical franchise row held by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: FranchiseId,
    pub name: String,
    pub slug: String,
    pub city: String,
    /// Alias-resolved city used for enquiry routing.
    pub city_key: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub owner: OwnerRef,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Franchise {
    pub fn from_new(id: FranchiseId, new: NewFranchise) -> Self {
        Self {
            id,
            name: new.name,
            slug: new.slug,
            city: new.city,
            city_key: new.city_key,
            state: new.state,
            country: new.country,
            address: new.address,
            contact_email: new.contact_email,
            contact_phone: new.contact_phone,
            owner: new.owner,
            is_active: true,
            created_at: new.created_at,
        }
    }

    pub fn reference(&self) -> FranchiseRef {
        FranchiseRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn public_view(&self) -> PublicFranchiseView {
        PublicFranchiseView {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
        }
    }
}

/// Validated franchise awaiting an identifier from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFranchise {
    pub name: String,
    pub slug: String,
    pub city: String,
    pub city_key: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub owner: OwnerRef,
    pub created_at: DateTime<Utc>,
}

/// Lightweight link stored on records that point at a franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FranchiseRef {
    pub id: FranchiseId,
    pub name: String,
}

/// Untrusted back-office payload for creating a franchise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FranchiseRegistration {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl TextPayload for FranchiseRegistration {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "slug",
        "city",
        "state",
        "country",
        "address",
        "contact_email",
        "contact_phone",
    ];
}

/// Fields safe to expose on the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicFranchiseView {
    pub id: FranchiseId,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
}

/// Active franchise count per location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationSummary {
    pub city: String,
    pub state: String,
    pub country: String,
    pub franchise_count: usize,
}
