use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::directory::{DirectoryError, FranchiseDirectory};
use super::domain::{
    Franchise, FranchiseId, FranchiseRegistration, LocationSummary, NewFranchise, OwnerRef,
};
use super::slug::{candidates, slugify, MAX_SLUG_LEN};
use crate::validation::{FieldErrors, ValidationError};
use crate::workflows::cities::CityAliases;

const MAX_SLUG_ATTEMPTS: usize = 1_000;

/// Directory operations for the back office and the public site.
pub struct FranchiseDirectoryService<D> {
    directory: Arc<D>,
    cities: Arc<CityAliases>,
}

impl<D> FranchiseDirectoryService<D>
where
    D: FranchiseDirectory + 'static,
{
    pub fn new(directory: Arc<D>, cities: Arc<CityAliases>) -> Self {
        Self { directory, cities }
    }

    /// Validate and store a new franchise under a unique slug.
    pub fn register(
        &self,
        registration: FranchiseRegistration,
        owner: OwnerRef,
    ) -> Result<Franchise, FranchiseServiceError> {
        let mut errors = FieldErrors::default();
        let name = errors.required("name", registration.name, 255);
        let city = errors.required("city", registration.city, 100);
        let contact_email = errors.required_email("contact_email", registration.contact_email);
        let contact_phone = errors.required("contact_phone", registration.contact_phone, 30);
        let state = errors.optional("state", registration.state, 100);
        let country = errors.optional("country", registration.country, 100);
        let address = errors.optional("address", registration.address, 1_000);
        let requested_slug = errors.optional("slug", registration.slug, MAX_SLUG_LEN);

        let (Some(name), Some(city), Some(contact_email), Some(contact_phone)) =
            (name, city, contact_email, contact_phone)
        else {
            return Err(errors.into_error().into());
        };
        if !errors.is_empty() {
            return Err(errors.into_error().into());
        }

        let city_key = self.cities.normalize(&city).unwrap_or_default();
        let base = slugify(requested_slug.as_deref().unwrap_or(&name));
        let template = NewFranchise {
            name,
            slug: String::new(),
            city,
            city_key,
            state,
            country,
            address,
            contact_email,
            contact_phone,
            owner,
            created_at: Utc::now(),
        };

        for slug in candidates(&base).take(MAX_SLUG_ATTEMPTS) {
            let mut candidate = template.clone();
            candidate.slug = slug;
            match self.directory.insert(candidate) {
                Ok(franchise) => {
                    info!(franchise_id = franchise.id.0, slug = %franchise.slug, "franchise registered");
                    return Ok(franchise);
                }
                Err(DirectoryError::SlugTaken(_)) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(FranchiseServiceError::SlugExhausted(base))
    }

    /// Active franchise for a public page.
    pub fn public_detail(&self, slug: &str) -> Result<Franchise, FranchiseServiceError> {
        self.directory
            .find_by_slug(slug)?
            .ok_or_else(|| FranchiseServiceError::NotFound(slug.to_string()))
    }

    /// Active franchises filtered by case-insensitive substrings, ordered by name.
    pub fn public_list(
        &self,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Vec<Franchise>, FranchiseServiceError> {
        let city = needle(city);
        let state = needle(state);

        let mut franchises: Vec<Franchise> = self
            .directory
            .list()?
            .into_iter()
            .filter(|franchise| franchise.is_active)
            .filter(|franchise| contains(Some(&franchise.city), city.as_deref()))
            .filter(|franchise| contains(franchise.state.as_ref(), state.as_deref()))
            .collect();
        franchises.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(franchises)
    }

    /// Active franchise counts grouped by city, state, and country.
    pub fn locations(&self) -> Result<Vec<LocationSummary>, FranchiseServiceError> {
        let mut grouped: BTreeMap<(String, String, String), usize> = BTreeMap::new();
        for franchise in self.directory.list()? {
            if !franchise.is_active {
                continue;
            }
            let key = (
                franchise.city,
                franchise.state.unwrap_or_default(),
                franchise.country.unwrap_or_default(),
            );
            *grouped.entry(key).or_default() += 1;
        }

        Ok(grouped
            .into_iter()
            .map(|((city, state, country), franchise_count)| LocationSummary {
                city,
                state,
                country,
                franchise_count,
            })
            .collect())
    }

    pub fn set_active(
        &self,
        id: FranchiseId,
        active: bool,
    ) -> Result<Franchise, FranchiseServiceError> {
        match self.directory.set_active(id, active) {
            Ok(franchise) => {
                info!(franchise_id = id.0, active, "franchise visibility changed");
                Ok(franchise)
            }
            Err(DirectoryError::NotFound) => Err(FranchiseServiceError::NotFound(id.0.to_string())),
            Err(other) => Err(other.into()),
        }
    }
}

fn needle(value: Option<&str>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_lowercase())
        .filter(|raw| !raw.is_empty())
}

fn contains(haystack: Option<&String>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack
            .map(|value| value.to_lowercase().contains(needle))
            .unwrap_or(false),
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum FranchiseServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("franchise '{0}' not found")]
    NotFound(String),
    #[error("no free slug derived from '{0}'")]
    SlugExhausted(String),
}
