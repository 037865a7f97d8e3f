use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    EnquiryDraft, EnquiryId, EnquiryRecord, EnquiryStatus, EnquirySubmission, EnquiryType,
    NewEnquiry,
};
use super::intake::{self, ValidatedSubmission};
use super::notification::{EnquiryNotification, EnquiryNotifier};
use super::repository::{EnquiryFilter, EnquiryRepository, RepositoryError};
use crate::validation::ValidationError;
use crate::workflows::cities::CityAliases;
use crate::workflows::franchises::directory::{DirectoryError, FranchiseDirectory};
use crate::workflows::franchises::domain::{Franchise, FranchiseId, OwnerId};

/// Knobs the intake service needs from configuration.
#[derive(Debug, Clone)]
pub struct IntakeSettings {
    pub back_office_address: String,
    pub cities: Arc<CityAliases>,
}

/// Service composing validation, franchise routing, persistence, and notification.
pub struct EnquiryIntakeService<R, D, N> {
    repository: Arc<R>,
    directory: Arc<D>,
    notifier: Arc<N>,
    settings: IntakeSettings,
}

/// What `submit` persisted, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// The one record handed back to the caller.
    pub record: EnquiryRecord,
    pub route: SubmissionRoute,
    /// Franchise-scoped copies written on the general path.
    pub fan_out: Vec<EnquiryId>,
    /// Matched franchises whose copy could not be written.
    pub failed_copies: Vec<FranchiseId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionRoute {
    Direct,
    General,
}

impl SubmissionRoute {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionRoute::Direct => "direct",
            SubmissionRoute::General => "general",
        }
    }
}

impl<R, D, N> EnquiryIntakeService<R, D, N>
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        notifier: Arc<N>,
        settings: IntakeSettings,
    ) -> Self {
        Self {
            repository,
            directory,
            notifier,
            settings,
        }
    }

    /// Submit an enquiry, returning the single record the caller is allowed to see.
    pub fn submit(
        &self,
        submission: EnquirySubmission,
    ) -> Result<EnquiryRecord, EnquiryServiceError> {
        self.submit_detailed(submission).map(|outcome| outcome.record)
    }

    /// Submit an enquiry and report every row written.
    ///
    /// A resolvable `franchise_slug` produces one private record tied to that franchise.
    /// Anything else produces one global record plus a copy per active franchise in the
    /// normalized city. The global record is committed first; copies are best-effort.
    pub fn submit_detailed(
        &self,
        submission: EnquirySubmission,
    ) -> Result<SubmissionOutcome, EnquiryServiceError> {
        let ValidatedSubmission {
            mut draft,
            franchise_slug,
        } = intake::validate(submission)?;
        let created_at = Utc::now();

        if let Some(franchise) = franchise_slug
            .as_deref()
            .and_then(|slug| self.resolve_slug(slug))
        {
            let record = self
                .repository
                .insert(NewEnquiry::scoped(draft, &franchise, created_at))?;
            info!(
                enquiry_id = record.id.0,
                enquiry_type = record.enquiry_type.code(),
                franchise_id = franchise.id.0,
                route = SubmissionRoute::Direct.label(),
                "enquiry stored"
            );
            self.dispatch_notification(&record, Some(&franchise));

            return Ok(SubmissionOutcome {
                record,
                route: SubmissionRoute::Direct,
                fan_out: Vec::new(),
                failed_copies: Vec::new(),
            });
        }

        let city_key = draft
            .city
            .as_deref()
            .and_then(|city| self.settings.cities.normalize(city));
        draft.city = city_key.clone();

        let record = self
            .repository
            .insert(NewEnquiry::global(draft.clone(), created_at))?;

        let (fan_out, failed_copies) = match &city_key {
            Some(city_key) => self.fan_out(&draft, city_key, created_at),
            None => (Vec::new(), Vec::new()),
        };

        info!(
            enquiry_id = record.id.0,
            enquiry_type = record.enquiry_type.code(),
            city = record.city.as_deref().unwrap_or(""),
            copies = fan_out.len(),
            failed_copies = failed_copies.len(),
            route = SubmissionRoute::General.label(),
            "enquiry stored"
        );
        self.dispatch_notification(&record, None);

        Ok(SubmissionOutcome {
            record,
            route: SubmissionRoute::General,
            fan_out,
            failed_copies,
        })
    }

    /// Back-office review queue: global records only, newest first.
    pub fn list_global(
        &self,
        enquiry_type: Option<EnquiryType>,
    ) -> Result<Vec<EnquiryRecord>, EnquiryServiceError> {
        self.list(&EnquiryFilter::global(enquiry_type))
    }

    /// Direct submissions and fan-out copies for one franchise, newest first.
    pub fn list_for_franchise(
        &self,
        franchise: FranchiseId,
    ) -> Result<Vec<EnquiryRecord>, EnquiryServiceError> {
        self.list(&EnquiryFilter::franchise(franchise))
    }

    /// Franchise-linked enquiries across every franchise the back-office account owns.
    pub fn list_for_owner(&self, owner: OwnerId) -> Result<Vec<EnquiryRecord>, EnquiryServiceError> {
        let owned: Vec<FranchiseId> = self
            .directory
            .owned_by(owner)?
            .into_iter()
            .map(|franchise| franchise.id)
            .collect();
        if owned.is_empty() {
            return Ok(Vec::new());
        }
        self.list(&EnquiryFilter::any_of(owned))
    }

    /// Change the workflow status; no other field is touched.
    pub fn update_status(
        &self,
        id: EnquiryId,
        status: EnquiryStatus,
    ) -> Result<EnquiryRecord, EnquiryServiceError> {
        match self.repository.update_status(id, status) {
            Ok(record) => {
                info!(enquiry_id = id.0, status = status.label(), "enquiry status updated");
                Ok(record)
            }
            Err(RepositoryError::NotFound) => Err(EnquiryServiceError::NotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    pub fn get(&self, id: EnquiryId) -> Result<EnquiryRecord, EnquiryServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(EnquiryServiceError::NotFound(id))
    }

    fn list(&self, filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, EnquiryServiceError> {
        let mut records = self.repository.list(filter)?;
        records.retain(|record| filter.matches(record));
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Unknown slugs and directory outages both fall back to the general path.
    fn resolve_slug(&self, slug: &str) -> Option<Franchise> {
        match self.directory.find_by_slug(slug) {
            Ok(Some(franchise)) => Some(franchise),
            Ok(None) => {
                warn!(slug, "franchise slug did not resolve; routing as general enquiry");
                None
            }
            Err(error) => {
                warn!(slug, %error, "franchise lookup failed; routing as general enquiry");
                None
            }
        }
    }

    fn fan_out(
        &self,
        draft: &EnquiryDraft,
        city_key: &str,
        created_at: chrono::DateTime<Utc>,
    ) -> (Vec<EnquiryId>, Vec<FranchiseId>) {
        let franchises = match self.directory.find_by_city(city_key) {
            Ok(franchises) => franchises,
            Err(error) => {
                warn!(city = city_key, %error, "city lookup failed; no franchise copies written");
                return (Vec::new(), Vec::new());
            }
        };

        let mut written = Vec::with_capacity(franchises.len());
        let mut failed = Vec::new();
        for franchise in franchises.iter().filter(|franchise| franchise.is_active) {
            match self
                .repository
                .insert(NewEnquiry::scoped(draft.clone(), franchise, created_at))
            {
                Ok(copy) => written.push(copy.id),
                Err(error) => {
                    warn!(
                        franchise_id = franchise.id.0,
                        city = city_key,
                        %error,
                        "franchise copy not written"
                    );
                    failed.push(franchise.id);
                }
            }
        }
        (written, failed)
    }

    fn dispatch_notification(&self, record: &EnquiryRecord, franchise: Option<&Franchise>) {
        let notification =
            EnquiryNotification::compose(record, franchise, &self.settings.back_office_address);
        if let Err(error) = self.notifier.notify(&notification) {
            warn!(enquiry_id = record.id.0, %error, "enquiry notification failed");
        }
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum EnquiryServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("enquiry {0} not found")]
    NotFound(EnquiryId),
}
