use super::domain::{EnquiryId, EnquiryRecord, EnquiryStatus, EnquiryType, NewEnquiry};
use crate::workflows::franchises::domain::FranchiseId;

/// Storage abstraction so the intake service can be exercised in isolation.
///
/// The intake service is the sole writer. Franchise links are fixed at insert time;
/// `update_status` touches nothing else.
pub trait EnquiryRepository: Send + Sync {
    fn insert(&self, enquiry: NewEnquiry) -> Result<EnquiryRecord, RepositoryError>;
    fn fetch(&self, id: EnquiryId) -> Result<Option<EnquiryRecord>, RepositoryError>;
    fn list(&self, filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, RepositoryError>;
    fn update_status(
        &self,
        id: EnquiryId,
        status: EnquiryStatus,
    ) -> Result<EnquiryRecord, RepositoryError>;
}

/// Which franchise link a listing selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FranchiseScope {
    /// `franchise IS NULL`: the back-office review queue.
    Global,
    Franchise(FranchiseId),
    AnyOf(Vec<FranchiseId>),
}

/// Listing predicate evaluated by repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnquiryFilter {
    pub scope: FranchiseScope,
    pub enquiry_type: Option<EnquiryType>,
}

impl EnquiryFilter {
    pub fn global(enquiry_type: Option<EnquiryType>) -> Self {
        Self {
            scope: FranchiseScope::Global,
            enquiry_type,
        }
    }

    pub fn franchise(franchise: FranchiseId) -> Self {
        Self {
            scope: FranchiseScope::Franchise(franchise),
            enquiry_type: None,
        }
    }

    pub fn any_of(franchises: Vec<FranchiseId>) -> Self {
        Self {
            scope: FranchiseScope::AnyOf(franchises),
            enquiry_type: None,
        }
    }

    pub fn matches(&self, record: &EnquiryRecord) -> bool {
        let scoped = match (&self.scope, record.franchise_id()) {
            (FranchiseScope::Global, linked) => linked.is_none(),
            (FranchiseScope::Franchise(wanted), Some(linked)) => *wanted == linked,
            (FranchiseScope::AnyOf(wanted), Some(linked)) => wanted.contains(&linked),
            (_, None) => false,
        };

        scoped
            && self
                .enquiry_type
                .map_or(true, |kind| kind == record.enquiry_type)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
