use franchise_hub::workflows::enquiries::{
    EnquiryFilter, EnquiryId, EnquiryIntakeService, EnquiryRecord, EnquiryRepository,
    EnquiryStatus, NewEnquiry, RepositoryError,
};
use franchise_hub::workflows::franchises::{
    DirectoryError, Franchise, FranchiseDirectory, FranchiseId, NewFranchise, OwnerId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::notify::ConfiguredNotifier;

pub(crate) type IntakeService =
    EnquiryIntakeService<InMemoryEnquiryRepository, InMemoryFranchiseDirectory, ConfiguredNotifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryEnquiryRepository {
    sequence: AtomicU64,
    records: Mutex<BTreeMap<EnquiryId, EnquiryRecord>>,
}

impl EnquiryRepository for InMemoryEnquiryRepository {
    fn insert(&self, enquiry: NewEnquiry) -> Result<EnquiryRecord, RepositoryError> {
        let id = EnquiryId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let record = EnquiryRecord::from_new(id, enquiry);
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("enquiry store poisoned".to_string()))?;
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: EnquiryId) -> Result<Option<EnquiryRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("enquiry store poisoned".to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("enquiry store poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: EnquiryId,
        status: EnquiryStatus,
    ) -> Result<EnquiryRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("enquiry store poisoned".to_string()))?;
        let record = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryFranchiseDirectory {
    sequence: AtomicU64,
    franchises: Mutex<BTreeMap<FranchiseId, Franchise>>,
}

impl InMemoryFranchiseDirectory {
    fn matching<F>(&self, predicate: F) -> Result<Vec<Franchise>, DirectoryError>
    where
        F: Fn(&Franchise) -> bool,
    {
        let guard = self
            .franchises
            .lock()
            .map_err(|_| DirectoryError::Unavailable("franchise store poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|franchise| predicate(franchise))
            .cloned()
            .collect())
    }
}

impl FranchiseDirectory for InMemoryFranchiseDirectory {
    fn find_by_slug(&self, slug: &str) -> Result<Option<Franchise>, DirectoryError> {
        Ok(self
            .matching(|franchise| franchise.is_active && franchise.slug == slug)?
            .into_iter()
            .next())
    }

    fn find_by_city(&self, city_key: &str) -> Result<Vec<Franchise>, DirectoryError> {
        self.matching(|franchise| franchise.is_active && franchise.city_key == city_key)
    }

    fn fetch(&self, id: FranchiseId) -> Result<Option<Franchise>, DirectoryError> {
        Ok(self
            .matching(|franchise| franchise.id == id)?
            .into_iter()
            .next())
    }

    fn owned_by(&self, owner: OwnerId) -> Result<Vec<Franchise>, DirectoryError> {
        self.matching(|franchise| franchise.owner.id == owner)
    }

    fn list(&self) -> Result<Vec<Franchise>, DirectoryError> {
        self.matching(|_| true)
    }

    fn insert(&self, franchise: NewFranchise) -> Result<Franchise, DirectoryError> {
        let mut guard = self
            .franchises
            .lock()
            .map_err(|_| DirectoryError::Unavailable("franchise store poisoned".to_string()))?;
        if guard.values().any(|existing| existing.slug == franchise.slug) {
            return Err(DirectoryError::SlugTaken(franchise.slug));
        }
        let id = FranchiseId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let stored = Franchise::from_new(id, franchise);
        guard.insert(id, stored.clone());
        Ok(stored)
    }

    fn set_active(&self, id: FranchiseId, active: bool) -> Result<Franchise, DirectoryError> {
        let mut guard = self
            .franchises
            .lock()
            .map_err(|_| DirectoryError::Unavailable("franchise store poisoned".to_string()))?;
        let franchise = guard.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        franchise.is_active = active;
        Ok(franchise.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use franchise_hub::workflows::enquiries::{EnquiryDraft, EnquiryType};
    use franchise_hub::workflows::franchises::OwnerRef;

    fn franchise(slug: &str, city_key: &str) -> NewFranchise {
        NewFranchise {
            name: slug.to_string(),
            slug: slug.to_string(),
            city: city_key.to_string(),
            city_key: city_key.to_string(),
            state: None,
            country: None,
            address: None,
            contact_email: format!("{slug}@time4kids.app"),
            contact_phone: "022-5550100".to_string(),
            owner: OwnerRef {
                id: OwnerId(3),
                email: None,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn directory_rejects_duplicate_slugs_and_hides_inactive_rows() {
        let directory = InMemoryFranchiseDirectory::default();
        let powai = directory
            .insert(franchise("powai", "mumbai"))
            .expect("inserted");
        assert!(matches!(
            directory.insert(franchise("powai", "pune")),
            Err(DirectoryError::SlugTaken(_))
        ));

        directory.set_active(powai.id, false).expect("deactivated");
        assert!(directory.find_by_slug("powai").expect("lookup").is_none());
        assert!(directory.find_by_city("mumbai").expect("lookup").is_empty());
        assert_eq!(directory.list().expect("list").len(), 1);
        assert_eq!(directory.owned_by(OwnerId(3)).expect("owned").len(), 1);
        assert!(matches!(
            directory.set_active(FranchiseId(99), true),
            Err(DirectoryError::NotFound)
        ));
    }

    #[test]
    fn repository_assigns_sequential_ids_and_updates_status() {
        let repository = InMemoryEnquiryRepository::default();
        let draft = EnquiryDraft {
            enquiry_type: EnquiryType::Contact,
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            message: None,
            city: None,
            child_age: None,
        };

        let first = repository
            .insert(NewEnquiry::global(draft.clone(), Utc::now()))
            .expect("first");
        let second = repository
            .insert(NewEnquiry::global(draft, Utc::now()))
            .expect("second");
        assert_eq!(first.id, EnquiryId(1));
        assert_eq!(second.id, EnquiryId(2));

        let updated = repository
            .update_status(second.id, EnquiryStatus::Closed)
            .expect("updated");
        assert_eq!(updated.status, EnquiryStatus::Closed);
        assert!(matches!(
            repository.update_status(EnquiryId(7), EnquiryStatus::Closed),
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(
            repository
                .list(&EnquiryFilter::global(None))
                .expect("list")
                .len(),
            2
        );
    }
}
