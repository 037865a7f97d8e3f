use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::cities::CityAliases;
use crate::workflows::enquiries::domain::{
    EnquiryId, EnquiryRecord, EnquiryStatus, EnquirySubmission, NewEnquiry,
};
use crate::workflows::enquiries::notification::{
    EnquiryNotification, EnquiryNotifier, NotificationError,
};
use crate::workflows::enquiries::repository::{EnquiryFilter, EnquiryRepository, RepositoryError};
use crate::workflows::enquiries::service::{EnquiryIntakeService, IntakeSettings};
use crate::workflows::franchises::directory::{DirectoryError, FranchiseDirectory};
use crate::workflows::franchises::domain::{
    Franchise, FranchiseId, FranchiseRegistration, NewFranchise, OwnerId, OwnerRef,
};
use crate::workflows::franchises::service::FranchiseDirectoryService;

pub(super) const BACK_OFFICE: &str = "desk@time4kids.app";

pub(super) type MemoryService = EnquiryIntakeService<MemoryRepository, MemoryDirectory, MemoryNotifier>;

pub(super) fn settings() -> IntakeSettings {
    IntakeSettings {
        back_office_address: BACK_OFFICE.to_string(),
        cities: Arc::new(CityAliases::builtin()),
    }
}

pub(super) fn submission(city: Option<&str>, slug: Option<&str>) -> EnquirySubmission {
    EnquirySubmission {
        enquiry_type: Some("ADMISSION".to_string()),
        name: Some("A".to_string()),
        email: Some("a@x.com".to_string()),
        phone: Some("9820000000".to_string()),
        message: Some("Looking for a nursery seat".to_string()),
        city: city.map(str::to_string),
        child_age: Some("3".to_string()),
        franchise_slug: slug.map(str::to_string),
    }
}

pub(super) fn owner(id: u64) -> OwnerRef {
    OwnerRef {
        id: OwnerId(id),
        email: Some(format!("owner{id}@time4kids.app")),
    }
}

pub(super) fn register(directory: &Arc<MemoryDirectory>, name: &str, slug: &str, city: &str, owner_id: u64) -> Franchise {
    let service = FranchiseDirectoryService::new(directory.clone(), Arc::new(CityAliases::builtin()));
    service
        .register(
            FranchiseRegistration {
                name: Some(name.to_string()),
                slug: Some(slug.to_string()),
                city: Some(city.to_string()),
                contact_email: Some(format!("{slug}@time4kids.app")),
                contact_phone: Some("022-5550100".to_string()),
                ..FranchiseRegistration::default()
            },
            owner(owner_id),
        )
        .expect("fixture franchise registers")
}

/// Directory seeded with the two Mumbai branches and one Bengaluru branch.
pub(super) fn seeded_directory() -> Arc<MemoryDirectory> {
    let directory = Arc::new(MemoryDirectory::default());
    register(&directory, "Andheri West", "andheri-west", "Mumbai", 1);
    register(&directory, "Powai", "powai", "Mumbai", 1);
    register(&directory, "Koramangala", "koramangala", "Bangalore", 2);
    directory
}

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>, Arc<MemoryDirectory>, Arc<MemoryNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let directory = seeded_directory();
    let notifier = Arc::new(MemoryNotifier::default());
    let service = EnquiryIntakeService::new(
        repository.clone(),
        directory.clone(),
        notifier.clone(),
        settings(),
    );
    (service, repository, directory, notifier)
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    sequence: AtomicU64,
    pub(super) records: Mutex<BTreeMap<EnquiryId, EnquiryRecord>>,
}

impl MemoryRepository {
    pub(super) fn all(&self) -> Vec<EnquiryRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl EnquiryRepository for MemoryRepository {
    fn insert(&self, enquiry: NewEnquiry) -> Result<EnquiryRecord, RepositoryError> {
        let id = EnquiryId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let record = EnquiryRecord::from_new(id, enquiry);
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: EnquiryId) -> Result<Option<EnquiryRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
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
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }
}

/// Accepts global rows but refuses every franchise-scoped insert.
#[derive(Default)]
pub(super) struct CopyRejectingRepository {
    pub(super) inner: MemoryRepository,
}

impl EnquiryRepository for CopyRejectingRepository {
    fn insert(&self, enquiry: NewEnquiry) -> Result<EnquiryRecord, RepositoryError> {
        if enquiry.franchise.is_some() {
            return Err(RepositoryError::Unavailable("replica lag".to_string()));
        }
        self.inner.insert(enquiry)
    }

    fn fetch(&self, id: EnquiryId) -> Result<Option<EnquiryRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, RepositoryError> {
        self.inner.list(filter)
    }

    fn update_status(
        &self,
        id: EnquiryId,
        status: EnquiryStatus,
    ) -> Result<EnquiryRecord, RepositoryError> {
        self.inner.update_status(id, status)
    }
}

pub(super) struct UnavailableRepository;

impl EnquiryRepository for UnavailableRepository {
    fn insert(&self, _enquiry: NewEnquiry) -> Result<EnquiryRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: EnquiryId) -> Result<Option<EnquiryRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &EnquiryFilter) -> Result<Vec<EnquiryRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: EnquiryId,
        _status: EnquiryStatus,
    ) -> Result<EnquiryRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    franchises: Mutex<BTreeMap<FranchiseId, Franchise>>,
}

impl FranchiseDirectory for MemoryDirectory {
    fn find_by_slug(&self, slug: &str) -> Result<Option<Franchise>, DirectoryError> {
        let guard = self.franchises.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .find(|franchise| franchise.is_active && franchise.slug == slug)
            .cloned())
    }

    fn find_by_city(&self, city_key: &str) -> Result<Vec<Franchise>, DirectoryError> {
        let guard = self.franchises.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|franchise| franchise.is_active && franchise.city_key == city_key)
            .cloned()
            .collect())
    }

    fn fetch(&self, id: FranchiseId) -> Result<Option<Franchise>, DirectoryError> {
        let guard = self.franchises.lock().expect("directory mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn owned_by(&self, owner: OwnerId) -> Result<Vec<Franchise>, DirectoryError> {
        let guard = self.franchises.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|franchise| franchise.owner.id == owner)
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<Franchise>, DirectoryError> {
        let guard = self.franchises.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert(&self, franchise: NewFranchise) -> Result<Franchise, DirectoryError> {
        let mut guard = self.franchises.lock().expect("directory mutex poisoned");
        let taken: HashSet<&str> = guard.values().map(|existing| existing.slug.as_str()).collect();
        if taken.contains(franchise.slug.as_str()) {
            return Err(DirectoryError::SlugTaken(franchise.slug));
        }
        let id = FranchiseId(guard.len() as u64 + 1);
        let stored = Franchise::from_new(id, franchise);
        guard.insert(id, stored.clone());
        Ok(stored)
    }

    fn set_active(&self, id: FranchiseId, active: bool) -> Result<Franchise, DirectoryError> {
        let mut guard = self.franchises.lock().expect("directory mutex poisoned");
        let franchise = guard.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        franchise.is_active = active;
        Ok(franchise.clone())
    }
}

pub(super) struct UnavailableDirectory;

impl FranchiseDirectory for UnavailableDirectory {
    fn find_by_slug(&self, _slug: &str) -> Result<Option<Franchise>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn find_by_city(&self, _city_key: &str) -> Result<Vec<Franchise>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn fetch(&self, _id: FranchiseId) -> Result<Option<Franchise>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn owned_by(&self, _owner: OwnerId) -> Result<Vec<Franchise>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Franchise>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn insert(&self, _franchise: NewFranchise) -> Result<Franchise, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn set_active(&self, _id: FranchiseId, _active: bool) -> Result<Franchise, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<EnquiryNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<EnquiryNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl EnquiryNotifier for MemoryNotifier {
    fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification.clone());
        Ok(())
    }
}

/// Counts attempts and always fails, like a relay that is down.
#[derive(Default)]
pub(super) struct FailingNotifier {
    pub(super) attempts: AtomicU64,
}

impl EnquiryNotifier for FailingNotifier {
    fn notify(&self, _notification: &EnquiryNotification) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(NotificationError::Rejected { status: 503 })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
