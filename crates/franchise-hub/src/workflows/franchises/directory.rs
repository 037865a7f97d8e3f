use super::domain::{Franchise, FranchiseId, NewFranchise, OwnerId};

/// Storage abstraction for the franchise directory.
///
/// Lookups used for enquiry routing (`find_by_slug`, `find_by_city`) only ever return
/// active franchises.
pub trait FranchiseDirectory: Send + Sync {
    fn find_by_slug(&self, slug: &str) -> Result<Option<Franchise>, DirectoryError>;
    /// `city_key` is already alias-resolved; compare against `Franchise::city_key`.
    fn find_by_city(&self, city_key: &str) -> Result<Vec<Franchise>, DirectoryError>;
    fn fetch(&self, id: FranchiseId) -> Result<Option<Franchise>, DirectoryError>;
    fn owned_by(&self, owner: OwnerId) -> Result<Vec<Franchise>, DirectoryError>;
    /// Every franchise, active or not.
    fn list(&self) -> Result<Vec<Franchise>, DirectoryError>;
    fn insert(&self, franchise: NewFranchise) -> Result<Franchise, DirectoryError>;
    fn set_active(&self, id: FranchiseId, active: bool) -> Result<Franchise, DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("slug '{0}' is already taken")]
    SlugTaken(String),
    #[error("franchise not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
