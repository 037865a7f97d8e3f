//! Franchise directory: the canonical list of locations enquiries are routed against.

pub mod directory;
pub mod domain;
pub mod router;
pub mod service;
pub mod slug;

pub use directory::{DirectoryError, FranchiseDirectory};
pub use domain::{
    Franchise, FranchiseId, FranchiseRef, FranchiseRegistration, LocationSummary, NewFranchise,
    OwnerId, OwnerRef, PublicFranchiseView,
};
pub use router::franchise_router;
pub use service::{FranchiseDirectoryService, FranchiseServiceError};
