//! Enquiry intake: validation, direct-vs-general routing, city fan-out, and the
//! back-office visibility rules over the resulting rows.

pub mod domain;
pub(crate) mod intake;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EnquiryDraft, EnquiryId, EnquiryRecord, EnquiryStatus, EnquirySubmission, EnquiryType,
    EnquiryView, NewEnquiry,
};
pub use notification::{EnquiryNotification, EnquiryNotifier, NotificationError};
pub use repository::{EnquiryFilter, EnquiryRepository, FranchiseScope, RepositoryError};
pub use router::enquiry_router;
pub use service::{
    EnquiryIntakeService, EnquiryServiceError, IntakeSettings, SubmissionOutcome, SubmissionRoute,
};
