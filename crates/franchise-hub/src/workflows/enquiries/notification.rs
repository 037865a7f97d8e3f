use serde::{Deserialize, Serialize};

use super::domain::{EnquiryId, EnquiryRecord};
use crate::workflows::franchises::domain::Franchise;

/// Outbound hook for enquiry alerts (e-mail relay, log sink, test recorder).
///
/// Implementations must return promptly; slow transports should hand the message off
/// and report only whether it was accepted for delivery.
pub trait EnquiryNotifier: Send + Sync {
    fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotificationError>;
}

/// Rendered message for one submitted enquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryNotification {
    pub enquiry_id: EnquiryId,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

impl EnquiryNotification {
    /// Build the message for the record handed back to the caller.
    ///
    /// `franchise` is only present on direct submissions; its contact and owner
    /// addresses are added after the back-office address.
    pub fn compose(
        record: &EnquiryRecord,
        franchise: Option<&Franchise>,
        back_office_address: &str,
    ) -> Self {
        let subject = format!(
            "New {} Enquiry from {}",
            record.enquiry_type.title(),
            record.name
        );

        let mut lines = vec![
            format!("Name: {}", record.name),
            format!("Email: {}", record.email),
            format!("Phone: {}", record.phone.as_deref().unwrap_or("")),
            format!("City: {}", record.city.as_deref().unwrap_or("")),
            format!("Message: {}", record.message.as_deref().unwrap_or("")),
        ];
        if let Some(child_age) = &record.child_age {
            lines.push(format!("Child age: {child_age}"));
        }
        if let Some(linked) = &record.franchise {
            lines.push(format!("Franchise: {}", linked.name));
        }

        let mut candidates = vec![Some(back_office_address)];
        if let Some(franchise) = franchise {
            candidates.push(Some(franchise.contact_email.as_str()));
            candidates.push(franchise.owner.email.as_deref());
        }

        Self {
            enquiry_id: record.id,
            subject,
            body: lines.join("\n"),
            recipients: unique_recipients(candidates.into_iter().flatten()),
        }
    }
}

/// Drop blanks and case-insensitive duplicates, keeping first occurrence order.
fn unique_recipients<'a>(addresses: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut recipients = Vec::new();
    for address in addresses.map(str::trim).filter(|address| !address.is_empty()) {
        let key = address.to_ascii_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            recipients.push(address.to_string());
        }
    }
    recipients
}

/// Notification dispatch error. Never surfaced to intake callers.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification rejected by relay (status {status})")]
    Rejected { status: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::enquiries::domain::{EnquiryStatus, EnquiryType};
    use crate::workflows::franchises::domain::{FranchiseId, OwnerId, OwnerRef};
    use chrono::Utc;

    fn franchise() -> Franchise {
        Franchise {
            id: FranchiseId(4),
            name: "Andheri West".to_string(),
            slug: "andheri-west".to_string(),
            city: "Mumbai".to_string(),
            city_key: "mumbai".to_string(),
            state: Some("Maharashtra".to_string()),
            country: Some("India".to_string()),
            address: None,
            contact_email: "andheri@time4kids.app".to_string(),
            contact_phone: "022-5550100".to_string(),
            owner: OwnerRef {
                id: OwnerId(1),
                email: Some("Owner@time4kids.app".to_string()),
            },
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn record(linked: Option<&Franchise>) -> EnquiryRecord {
        EnquiryRecord {
            id: EnquiryId(11),
            enquiry_type: EnquiryType::FranchiseOpportunity,
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: Some("98200 00000".to_string()),
            message: None,
            city: Some("mumbai".to_string()),
            child_age: Some("3".to_string()),
            status: EnquiryStatus::New,
            franchise: linked.map(Franchise::reference),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn general_notification_goes_to_back_office_only() {
        let notification = EnquiryNotification::compose(&record(None), None, "desk@time4kids.app");
        assert_eq!(notification.recipients, vec!["desk@time4kids.app"]);
        assert_eq!(
            notification.subject,
            "New Franchise Opportunity Enquiry from Ravi"
        );
        assert!(notification.body.contains("Child age: 3"));
        assert!(!notification.body.contains("Franchise:"));
    }

    #[test]
    fn direct_notification_adds_franchise_contacts() {
        let franchise = franchise();
        let notification = EnquiryNotification::compose(
            &record(Some(&franchise)),
            Some(&franchise),
            "desk@time4kids.app",
        );
        assert_eq!(
            notification.recipients,
            vec![
                "desk@time4kids.app",
                "andheri@time4kids.app",
                "Owner@time4kids.app"
            ]
        );
        assert!(notification.body.contains("Franchise: Andheri West"));
    }

    #[test]
    fn duplicate_and_blank_recipients_are_dropped() {
        let mut franchise = franchise();
        franchise.contact_email = "DESK@time4kids.app".to_string();
        franchise.owner.email = Some("  ".to_string());
        let notification = EnquiryNotification::compose(
            &record(Some(&franchise)),
            Some(&franchise),
            "desk@time4kids.app",
        );
        assert_eq!(notification.recipients, vec!["desk@time4kids.app"]);
    }
}
