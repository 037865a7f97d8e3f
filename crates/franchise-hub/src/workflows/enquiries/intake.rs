use super::domain::{EnquiryDraft, EnquirySubmission, EnquiryType};
use crate::validation::{FieldErrors, ValidationError};

const MAX_NAME_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 30;
const MAX_MESSAGE_LEN: usize = 5_000;
const MAX_CITY_LEN: usize = 100;
const MAX_CHILD_AGE_LEN: usize = 50;
const MAX_SLUG_LEN: usize = 50;

/// A submission that passed field validation, plus the optional routing slug.
///
/// The slug is never required, whatever the enquiry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedSubmission {
    pub(crate) draft: EnquiryDraft,
    pub(crate) franchise_slug: Option<String>,
}

/// Check every field and report all failures at once.
pub(crate) fn validate(submission: EnquirySubmission) -> Result<ValidatedSubmission, ValidationError> {
    let EnquirySubmission {
        enquiry_type,
        name,
        email,
        phone,
        message,
        city,
        child_age,
        franchise_slug,
    } = submission;

    let mut errors = FieldErrors::default();

    let enquiry_type = match errors.required("enquiry_type", enquiry_type, MAX_NAME_LEN) {
        Some(raw) => match EnquiryType::parse(&raw) {
            Some(kind) => Some(kind),
            None => {
                errors.push(
                    "enquiry_type",
                    format!("\"{raw}\" is not one of ADMISSION, FRANCHISE_OPPORTUNITY, CONTACT"),
                );
                None
            }
        },
        None => None,
    };
    let name = errors.required("name", name, MAX_NAME_LEN);
    let email = errors.required_email("email", email);
    let phone = errors.optional("phone", phone, MAX_PHONE_LEN);
    let message = errors.optional("message", message, MAX_MESSAGE_LEN);
    let city = errors.optional("city", city, MAX_CITY_LEN);
    let child_age = errors.optional("child_age", child_age, MAX_CHILD_AGE_LEN);
    let franchise_slug = errors.optional("franchise_slug", franchise_slug, MAX_SLUG_LEN);

    match (enquiry_type, name, email) {
        (Some(enquiry_type), Some(name), Some(email)) if errors.is_empty() => {
            Ok(ValidatedSubmission {
                draft: EnquiryDraft {
                    enquiry_type,
                    name,
                    email,
                    phone,
                    message,
                    city,
                    child_age,
                },
                franchise_slug,
            })
        }
        _ => Err(errors.into_error()),
    }
}
