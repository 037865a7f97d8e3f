use crate::infra::{InMemoryEnquiryRepository, InMemoryFranchiseDirectory, IntakeService};
use crate::notify::{ConfiguredNotifier, LogNotifier};
use clap::Args;
use franchise_hub::error::AppError;
use franchise_hub::workflows::cities::CityAliases;
use franchise_hub::workflows::enquiries::{
    EnquiryIntakeService, EnquiryRecord, EnquirySubmission, EnquiryType, IntakeSettings,
    SubmissionOutcome,
};
use franchise_hub::workflows::franchises::{
    FranchiseDirectoryService, FranchiseRegistration, OwnerId, OwnerRef,
};
use std::sync::Arc;

const DEMO_BRANCHES: [(&str, &str, &str, &str); 3] = [
    ("Andheri West", "andheri-west", "Mumbai", "Maharashtra"),
    ("Powai", "powai", "Mumbai", "Maharashtra"),
    ("Indiranagar", "indiranagar", "Bangalore", "Karnataka"),
];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// City typed into the enquiry form
    #[arg(long, default_value = "Mumbai")]
    pub(crate) city: String,
    /// Submit from a franchise page (direct enquiry) instead of the main site
    #[arg(long)]
    pub(crate) slug: Option<String>,
    /// Enquiry type: ADMISSION, FRANCHISE_OPPORTUNITY, or CONTACT
    #[arg(long = "type", default_value = "ADMISSION")]
    pub(crate) enquiry_type: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        city,
        slug,
        enquiry_type,
    } = args;

    let cities = Arc::new(CityAliases::builtin());
    let directory = Arc::new(InMemoryFranchiseDirectory::default());
    let franchises = FranchiseDirectoryService::new(directory.clone(), cities.clone());

    println!("Franchise directory");
    for (name, branch_slug, branch_city, state) in DEMO_BRANCHES {
        let franchise = franchises.register(
            FranchiseRegistration {
                name: Some(name.to_string()),
                slug: Some(branch_slug.to_string()),
                city: Some(branch_city.to_string()),
                state: Some(state.to_string()),
                country: Some("India".to_string()),
                contact_email: Some(format!("{branch_slug}@time4kids.app")),
                contact_phone: Some("022-5550100".to_string()),
                ..FranchiseRegistration::default()
            },
            OwnerRef {
                id: OwnerId(1),
                email: Some("owner@time4kids.app".to_string()),
            },
        )?;
        println!(
            "  #{} {} ({}) city={} routing key={}",
            franchise.id.0, franchise.name, franchise.slug, franchise.city, franchise.city_key
        );
    }

    let intake: IntakeService = EnquiryIntakeService::new(
        Arc::new(InMemoryEnquiryRepository::default()),
        directory,
        Arc::new(ConfiguredNotifier::Log(LogNotifier)),
        IntakeSettings {
            back_office_address: "enquiries@time4education.com".to_string(),
            cities,
        },
    );

    let submission = EnquirySubmission {
        enquiry_type: Some(enquiry_type),
        name: Some("Demo Parent".to_string()),
        email: Some("parent@example.com".to_string()),
        phone: Some("9820000000".to_string()),
        message: Some("Looking for a playgroup seat this term".to_string()),
        city: Some(city),
        child_age: Some("2.5 years".to_string()),
        franchise_slug: slug,
    };

    println!("\nEnquiry intake");
    let outcome = match intake.submit_detailed(submission) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    render_outcome(&outcome);

    println!("\nRows written");
    for id in std::iter::once(outcome.record.id).chain(outcome.fan_out.iter().copied()) {
        render_row(&intake.get(id)?);
    }

    println!("\nBack-office global listing");
    let global = intake.list_global(None)?;
    if global.is_empty() {
        println!("  (empty: direct enquiries stay with their franchise)");
    }
    for record in &global {
        render_row(record);
    }

    println!("\nOwner view (account #1)");
    for kind in EnquiryType::ALL {
        let count = intake
            .list_for_owner(OwnerId(1))?
            .iter()
            .filter(|record| record.enquiry_type == kind)
            .count();
        println!("  {:<22} {}", kind.code(), count);
    }

    Ok(())
}

fn render_outcome(outcome: &SubmissionOutcome) {
    println!(
        "  Route: {} | returned enquiry #{} | {} franchise copies",
        outcome.route.label(),
        outcome.record.id,
        outcome.fan_out.len()
    );
    if !outcome.failed_copies.is_empty() {
        println!("  Copies not written: {}", outcome.failed_copies.len());
    }
}

fn render_row(record: &EnquiryRecord) {
    let scope = record
        .franchise
        .as_ref()
        .map(|franchise| franchise.name.as_str())
        .unwrap_or("global");
    println!(
        "  #{:<3} {:<22} {:<14} city={:<10} status={}",
        record.id.0,
        record.enquiry_type.code(),
        scope,
        record.city.as_deref().unwrap_or("-"),
        record.status.label()
    );
}
