use chrono::Utc;
use clap::Args;
use safeyatra_core::RegistrationWizard;
use serde_json::json;

use super::{print_json, CliResult};

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    nationality: String,
    #[arg(long)]
    purpose: Option<String>,
    #[arg(long)]
    stay: Option<String>,
    /// Latitude (location access granted)
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude (location access granted)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    /// Travel region (location access denied)
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    blood_group: Option<String>,
    #[arg(long)]
    contact_name: Option<String>,
    #[arg(long)]
    contact_phone: Option<String>,
    #[arg(long)]
    medical: Option<String>,
    #[arg(long)]
    allergies: Option<String>,
    #[arg(long)]
    medications: Option<String>,
    #[arg(long)]
    id_type: Option<String>,
    #[arg(long)]
    id_number: Option<String>,
}

/// Walk the wizard step by step so errors name the failing step.
pub fn run(args: RegisterArgs) -> CliResult {
    let mut wizard = RegistrationWizard::new();
    {
        let form = wizard.form_mut();
        form.full_name = args.name;
        form.email = args.email;
        form.phone = args.phone;
        form.nationality = args.nationality;
        form.travel_purpose = args.purpose.unwrap_or_default();
        form.stay_duration = args.stay.unwrap_or_default();
        form.blood_group = args.blood_group.unwrap_or_default();
        form.emergency_contact_name = args.contact_name.unwrap_or_default();
        form.emergency_contact_phone = args.contact_phone.unwrap_or_default();
        form.medical_conditions = args.medical.unwrap_or_default();
        form.allergies = args.allergies.unwrap_or_default();
        form.medications = args.medications.unwrap_or_default();
        form.id_type = args.id_type.unwrap_or_default();
        form.id_number = args.id_number.unwrap_or_default();
    }

    let briefing = args.region.as_deref().and_then(|r| wizard.select_region(r));
    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => wizard.allow_location(lat, lng),
        _ if briefing.is_some() => wizard.deny_location(),
        _ => {}
    }

    while !wizard.is_last_step() {
        wizard.next()?;
    }
    let profile = wizard.complete(Utc::now())?;
    print_json(&json!({
        "profile": profile,
        "briefing": briefing,
    }))
}
