pub mod authority;
pub mod chat;
pub mod checkin;
pub mod config;
pub mod directory;
pub mod emergency;
pub mod register;

use chrono::Utc;
use safeyatra_core::{RegistrationWizard, SubjectId, TouristProfile};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Profile used by the check-in and emergency commands.
pub fn demo_profile(tourist: Option<&str>) -> Result<TouristProfile, Box<dyn std::error::Error>> {
    let mut wizard = RegistrationWizard::new();
    let form = wizard.form_mut();
    form.full_name = "Demo Tourist".into();
    form.email = "demo@safeyatra.local".into();
    form.phone = "+91-90000-00000".into();
    form.nationality = "Indian".into();
    form.blood_group = "B+".into();
    form.emergency_contact_name = "Local Contact".into();
    form.emergency_contact_phone = "+91-90000-00001".into();
    form.id_type = "Passport".into();
    form.id_number = "DEMO0001".into();
    wizard.deny_location();
    wizard.select_region("Delhi NCR");

    let mut profile = wizard.complete(Utc::now())?;
    if let Some(id) = tourist {
        profile.tourist_id = SubjectId::new(id);
    }
    Ok(profile)
}
