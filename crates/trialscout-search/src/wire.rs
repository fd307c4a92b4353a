//! Registry response schema (ClinicalTrials.gov API v2 `/studies`).
//!
//! Only the fields [`normalize`](crate::normalize) projects are modelled;
//! everything else in the document is ignored. Every modelled field is
//! lenient: a value of the wrong type decodes as absent instead of failing
//! the whole response.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

/// Decodes `T`, or `None` if the value is null or has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decodes an array item by item; a malformed item becomes `T::default()`
/// so positions are kept. A non-array decodes as `None`.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApiResponse {
    #[serde(default, deserialize_with = "lenient_items")]
    pub studies: Option<Vec<RawStudy>>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_page_token: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudy {
    #[serde(default, deserialize_with = "lenient")]
    pub protocol_section: Option<ProtocolSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSection {
    #[serde(default, deserialize_with = "lenient")]
    pub identification_module: Option<IdentificationModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub status_module: Option<StatusModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub sponsor_collaborators_module: Option<SponsorCollaboratorsModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub conditions_module: Option<ConditionsModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub design_module: Option<DesignModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub arms_interventions_module: Option<ArmsInterventionsModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub eligibility_module: Option<EligibilityModule>,
    #[serde(default, deserialize_with = "lenient")]
    pub contacts_locations_module: Option<ContactsLocationsModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationModule {
    #[serde(default, deserialize_with = "lenient")]
    pub nct_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub brief_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub official_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateStruct {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusModule {
    #[serde(default, deserialize_with = "lenient")]
    pub overall_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_date_struct: Option<DateStruct>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_date_struct: Option<DateStruct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorCollaboratorsModule {
    #[serde(default, deserialize_with = "lenient")]
    pub lead_sponsor: Option<Organization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionsModule {
    #[serde(default, deserialize_with = "lenient")]
    pub conditions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignModule {
    #[serde(default, deserialize_with = "lenient")]
    pub study_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phases: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIntervention {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArmsInterventionsModule {
    #[serde(default, deserialize_with = "lenient_items")]
    pub interventions: Option<Vec<RawIntervention>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityModule {
    #[serde(default, deserialize_with = "lenient")]
    pub eligibility_criteria: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sex: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub minimum_age: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub maximum_age: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContact {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default, deserialize_with = "lenient")]
    pub facility: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsLocationsModule {
    #[serde(default, deserialize_with = "lenient_items")]
    pub central_contacts: Option<Vec<RawContact>>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub locations: Option<Vec<RawLocation>>,
}
