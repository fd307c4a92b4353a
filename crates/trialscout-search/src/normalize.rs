//! Projection of raw registry documents into [`SearchResult`].

use crate::trial::{
    ClinicalTrialRecord, ContactInfo, Eligibility, Intervention, Location, SearchResult,
};
use crate::wire::{ProtocolSection, RawApiResponse, RawStudy};

/// Maps a raw registry response to the flat result shape.
///
/// Study count and order are preserved: a study without a protocol section
/// becomes a record with an empty `nct_id` rather than being dropped.
pub fn normalize(raw: RawApiResponse) -> SearchResult {
    let studies = raw
        .studies
        .unwrap_or_default()
        .into_iter()
        .map(normalize_study)
        .collect();

    SearchResult {
        studies,
        next_page_token: raw.next_page_token,
        total_count: raw.total_count,
    }
}

fn normalize_study(study: RawStudy) -> ClinicalTrialRecord {
    match study.protocol_section {
        Some(protocol) => project(protocol),
        None => ClinicalTrialRecord::default(),
    }
}

fn project(protocol: ProtocolSection) -> ClinicalTrialRecord {
    let ProtocolSection {
        identification_module: identification,
        status_module: status,
        sponsor_collaborators_module: sponsor,
        conditions_module: conditions,
        design_module: design,
        arms_interventions_module: arms,
        eligibility_module: eligibility,
        contacts_locations_module: contacts,
        ..
    } = protocol;

    let identification = identification.unwrap_or_default();
    let status = status.unwrap_or_default();
    let design = design.unwrap_or_default();
    let contacts = contacts.unwrap_or_default();

    ClinicalTrialRecord {
        nct_id: identification.nct_id.unwrap_or_default(),
        brief_title: identification.brief_title,
        official_title: identification.official_title,
        status: status.overall_status,
        conditions: conditions.and_then(|c| c.conditions),
        interventions: arms.and_then(|a| a.interventions).map(|items| {
            items
                .into_iter()
                .map(|i| Intervention {
                    name: i.name,
                    kind: i.kind,
                    description: i.description,
                })
                .collect()
        }),
        locations: contacts.locations.map(|items| {
            items
                .into_iter()
                .map(|l| Location {
                    facility: l.facility,
                    city: l.city,
                    state: l.state,
                    country: l.country,
                })
                .collect()
        }),
        eligibility: eligibility.map(|e| Eligibility {
            criteria: e.eligibility_criteria,
            gender: e.sex,
            minimum_age: e.minimum_age,
            maximum_age: e.maximum_age,
        }),
        phase: design.phases,
        study_type: design.study_type,
        enrollment: design.enrollment_info.and_then(|e| e.count),
        start_date: status.start_date_struct.and_then(|d| d.date),
        completion_date: status.completion_date_struct.and_then(|d| d.date),
        sponsor: sponsor.and_then(|s| s.lead_sponsor).and_then(|o| o.name),
        contact_info: contacts
            .central_contacts
            .and_then(|c| c.into_iter().next())
            .map(|c| ContactInfo {
                name: c.name,
                phone: c.phone,
                email: c.email,
            }),
    }
}
