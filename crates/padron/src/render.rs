//! Plain-text payloads for the platform collaborator.
//!
//! The platform layer decides how these look (embeds, fields, colors);
//! the registry only commits to the content and its ordering.

use crate::ids::UserId;
use crate::records::{Identity, Incident};
use crate::viewer::PAGE_SIZE;

pub fn identity_card(identity: &Identity) -> String {
    format!(
        "Name: {}\nSurnames: {}\nNational id: {}\nBirth date: {}\nSex: {}\nNationality: {}\nIssued: {}\nExpires: {}",
        identity.given_name,
        identity.surnames,
        identity.national_id,
        identity.birth_date,
        identity.sex,
        identity.nationality,
        identity.issued_on,
        identity.expires_on,
    )
}

pub fn creation_announcement(owner: UserId, identity: &Identity) -> String {
    format!(
        "New identity registered for user {owner}.\n{}",
        identity_card(identity)
    )
}

pub fn disclosure_prompt(requester: UserId) -> String {
    format!(
        "User {requester} asks to see your identity card. Accept to share it for a limited time; reject to refuse."
    )
}

pub fn disclosure_delivery(target: UserId, identity: &Identity) -> String {
    format!(
        "Identity card of user {target} (shared with consent, will be removed shortly).\n{}",
        identity_card(identity)
    )
}

pub fn identity_deleted_notice(reason: &str) -> String {
    format!("Your identity record has been deleted.\nReason: {reason}")
}

pub fn incident_deleted_notice(sequence_id: u32, reason: &str) -> String {
    format!("Incident #{sequence_id} has been removed from your record.\nReason: {reason}")
}

pub fn incidents_cleared_notice(reason: &str) -> String {
    format!("All incidents have been removed from your record.\nReason: {reason}")
}

/// One page of a police file: the identity summary followed by up to
/// [`PAGE_SIZE`] incidents and, when paged, a page footer.
pub fn police_file_page(
    subject: UserId,
    identity: &Identity,
    incidents: &[Incident],
    page_index: usize,
    total_pages: usize,
) -> String {
    let mut out = format!("Police file for user {subject}.\n{}", identity_card(identity));
    if incidents.is_empty() {
        out.push_str("\nIncidents: none on record.");
        return out;
    }

    let start = page_index * PAGE_SIZE;
    out.push_str("\nIncidents:");
    for incident in incidents.iter().skip(start).take(PAGE_SIZE) {
        out.push_str(&format!(
            "\n#{} · {} · {}\n  {}",
            incident.sequence_id,
            incident.kind,
            incident.date,
            if incident.description.is_empty() {
                "—"
            } else {
                &incident.description
            },
        ));
    }
    if total_pages > 1 {
        out.push_str(&format!("\nPage {}/{}", page_index + 1, total_pages));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Sex;

    fn identity() -> Identity {
        Identity {
            given_name: "Ana".to_string(),
            surnames: "García".to_string(),
            national_id: "123456789Z".to_string(),
            birth_date: "01/02/1990".to_string(),
            sex: Sex::M,
            nationality: "ESP".to_string(),
            issued_on: "01/06/2025".to_string(),
            expires_on: "01/06/2035".to_string(),
        }
    }

    fn incident(sequence_id: u32) -> Incident {
        Incident {
            sequence_id,
            kind: "Robo".to_string(),
            date: "03/04/2025".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn card_lists_every_field() {
        let card = identity_card(&identity());
        for expected in ["Ana", "García", "123456789Z", "ESP", "01/06/2035", "Sex: M"] {
            assert!(card.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn file_page_windows_incidents() {
        let incidents: Vec<Incident> = (1..=8).map(incident).collect();
        let page = police_file_page(UserId(7), &identity(), &incidents, 1, 2);
        assert!(page.contains("#6"));
        assert!(page.contains("#8"));
        assert!(!page.contains("#5 ·"));
        assert!(page.contains("Page 2/2"));
    }

    #[test]
    fn empty_file_has_no_page_footer() {
        let page = police_file_page(UserId(7), &identity(), &[], 0, 1);
        assert!(page.contains("none on record"));
        assert!(!page.contains("Page"));
    }
}
