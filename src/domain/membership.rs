use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::status::MembershipStatus;

/// One entry of a user/coach/player club-association list.
///
/// Each entry carries its own status and category set, independent of its
/// sibling entries: approving someone in club A must never touch their
/// standing in club B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMembership {
    /// Club the entry refers to.
    pub club_id: Uuid,
    /// Display name snapshotted at association time.
    pub club_name: String,
    /// Categories the member plays or coaches in at this club.
    pub categories: Vec<String>,
    /// Per-club status, independent of sibling entries.
    pub status: MembershipStatus,
    /// Last time this entry changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial update merged into a membership entry by [`upsert_membership`].
#[derive(Debug, Clone, Default)]
pub struct MembershipPatch {
    /// New display name (kept when `None`).
    pub club_name: Option<String>,
    /// Replacement category set (kept when `None`).
    pub categories: Option<Vec<String>>,
    /// New per-club status (kept when `None`).
    pub status: Option<MembershipStatus>,
}

/// What [`upsert_membership`] did with the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The entry matching the club was merged in place.
    Updated,
    /// No entry matched; a new one was appended.
    Appended,
}

/// Merge `patch` into the entry matching `club_id`, or append a new entry
/// when none matches. List order is preserved and a club id never appears
/// twice.
pub fn upsert_membership(
    entries: &mut Vec<ClubMembership>,
    club_id: Uuid,
    patch: MembershipPatch,
    now: OffsetDateTime,
) -> UpsertOutcome {
    if let Some(entry) = entries.iter_mut().find(|entry| entry.club_id == club_id) {
        if let Some(club_name) = patch.club_name {
            entry.club_name = club_name;
        }
        if let Some(categories) = patch.categories {
            entry.categories = categories;
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        entry.updated_at = now;
        return UpsertOutcome::Updated;
    }

    entries.push(ClubMembership {
        club_id,
        club_name: patch.club_name.unwrap_or_default(),
        categories: patch.categories.unwrap_or_default(),
        status: patch.status.unwrap_or(MembershipStatus::Pending),
        updated_at: now,
    });
    UpsertOutcome::Appended
}

/// Find the entry matching `club_id`.
pub fn membership_for(entries: &[ClubMembership], club_id: Uuid) -> Option<&ClubMembership> {
    entries.iter().find(|entry| entry.club_id == club_id)
}

/// Remove and return the entry matching `club_id`, keeping the order of the
/// remaining entries.
pub fn remove_membership(entries: &mut Vec<ClubMembership>, club_id: Uuid) -> Option<ClubMembership> {
    let index = entries.iter().position(|entry| entry.club_id == club_id)?;
    Some(entries.remove(index))
}

/// Categories present in `requested` but not in `existing`.
pub fn category_difference(existing: &[String], requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|category| !existing.contains(category))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(club_id: Uuid, name: &str, status: MembershipStatus) -> ClubMembership {
        ClubMembership {
            club_id,
            club_name: name.to_owned(),
            categories: vec!["cadetes".to_owned()],
            status,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn upsert_merges_the_matching_entry_in_place() {
        let club_a = Uuid::new_v4();
        let club_b = Uuid::new_v4();
        let mut entries = vec![
            entry(club_a, "Muni", MembershipStatus::Pending),
            entry(club_b, "Estrella", MembershipStatus::Active),
        ];

        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::days(1);
        let outcome = upsert_membership(
            &mut entries,
            club_a,
            MembershipPatch {
                status: Some(MembershipStatus::Active),
                ..Default::default()
            },
            now,
        );

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].club_id, club_a);
        assert_eq!(entries[0].status, MembershipStatus::Active);
        assert_eq!(entries[0].categories, vec!["cadetes".to_owned()]);
        assert_eq!(entries[0].updated_at, now);
        // Sibling entry untouched.
        assert_eq!(entries[1].updated_at, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn upsert_appends_when_no_entry_matches() {
        let mut entries = vec![entry(Uuid::new_v4(), "Muni", MembershipStatus::Active)];
        let new_club = Uuid::new_v4();

        let outcome = upsert_membership(
            &mut entries,
            new_club,
            MembershipPatch {
                club_name: Some("Olimpia".to_owned()),
                categories: Some(vec!["juveniles".to_owned()]),
                status: Some(MembershipStatus::Active),
            },
            OffsetDateTime::UNIX_EPOCH,
        );

        assert_eq!(outcome, UpsertOutcome::Appended);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].club_id, new_club);
        assert_eq!(entries[1].club_name, "Olimpia");
    }

    #[test]
    fn upsert_never_duplicates_a_club_id() {
        let club = Uuid::new_v4();
        let mut entries = vec![entry(club, "Muni", MembershipStatus::Pending)];

        for _ in 0..3 {
            upsert_membership(
                &mut entries,
                club,
                MembershipPatch::default(),
                OffsetDateTime::UNIX_EPOCH,
            );
        }

        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut entries: Vec<ClubMembership> = ids
            .iter()
            .map(|id| entry(*id, "club", MembershipStatus::Active))
            .collect();

        let removed = remove_membership(&mut entries, ids[1]).unwrap();
        assert_eq!(removed.club_id, ids[1]);
        assert_eq!(
            entries.iter().map(|e| e.club_id).collect::<Vec<_>>(),
            vec![ids[0], ids[2]]
        );
        assert!(remove_membership(&mut entries, ids[1]).is_none());
    }

    #[test]
    fn category_difference_reports_only_new_categories() {
        let existing = vec!["cadetes".to_owned(), "juveniles".to_owned()];
        let requested = vec!["juveniles".to_owned(), "mayores".to_owned()];
        assert_eq!(
            category_difference(&existing, &requested),
            vec!["mayores".to_owned()]
        );
        assert!(category_difference(&existing, &existing).is_empty());
    }
}
