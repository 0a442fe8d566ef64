use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        audit,
        campaigns::{self, CampaignRepository},
        clubs::{CLUBS, ClubRepository},
        coaches::CoachRepository,
        models::{CampaignKind, CampaignRecord, CampaignStatus, TicketRecord, TicketStatus},
        players::{PLAYERS, PlayerRepository},
        store::Fields,
    },
    domain::roles::Role,
    error::WorkflowError,
    services::{access::Actor, rfc3339_string},
    state::SharedState,
};

/// Target entities per batch; each target costs at most two writes, keeping
/// every batch inside the store's operation cap.
const TARGETS_PER_BATCH: usize = crate::dao::storage::MAX_BATCH_OPERATIONS / 2;

/// Input for campaign creation.
#[derive(Debug, Clone, Copy)]
pub struct CampaignInput {
    /// Membership year the round bills for.
    pub year: i32,
    /// Unit amount billed per ticket.
    pub amount: i64,
}

/// Result of a completed campaign fan-out.
#[derive(Debug)]
pub struct CampaignOutcome {
    /// The campaign record, marked ACTIVA.
    pub campaign: CampaignRecord,
    /// Tickets created by this run.
    pub tickets_created: usize,
    /// Entities that received the enablement flag directly (scholarship
    /// holders).
    pub exempted: usize,
    /// Entities skipped because a previous run already issued their ticket.
    pub skipped_existing: usize,
}

/// Result of settling one ticket.
#[derive(Debug)]
pub struct SettlementOutcome {
    /// Whether the ticket was already paid; settling twice is a success
    /// that changes nothing.
    pub already_paid: bool,
}

/// Result of a federation-admin bulk settlement.
pub struct BulkSettlementOutcome {
    /// Tickets settled by this call.
    pub paid: usize,
    /// Tickets that were already settled.
    pub already_paid: usize,
}

struct FanoutTarget {
    owner_id: Uuid,
    club_id: Option<Uuid>,
    exempt: bool,
}

/// Create the yearly player-enrollment campaign and fan out one ticket per
/// non-exempt player.
pub async fn create_enrollment_campaign(
    state: &SharedState,
    actor: &Actor,
    input: CampaignInput,
) -> Result<CampaignOutcome, WorkflowError> {
    create_campaign(state, actor, CampaignKind::Enrollment, input).await
}

/// Create the yearly club-membership campaign and fan out one ticket per
/// club.
pub async fn create_membership_campaign(
    state: &SharedState,
    actor: &Actor,
    input: CampaignInput,
) -> Result<CampaignOutcome, WorkflowError> {
    create_campaign(state, actor, CampaignKind::Membership, input).await
}

/// Create the yearly coach-insurance campaign and fan out one ticket per
/// coach.
pub async fn create_insurance_campaign(
    state: &SharedState,
    actor: &Actor,
    input: CampaignInput,
) -> Result<CampaignOutcome, WorkflowError> {
    create_campaign(state, actor, CampaignKind::Insurance, input).await
}

/// The campaign engine shared by every kind.
///
/// The campaign record is claimed in a transaction (duplicate years
/// conflict, an INTERRUMPIDA record is resumed), then tickets fan out in
/// sequential batches. Every target is probed for an existing ticket first,
/// so resuming never duplicates one; a failing batch aborts the remaining
/// chunks and leaves the campaign INTERRUMPIDA.
async fn create_campaign(
    state: &SharedState,
    actor: &Actor,
    kind: CampaignKind,
    input: CampaignInput,
) -> Result<CampaignOutcome, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    if input.year < 2000 || input.amount <= 0 {
        return Err(WorkflowError::Validation(
            "campaign year and amount are out of range".to_owned(),
        ));
    }

    let created_by = actor.id;
    let mut campaign = state
        .store()
        .run_transaction::<CampaignRecord, WorkflowError, _>(|tx| {
            Box::pin(async move {
                if let Some(existing) = campaigns::find_campaign_in_tx(tx, kind, input.year).await?
                {
                    return match existing.status {
                        CampaignStatus::Active => Err(WorkflowError::DuplicateCampaign {
                            kind,
                            year: input.year,
                        }),
                        // A cut-short fan-out may be resumed.
                        CampaignStatus::Interrupted => Ok(existing),
                    };
                }

                let now = OffsetDateTime::now_utc();
                let campaign = CampaignRecord {
                    id: Uuid::new_v4(),
                    kind,
                    year: input.year,
                    amount: input.amount,
                    status: CampaignStatus::Interrupted,
                    created_by,
                    created_at: now,
                    updated_at: now,
                };
                campaigns::save_campaign_in_tx(tx, &campaign)?;
                Ok(campaign)
            })
        })
        .await?;

    let targets = collect_targets(state, kind).await?;
    let repository = CampaignRepository::new(state.store().clone());

    let mut tickets_created = 0usize;
    let mut exempted = 0usize;
    let mut skipped_existing = 0usize;
    let mut processed = 0usize;

    for chunk in targets.chunks(TARGETS_PER_BATCH) {
        let mut batch = state.store().batch();
        let now = OffsetDateTime::now_utc();

        for target in chunk {
            if repository
                .find_ticket_for_owner(kind, campaign.id, target.owner_id)
                .await?
                .is_some()
            {
                skipped_existing += 1;
                continue;
            }

            if target.exempt {
                if let Some((collection, patch)) = enablement_patch(kind, true, now) {
                    batch.update(collection, &target.owner_id.to_string(), patch);
                }
                exempted += 1;
                continue;
            }

            let ticket = TicketRecord {
                id: Uuid::new_v4(),
                campaign_id: campaign.id,
                kind,
                year: campaign.year,
                amount: campaign.amount,
                owner_id: target.owner_id,
                club_id: target.club_id,
                status: TicketStatus::Pending,
                paid_at: None,
                created_at: now,
                updated_at: now,
            };
            let fields = crate::dao::store::encode(kind.ticket_collection(), &ticket)?;
            batch.set(kind.ticket_collection(), &ticket.id.to_string(), fields);

            if let Some((collection, patch)) = enablement_patch(kind, false, now) {
                batch.update(collection, &target.owner_id.to_string(), patch);
            }
            tickets_created += 1;
        }

        if !batch.is_empty() {
            batch
                .commit()
                .await
                .map_err(|source| WorkflowError::CampaignInterrupted {
                    completed: processed,
                    source,
                })?;
        }
        processed += chunk.len();
    }

    // Fan-out complete: the campaign goes ACTIVA.
    let now = OffsetDateTime::now_utc();
    campaign.status = CampaignStatus::Active;
    campaign.updated_at = now;
    repository.save_campaign(&campaign).await?;

    audit::record(
        state.store(),
        &actor.email,
        "create-campaign",
        kind.campaign_collection(),
        &campaign.id.to_string(),
    )
    .await;

    Ok(CampaignOutcome {
        campaign,
        tickets_created,
        exempted,
        skipped_existing,
    })
}

async fn collect_targets(
    state: &SharedState,
    kind: CampaignKind,
) -> Result<Vec<FanoutTarget>, WorkflowError> {
    let targets = match kind {
        CampaignKind::Enrollment => PlayerRepository::new(state.store().clone())
            .list_all()
            .await?
            .into_iter()
            .map(|player| FanoutTarget {
                owner_id: player.id,
                club_id: player.clubs.first().map(|entry| entry.club_id),
                exempt: player.scholarship_holder,
            })
            .collect(),
        CampaignKind::Membership => ClubRepository::new(state.store().clone())
            .list_all()
            .await?
            .into_iter()
            .map(|club| FanoutTarget {
                owner_id: club.id,
                club_id: Some(club.id),
                exempt: false,
            })
            .collect(),
        CampaignKind::Insurance => CoachRepository::new(state.store().clone())
            .list_all()
            .await?
            .into_iter()
            .map(|coach| FanoutTarget {
                owner_id: coach.id,
                club_id: coach.clubs.first().map(|entry| entry.club_id),
                exempt: false,
            })
            .collect(),
    };
    Ok(targets)
}

/// The enablement-flag patch cascaded onto the owning entity, when the kind
/// has one.
fn enablement_patch(
    kind: CampaignKind,
    enabled: bool,
    now: OffsetDateTime,
) -> Option<(&'static str, Fields)> {
    let stamp = Value::String(rfc3339_string(now));
    match kind {
        CampaignKind::Enrollment => {
            let reason = if enabled {
                Value::Null
            } else {
                Value::String("EMPADRONAMIENTO_PENDIENTE".to_owned())
            };
            Some((
                PLAYERS,
                Fields::from_iter([
                    ("habilitadoParaJugar".to_owned(), Value::Bool(enabled)),
                    ("motivoInhabilitacion".to_owned(), reason),
                    ("updatedAt".to_owned(), stamp),
                ]),
            ))
        }
        CampaignKind::Membership => Some((
            CLUBS,
            Fields::from_iter([
                ("habilitadoAsambal".to_owned(), Value::Bool(enabled)),
                ("updatedAt".to_owned(), stamp),
            ]),
        )),
        CampaignKind::Insurance => None,
    }
}

/// Settle one ticket and cascade the enablement flag onto its owner.
///
/// `acting_owner` fences the call to the ticket's owning entity; federation
/// admins pass `None` to settle on anyone's behalf. Paying an already-paid
/// ticket succeeds without touching anything.
pub async fn pay_ticket(
    state: &SharedState,
    kind: CampaignKind,
    ticket_id: Uuid,
    acting_owner: Option<Uuid>,
) -> Result<SettlementOutcome, WorkflowError> {
    state
        .store()
        .run_transaction::<SettlementOutcome, WorkflowError, _>(|tx| {
            Box::pin(async move {
                let mut ticket = campaigns::get_ticket_in_tx(tx, kind, ticket_id)
                    .await?
                    .ok_or_else(|| WorkflowError::NotFound(format!("ticket `{ticket_id}`")))?;

                if let Some(owner) = acting_owner {
                    if ticket.owner_id != owner {
                        return Err(WorkflowError::Forbidden(
                            "ticket belongs to another entity".to_owned(),
                        ));
                    }
                }

                if ticket.status == TicketStatus::Paid {
                    return Ok(SettlementOutcome { already_paid: true });
                }

                let now = OffsetDateTime::now_utc();
                ticket.status = TicketStatus::Paid;
                ticket.paid_at = Some(now);
                ticket.updated_at = now;
                campaigns::save_ticket_in_tx(tx, &ticket)?;

                if let Some((collection, patch)) = enablement_patch(kind, true, now) {
                    tx.update(collection, &ticket.owner_id.to_string(), patch);
                }

                Ok(SettlementOutcome { already_paid: false })
            })
        })
        .await
}

/// Federation-admin mass settlement (cash collected at the counter).
pub async fn pay_tickets_bulk(
    state: &SharedState,
    actor: &Actor,
    kind: CampaignKind,
    ticket_ids: &[Uuid],
) -> Result<BulkSettlementOutcome, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;

    let mut paid = 0usize;
    let mut already_paid = 0usize;
    for ticket_id in ticket_ids {
        let outcome = pay_ticket(state, kind, *ticket_id, None).await?;
        if outcome.already_paid {
            already_paid += 1;
        } else {
            paid += 1;
        }
    }

    audit::record(
        state.store(),
        &actor.email,
        "pay-tickets-bulk",
        kind.ticket_collection(),
        &format!("{paid} paid, {already_paid} already paid"),
    )
    .await;

    Ok(BulkSettlementOutcome { paid, already_paid })
}

/// Every ticket of a kind (federation admin view).
pub async fn list_tickets(
    state: &SharedState,
    actor: &Actor,
    kind: CampaignKind,
) -> Result<Vec<TicketRecord>, WorkflowError> {
    actor.require_role(Role::FederationAdmin)?;
    Ok(CampaignRepository::new(state.store().clone())
        .list_tickets(kind)
        .await?)
}

/// Tickets of a kind scoped to the acting admin's club.
pub async fn club_tickets(
    state: &SharedState,
    actor: &Actor,
    kind: CampaignKind,
) -> Result<Vec<TicketRecord>, WorkflowError> {
    actor.require_role(Role::ClubAdmin)?;
    let club_id = actor.active_club()?.club_id;
    Ok(CampaignRepository::new(state.store().clone())
        .list_tickets_by_club(kind, club_id)
        .await?)
}

/// Tickets owed by the acting entity itself (player enrollment or coach
/// insurance).
pub async fn my_tickets(
    state: &SharedState,
    actor: &Actor,
    kind: CampaignKind,
) -> Result<Vec<TicketRecord>, WorkflowError> {
    actor.require_any_role(&[Role::Player, Role::Coach])?;
    Ok(CampaignRepository::new(state.store().clone())
        .list_tickets_by_owner(kind, actor.id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::status::MembershipStatus,
        testing::{
            club_admin_actor, fed_admin_actor, player_actor, seed_active_club, seed_player,
            seed_scholarship_player, test_state,
        },
    };

    #[tokio::test]
    async fn enrollment_fan_out_skips_scholarship_holders() {
        let state = test_state();
        let admin = fed_admin_actor();
        let club = seed_active_club(&state, "Municipalidad").await;

        let paying_a = seed_player(
            &state,
            "a@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;
        let paying_b = seed_player(
            &state,
            "b@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;
        let exempt = seed_scholarship_player(
            &state,
            "becada@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;

        let outcome = create_enrollment_campaign(
            &state,
            &admin,
            CampaignInput {
                year: 2025,
                amount: 1000,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.tickets_created, 2);
        assert_eq!(outcome.exempted, 1);
        assert_eq!(outcome.campaign.status, CampaignStatus::Active);

        let tickets = CampaignRepository::new(state.store().clone())
            .list_tickets(CampaignKind::Enrollment)
            .await
            .unwrap();
        assert_eq!(tickets.len(), 2);
        for ticket in &tickets {
            assert_eq!(ticket.status, TicketStatus::Pending);
            assert_eq!(ticket.amount, 1000);
            assert_eq!(ticket.year, 2025);
            assert!([paying_a.id, paying_b.id].contains(&ticket.owner_id));
        }

        // Exempt holder got the flag directly, payers lost it.
        let players = crate::dao::players::PlayerRepository::new(state.store().clone());
        assert!(players.find_by_id(exempt.id).await.unwrap().unwrap().enabled_to_play);
        assert!(!players.find_by_id(paying_a.id).await.unwrap().unwrap().enabled_to_play);
    }

    #[tokio::test]
    async fn duplicate_campaign_years_conflict() {
        let state = test_state();
        let admin = fed_admin_actor();
        let input = CampaignInput {
            year: 2025,
            amount: 1000,
        };

        create_enrollment_campaign(&state, &admin, input).await.unwrap();
        let err = create_enrollment_campaign(&state, &admin, input)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::DuplicateCampaign { year: 2025, .. }
        ));

        // A different kind for the same year is fine.
        create_membership_campaign(&state, &admin, input).await.unwrap();
    }

    #[tokio::test]
    async fn membership_fan_out_targets_every_club() {
        let state = test_state();
        let admin = fed_admin_actor();
        let muni = seed_active_club(&state, "Municipalidad").await;
        seed_active_club(&state, "Olimpia").await;

        let outcome = create_membership_campaign(
            &state,
            &admin,
            CampaignInput {
                year: 2025,
                amount: 50_000,
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome.tickets_created, 2);

        let clubs = ClubRepository::new(state.store().clone());
        assert!(!clubs.find_by_id(muni.id).await.unwrap().unwrap().asambal_enabled);
    }

    #[tokio::test]
    async fn settlement_is_idempotent_and_cascades_the_flag() {
        let state = test_state();
        let admin = fed_admin_actor();
        let club = seed_active_club(&state, "Municipalidad").await;
        let player = seed_player(
            &state,
            "a@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;

        create_enrollment_campaign(
            &state,
            &admin,
            CampaignInput {
                year: 2025,
                amount: 1000,
            },
        )
        .await
        .unwrap();

        let as_player = player_actor(player.id, "a@club.test");
        let tickets = my_tickets(&state, &as_player, CampaignKind::Enrollment)
            .await
            .unwrap();
        assert_eq!(tickets.len(), 1);
        let ticket_id = tickets[0].id;

        let outcome = pay_ticket(&state, CampaignKind::Enrollment, ticket_id, Some(player.id))
            .await
            .unwrap();
        assert!(!outcome.already_paid);

        let players = crate::dao::players::PlayerRepository::new(state.store().clone());
        let stored = players.find_by_id(player.id).await.unwrap().unwrap();
        assert!(stored.enabled_to_play);
        assert_eq!(stored.ineligibility_reason, None);

        let paid_at = CampaignRepository::new(state.store().clone())
            .find_ticket(CampaignKind::Enrollment, ticket_id)
            .await
            .unwrap()
            .unwrap()
            .paid_at;

        // Second settlement: success, nothing changes.
        let outcome = pay_ticket(&state, CampaignKind::Enrollment, ticket_id, Some(player.id))
            .await
            .unwrap();
        assert!(outcome.already_paid);
        let after = CampaignRepository::new(state.store().clone())
            .find_ticket(CampaignKind::Enrollment, ticket_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.paid_at, paid_at);
    }

    #[tokio::test]
    async fn settlement_is_fenced_to_the_owner() {
        let state = test_state();
        let admin = fed_admin_actor();
        let club = seed_active_club(&state, "Municipalidad").await;
        let player = seed_player(
            &state,
            "a@club.test",
            &[(club.id, "Municipalidad", MembershipStatus::Active)],
        )
        .await;
        create_enrollment_campaign(
            &state,
            &admin,
            CampaignInput {
                year: 2025,
                amount: 1000,
            },
        )
        .await
        .unwrap();

        let ticket_id = CampaignRepository::new(state.store().clone())
            .list_tickets(CampaignKind::Enrollment)
            .await
            .unwrap()[0]
            .id;

        let err = pay_ticket(
            &state,
            CampaignKind::Enrollment,
            ticket_id,
            Some(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        // The admin override settles it.
        let outcome = pay_ticket(&state, CampaignKind::Enrollment, ticket_id, None)
            .await
            .unwrap();
        assert!(!outcome.already_paid);
        let _ = player;
    }

    #[tokio::test]
    async fn club_admins_pay_their_membership_ticket() {
        let state = test_state();
        let admin = fed_admin_actor();
        let club = seed_active_club(&state, "Municipalidad").await;
        create_membership_campaign(
            &state,
            &admin,
            CampaignInput {
                year: 2025,
                amount: 50_000,
            },
        )
        .await
        .unwrap();

        let club_admin = club_admin_actor(club.id, "Municipalidad");
        let tickets = club_tickets(&state, &club_admin, CampaignKind::Membership)
            .await
            .unwrap();
        assert_eq!(tickets.len(), 1);

        pay_ticket(
            &state,
            CampaignKind::Membership,
            tickets[0].id,
            Some(club.id),
        )
        .await
        .unwrap();

        let stored = ClubRepository::new(state.store().clone())
            .find_by_id(club.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.asambal_enabled);
    }
}
