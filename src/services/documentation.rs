use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the federation backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::activate,
        crate::routes::clubs::list_clubs,
        crate::routes::clubs::create_club,
        crate::routes::clubs::my_club,
        crate::routes::clubs::update_my_club,
        crate::routes::clubs::club_coaches,
        crate::routes::clubs::pending_coaches,
        crate::routes::clubs::club_players,
        crate::routes::clubs::club_pending_players,
        crate::routes::clubs::membership_tickets,
        crate::routes::clubs::pay_membership_ticket,
        crate::routes::clubs::get_club,
        crate::routes::clubs::update_club,
        crate::routes::clubs::toggle_club,
        crate::routes::clubs::complete_profile,
        crate::routes::clubs::upload_hero,
        crate::routes::coaches::create_coach,
        crate::routes::coaches::send_join_request,
        crate::routes::coaches::my_join_requests,
        crate::routes::coaches::respond_join_request,
        crate::routes::coaches::complete_profile,
        crate::routes::coaches::prefill,
        crate::routes::coaches::my_profile,
        crate::routes::coaches::update_my_profile,
        crate::routes::coaches::my_players,
        crate::routes::coaches::my_insurance_tickets,
        crate::routes::coaches::pay_insurance_ticket,
        crate::routes::coaches::update_categories,
        crate::routes::coaches::confirm_categories,
        crate::routes::coaches::validate,
        crate::routes::coaches::toggle,
        crate::routes::players::create_player,
        crate::routes::players::complete_profile,
        crate::routes::players::my_profile,
        crate::routes::players::update_my_profile,
        crate::routes::players::my_tickets,
        crate::routes::players::my_transfers,
        crate::routes::players::pay_ticket,
        crate::routes::players::decide_transfer,
        crate::routes::players::validate,
        crate::routes::players::confirm_categories,
        crate::routes::players::request_transfer,
        crate::routes::asambal::pending_users,
        crate::routes::asambal::validate_user,
        crate::routes::asambal::all_players,
        crate::routes::asambal::player_detail,
        crate::routes::asambal::players_with_scholarship,
        crate::routes::asambal::scholarship_history,
        crate::routes::asambal::grant_scholarship,
        crate::routes::asambal::revoke_scholarship,
        crate::routes::asambal::create_enrollment,
        crate::routes::asambal::enrollment_tickets,
        crate::routes::asambal::bulk_pay_enrollment,
        crate::routes::asambal::create_membership,
        crate::routes::asambal::create_insurance,
        crate::routes::asambal::list_transfers,
        crate::routes::asambal::decide_transfer,
        crate::routes::asambal::all_coaches,
        crate::routes::asambal::coach_detail,
        crate::routes::categories::list_categories,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::LoginResponse,
            crate::dto::auth::RefreshRequest,
            crate::dto::auth::TokenResponse,
            crate::dto::auth::ActivateRequest,
            crate::dto::auth::ActivateResponse,
            crate::dto::clubs::CreateClubRequest,
            crate::dto::clubs::CreateClubResponse,
            crate::dto::clubs::ClubSummary,
            crate::dto::clubs::CompleteClubProfileRequest,
            crate::dto::clubs::UpdateClubRequest,
            crate::dto::clubs::UpdateMyClubRequest,
            crate::dto::clubs::PendingClubAdminSummary,
            crate::dto::clubs::HeroUploadResponse,
            crate::dto::coaches::CreateCoachRequest,
            crate::dto::coaches::CreateCoachResponse,
            crate::dto::coaches::CompleteCoachProfileRequest,
            crate::dto::coaches::CoachPrefillResponse,
            crate::dto::coaches::ClubCoachSummary,
            crate::dto::coaches::CoachDetail,
            crate::dto::coaches::JoinRequestSummary,
            crate::dto::coaches::UpdateMyCoachRequest,
            crate::dto::coaches::CoachCategoriesRequest,
            crate::dto::players::CreatePlayerRequest,
            crate::dto::players::CreatePlayerResponse,
            crate::dto::players::CompletePlayerProfileRequest,
            crate::dto::players::PlayerSummary,
            crate::dto::players::TutorDto,
            crate::dto::players::UpdateMyPlayerRequest,
            crate::dto::transfers::CreateTransferRequest,
            crate::dto::transfers::TransferSummary,
            crate::dto::transfers::TransferClubSummary,
            crate::dto::scholarships::ScholarshipSummary,
            crate::dto::scholarships::ScholarshipHolderSummary,
            crate::dto::campaigns::CreateCampaignRequest,
            crate::dto::campaigns::CampaignResponse,
            crate::dto::campaigns::TicketSummary,
            crate::dto::campaigns::PayTicketResponse,
            crate::dto::campaigns::BulkPayRequest,
            crate::dto::campaigns::BulkPayResponse,
            crate::dto::categories::CategorySummary,
            crate::dto::common::ApprovalAction,
            crate::dto::common::ConsentAction,
            crate::dto::common::MessageResponse,
            crate::dto::common::StatusResponse,
            crate::dto::common::MembershipSummary,
            crate::routes::coaches::ValidateCoachRequest,
            crate::routes::coaches::RespondJoinRequest,
            crate::routes::players::ValidatePlayerRequest,
            crate::routes::players::TransferConsentRequest,
            crate::routes::players::PlayerCategoriesRequest,
            crate::routes::asambal::ValidateUserRequest,
            crate::routes::asambal::TransferDecisionRequest,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and account activation"),
        (name = "clubs", description = "Club management"),
        (name = "coaches", description = "Coach management"),
        (name = "players", description = "Player management"),
        (name = "asambal", description = "Federation administration"),
        (name = "categories", description = "Playing categories"),
    )
)]
pub struct ApiDoc;
