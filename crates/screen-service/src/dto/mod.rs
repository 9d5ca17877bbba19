//! Data transfer objects for API requests and responses

pub mod requests;
pub mod responses;

pub use requests::{
    CreateCompetitionRequest, DeleteFriendRequest, HandleFriendRequestRequest,
    HandleInvitationRequest, LoginRequest, SendFriendRequestRequest, SendInvitationRequest,
    SignupRequest, UpdateProfileRequest, UpdateScreenTimeRequest,
};
pub use responses::{
    AuthResponse, CompetitionDetailResponse, CompetitionSummaryResponse, FriendRequestsResponse,
    HealthResponse, InvitationHandledResponse, InvitationResponse, LeaderboardResponse,
    MessageResponse, ParticipantResponse, ProfileResponse, ReadinessResponse,
    ReceivedRequestResponse, ScreenTimeUpdateResponse, SentRequestResponse, SuccessResponse,
    UserResponse, UserSummary,
};
