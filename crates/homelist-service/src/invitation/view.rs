//! Invitation listings as shown to their participants.

use serde::Serialize;

use homelist_entity::home::HomeSummary;
use homelist_entity::invitation::HomeInvitation;
use homelist_entity::user::UserSummary;

/// An invitation together with the home it concerns and who sent it.
///
/// `home` and `from_user` are `None` when the record has since been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: HomeInvitation,
    pub home: Option<HomeSummary>,
    pub from_user: Option<UserSummary>,
}
