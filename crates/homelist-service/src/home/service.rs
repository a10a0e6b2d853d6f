//! Home lifecycle and member management.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use homelist_core::error::{AppError, ErrorReason};
use homelist_core::types::{HomeId, UserId};
use homelist_database::repositories::{
    HomeRepository, InvitationRepository, MemberUpdate, ShoppingListRepository, UserRepository,
};
use homelist_entity::home::{Home, HomeUpdate, MemberSummary};

use crate::context::RequestContext;

/// Data for creating a home.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateHomeRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Data for editing a home; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHomeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Home operations. The creator is always a member and can never be
/// removed; only the creator may edit, delete or remove members.
#[derive(Clone)]
pub struct HomeService {
    homes: Arc<dyn HomeRepository>,
    users: Arc<dyn UserRepository>,
    invitations: Arc<dyn InvitationRepository>,
    shopping_lists: Arc<dyn ShoppingListRepository>,
}

impl std::fmt::Debug for HomeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeService").finish_non_exhaustive()
    }
}

impl HomeService {
    pub fn new(
        homes: Arc<dyn HomeRepository>,
        users: Arc<dyn UserRepository>,
        invitations: Arc<dyn InvitationRepository>,
        shopping_lists: Arc<dyn ShoppingListRepository>,
    ) -> Self {
        Self {
            homes,
            users,
            invitations,
            shopping_lists,
        }
    }

    /// Create a home with the caller as creator and only member.
    pub async fn create_home(
        &self,
        ctx: &RequestContext,
        req: CreateHomeRequest,
    ) -> Result<Home, AppError> {
        let home = Home::new(
            ctx.user_id,
            &req.name,
            req.description.as_deref().unwrap_or_default(),
            Utc::now(),
        )?;
        self.homes.create(&home).await?;

        info!(user_id = %ctx.user_id, home_id = %home.id, "Home created");
        Ok(home)
    }

    /// Homes the caller belongs to, newest first.
    pub async fn list_homes(&self, ctx: &RequestContext) -> Result<Vec<Home>, AppError> {
        self.homes.list_for_member(ctx.user_id).await
    }

    pub async fn get_home(&self, ctx: &RequestContext, home_id: HomeId) -> Result<Home, AppError> {
        let home = self.load(home_id).await?;
        require_member(&home, ctx.user_id)?;
        Ok(home)
    }

    pub async fn update_home(
        &self,
        ctx: &RequestContext,
        home_id: HomeId,
        req: UpdateHomeRequest,
    ) -> Result<Home, AppError> {
        let home = self.load(home_id).await?;
        require_creator(&home, ctx.user_id, "Only the home creator can edit the home")?;

        let update = HomeUpdate::normalized(req.name.as_deref(), req.description.as_deref())?;
        if update.is_empty() {
            return Ok(home);
        }

        let home = self
            .homes
            .update(home_id, &update, Utc::now())
            .await?
            .ok_or_else(home_not_found)?;

        info!(user_id = %ctx.user_id, home_id = %home_id, "Home updated");
        Ok(home)
    }

    /// Delete a home. Its shopping lists become personal lists of their
    /// owners and its invitations are dropped.
    pub async fn delete_home(&self, ctx: &RequestContext, home_id: HomeId) -> Result<(), AppError> {
        let home = self.load(home_id).await?;
        require_creator(&home, ctx.user_id, "Only the home creator can delete the home")?;

        let now = Utc::now();
        let detached = self.shopping_lists.detach_home(home_id, now).await?;
        let invitations = self.invitations.delete_by_home(home_id).await?;
        if !self.homes.delete(home_id).await? {
            return Err(home_not_found());
        }

        info!(
            user_id = %ctx.user_id,
            home_id = %home_id,
            detached_lists = detached,
            deleted_invitations = invitations,
            "Home deleted"
        );
        Ok(())
    }

    /// Leave a home. The creator cannot leave.
    pub async fn leave_home(&self, ctx: &RequestContext, home_id: HomeId) -> Result<(), AppError> {
        let home = self.load(home_id).await?;
        if home.is_creator(ctx.user_id) {
            return Err(AppError::conflict(
                ErrorReason::InvalidAction,
                "The home creator cannot leave the home",
            ));
        }
        if !home.is_member(ctx.user_id) {
            return Err(not_a_member());
        }

        match self.homes.remove_member(home_id, ctx.user_id, Utc::now()).await? {
            MemberUpdate::Applied(_) => {
                info!(user_id = %ctx.user_id, home_id = %home_id, "Member left home");
                Ok(())
            }
            MemberUpdate::Unchanged => Err(not_a_member()),
            MemberUpdate::HomeNotFound => Err(home_not_found()),
        }
    }

    /// Members of a home, creator included. Visible to members only.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        home_id: HomeId,
    ) -> Result<Vec<MemberSummary>, AppError> {
        let home = self.get_home(ctx, home_id).await?;
        let users = self.users.find_many(&home.members).await?;

        let mut members: Vec<MemberSummary> = users
            .into_iter()
            .map(|u| MemberSummary {
                is_creator: home.is_creator(u.id),
                id: u.id,
                name: u.name,
                email: u.email,
                photo: u.photo,
            })
            .collect();
        members.sort_by_key(|m| home.members.iter().position(|id| *id == m.id));
        Ok(members)
    }

    /// Remove a member. Only the creator may do this, and never to themselves.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        home_id: HomeId,
        member_id: UserId,
    ) -> Result<Home, AppError> {
        let home = self.load(home_id).await?;
        require_creator(&home, ctx.user_id, "Only the home creator can remove members")?;
        if home.is_creator(member_id) {
            return Err(AppError::conflict(
                ErrorReason::InvalidAction,
                "The home creator cannot be removed",
            ));
        }

        match self.homes.remove_member(home_id, member_id, Utc::now()).await? {
            MemberUpdate::Applied(home) => {
                info!(
                    user_id = %ctx.user_id,
                    home_id = %home_id,
                    member_id = %member_id,
                    "Member removed"
                );
                Ok(home)
            }
            MemberUpdate::Unchanged => Err(not_a_member()),
            MemberUpdate::HomeNotFound => Err(home_not_found()),
        }
    }

    async fn load(&self, home_id: HomeId) -> Result<Home, AppError> {
        self.homes
            .find_by_id(home_id)
            .await?
            .ok_or_else(home_not_found)
    }
}

pub(crate) fn home_not_found() -> AppError {
    AppError::not_found("Home not found")
}

fn not_a_member() -> AppError {
    AppError::conflict(ErrorReason::NotAMember, "User is not a member of this home")
}

fn require_member(home: &Home, user_id: UserId) -> Result<(), AppError> {
    if home.is_member(user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You are not a member of this home"))
    }
}

fn require_creator(home: &Home, user_id: UserId, message: &str) -> Result<(), AppError> {
    if home.is_creator(user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use homelist_core::types::Jti;
    use homelist_database::Store;
    use homelist_entity::shopping_list::ShoppingList;
    use homelist_entity::user::{NewUser, User};

    struct Fixture {
        store: Store,
        service: HomeService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Store::memory();
            let service = HomeService::new(
                store.homes.clone(),
                store.users.clone(),
                store.invitations.clone(),
                store.shopping_lists.clone(),
            );
            Self { store, service }
        }

        async fn user(&self, handle: &str) -> (User, RequestContext) {
            let user = self
                .store
                .users
                .create(
                    NewUser::local(&format!("{handle}@x.com"), handle, "hash".into(), handle),
                    Utc::now(),
                )
                .await
                .expect("create user");
            let ctx = RequestContext::new(user.id, None, Jti::new(), Utc::now());
            (user, ctx)
        }

        async fn home_with_member(&self) -> (RequestContext, RequestContext, Home) {
            let (_, a) = self.user("a").await;
            let (b_user, b) = self.user("b").await;
            let home = self
                .service
                .create_home(&a, CreateHomeRequest { name: "Kitchen".into(), description: None })
                .await
                .expect("create home");
            self.store
                .homes
                .add_member(home.id, b_user.id, Utc::now())
                .await
                .expect("add member");
            (a, b, home)
        }
    }

    #[tokio::test]
    async fn test_creator_is_only_initial_member() {
        let fx = Fixture::new();
        let (a_user, a) = fx.user("a").await;
        let home = fx
            .service
            .create_home(&a, CreateHomeRequest { name: " Kitchen ".into(), description: None })
            .await
            .expect("create");
        assert_eq!(home.name, "Kitchen");
        assert_eq!(home.members, vec![a_user.id]);
    }

    #[tokio::test]
    async fn test_non_member_cannot_view_home() {
        let fx = Fixture::new();
        let (_, a) = fx.user("a").await;
        let (_, c) = fx.user("c").await;
        let home = fx
            .service
            .create_home(&a, CreateHomeRequest { name: "Kitchen".into(), description: None })
            .await
            .expect("create");
        let err = fx.service.get_home(&c, home.id).await.unwrap_err();
        assert!(err.is(ErrorReason::Forbidden));
    }

    #[tokio::test]
    async fn test_creator_can_never_be_removed() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;

        let err = fx.service.remove_member(&a, home.id, a.user_id).await.unwrap_err();
        assert!(err.is(ErrorReason::InvalidAction));

        let err = fx.service.remove_member(&b, home.id, a.user_id).await.unwrap_err();
        assert!(err.is(ErrorReason::Forbidden));

        let err = fx.service.leave_home(&a, home.id).await.unwrap_err();
        assert!(err.is(ErrorReason::InvalidAction));

        let home = fx.service.get_home(&a, home.id).await.expect("home");
        assert!(home.is_member(a.user_id));
    }

    #[tokio::test]
    async fn test_remove_then_remove_again_is_not_a_member() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;

        let updated = fx.service.remove_member(&a, home.id, b.user_id).await.expect("remove");
        assert_eq!(updated.members, vec![a.user_id]);

        let err = fx.service.remove_member(&a, home.id, b.user_id).await.unwrap_err();
        assert!(err.is(ErrorReason::NotAMember));
    }

    #[tokio::test]
    async fn test_member_can_leave() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;
        fx.service.leave_home(&b, home.id).await.expect("leave");

        let err = fx.service.leave_home(&b, home.id).await.unwrap_err();
        assert!(err.is(ErrorReason::NotAMember));
        assert_eq!(fx.service.list_homes(&b).await.expect("list").len(), 0);
        assert_eq!(fx.service.list_homes(&a).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_list_members_marks_creator() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;
        let members = fx.service.list_members(&b, home.id).await.expect("members");

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, a.user_id);
        assert!(members[0].is_creator);
        assert!(!members[1].is_creator);
    }

    #[tokio::test]
    async fn test_update_home_is_creator_only() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;

        let err = fx
            .service
            .update_home(&b, home.id, UpdateHomeRequest { name: Some("Mine".into()), description: None })
            .await
            .unwrap_err();
        assert!(err.is(ErrorReason::Forbidden));

        let err = fx
            .service
            .update_home(&a, home.id, UpdateHomeRequest { name: Some("  ".into()), description: None })
            .await
            .unwrap_err();
        assert!(err.is(ErrorReason::MissingField));

        let updated = fx
            .service
            .update_home(
                &a,
                home.id,
                UpdateHomeRequest {
                    name: Some("Pantry".into()),
                    description: Some("Dry goods".into()),
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Pantry");
        assert_eq!(updated.description, "Dry goods");
    }

    #[tokio::test]
    async fn test_delete_home_detaches_shopping_lists() {
        let fx = Fixture::new();
        let (a, b, home) = fx.home_with_member().await;
        let list = ShoppingList::new(b.user_id, "Groceries", Some(home.id), Utc::now());
        fx.store.shopping_lists.create(&list).await.expect("list");

        let err = fx.service.delete_home(&b, home.id).await.unwrap_err();
        assert!(err.is(ErrorReason::Forbidden));

        fx.service.delete_home(&a, home.id).await.expect("delete");

        let kept = fx
            .store
            .shopping_lists
            .find_by_id(list.id)
            .await
            .expect("find")
            .expect("list kept");
        assert!(kept.home_id.is_none());
        assert!(fx.service.get_home(&a, home.id).await.unwrap_err().is(ErrorReason::NotFound));
    }
}
