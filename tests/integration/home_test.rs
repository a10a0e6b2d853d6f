//! Integration tests for homes, invitations and join requests.

use homelist_core::error::{ErrorKind, ErrorReason};
use homelist_entity::invitation::{InvitationAction, InvitationKind, InvitationStatus};
use homelist_service::{CreateHomeRequest, InviteRequest, RegisterRequest};

use crate::helpers::{TestApp, device};

fn invite(email: &str) -> InviteRequest {
    InviteRequest {
        email: email.to_string(),
        message: "Join us".to_string(),
    }
}

fn kitchen() -> CreateHomeRequest {
    CreateHomeRequest {
        name: "Kitchen".to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_invite_accept_and_remove_scenario() {
    let app = TestApp::new();
    let registration = || RegisterRequest {
        email: "a@x.com".to_string(),
        username: "a".to_string(),
        password: "Passw0rd".to_string(),
        name: "A".to_string(),
    };

    let a = app
        .services
        .auth
        .register(registration(), device("a"))
        .await
        .expect("register a");
    let err = app
        .services
        .auth
        .register(registration(), device("a"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::DuplicateEmail));

    let a_ctx = app.context(&a.access_token).await.expect("a ctx");
    let home = app.services.homes.create_home(&a_ctx, kitchen()).await.expect("create");
    assert_eq!(home.members, vec![a.user.id]);

    let pending = app
        .services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("b@x.com"))
        .await
        .expect("invite");
    assert_eq!(pending.status, InvitationStatus::Pending);
    assert_eq!(pending.kind, InvitationKind::Invite);

    let err = app
        .services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("B@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.is(ErrorReason::DuplicatePending));

    let b = app.register("b").await;
    let b_ctx = app.context(&b.access_token).await.expect("b ctx");
    let inbox = app
        .services
        .invitations
        .pending_for_user(&b_ctx)
        .await
        .expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].invitation.id, pending.id);
    // The recipient is not a member yet but still sees what they are joining.
    let summary = inbox[0].home.as_ref().expect("home summary");
    assert_eq!(summary.name, "Kitchen");
    assert_eq!(summary.member_count, 1);
    let sender = inbox[0].from_user.as_ref().expect("sender");
    assert_eq!(sender.id, a.user.id);
    assert_eq!(sender.email, "a@x.com");

    let outcome = app
        .services
        .invitations
        .respond_to_invitation(&b_ctx, pending.id, InvitationAction::Accept)
        .await
        .expect("accept");
    assert_eq!(outcome.invitation.status, InvitationStatus::Accepted);
    let joined = outcome.home.expect("home after accept");
    assert_eq!(joined.members, vec![a.user.id, b.user.id]);

    let err = app
        .services
        .homes
        .remove_member(&b_ctx, home.id, a.user.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let members = app
        .services
        .homes
        .list_members(&b_ctx, home.id)
        .await
        .expect("members");
    assert_eq!(members.len(), 2);
    assert!(members[0].is_creator);
    assert_eq!(members[1].id, b.user.id);
}

#[tokio::test]
async fn test_invitation_is_resolved_once() {
    let app = TestApp::new();
    let a = app.register("alice").await;
    let b = app.register("bob").await;
    let a_ctx = app.context(&a.access_token).await.expect("ctx");
    let b_ctx = app.context(&b.access_token).await.expect("ctx");

    let home = app.services.homes.create_home(&a_ctx, kitchen()).await.expect("create");
    let invitation = app
        .services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("bob@x.com"))
        .await
        .expect("invite");

    let outcome = app
        .services
        .invitations
        .respond_to_invitation(&b_ctx, invitation.id, InvitationAction::Reject)
        .await
        .expect("reject");
    assert_eq!(outcome.invitation.status, InvitationStatus::Rejected);
    assert!(outcome.home.is_none());

    for action in [InvitationAction::Reject, InvitationAction::Accept] {
        let err = app
            .services
            .invitations
            .respond_to_invitation(&b_ctx, invitation.id, action)
            .await
            .unwrap_err();
        assert!(err.is(ErrorReason::InvalidAction));
    }

    let home = app.services.homes.get_home(&a_ctx, home.id).await.expect("home");
    assert_eq!(home.members, vec![a.user.id]);

    // A fresh invite is allowed once the previous one is resolved.
    app.services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("bob@x.com"))
        .await
        .expect("re-invite");
}

#[tokio::test]
async fn test_only_recipient_can_answer_invite() {
    let app = TestApp::new();
    let a = app.register("alice").await;
    let c = app.register("carol").await;
    let a_ctx = app.context(&a.access_token).await.expect("ctx");
    let c_ctx = app.context(&c.access_token).await.expect("ctx");

    let home = app.services.homes.create_home(&a_ctx, kitchen()).await.expect("create");
    let invitation = app
        .services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("bob@x.com"))
        .await
        .expect("invite");

    let err = app
        .services
        .invitations
        .respond_to_invitation(&c_ctx, invitation.id, InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::Forbidden));
    let err = app
        .services
        .homes
        .get_home(&c_ctx, home.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::Forbidden));
}

#[tokio::test]
async fn test_join_request_flow() {
    let app = TestApp::new();
    let a = app.register("alice").await;
    let b = app.register("bob").await;
    let a_ctx = app.context(&a.access_token).await.expect("ctx");
    let b_ctx = app.context(&b.access_token).await.expect("ctx");
    let home = app.services.homes.create_home(&a_ctx, kitchen()).await.expect("create");

    let err = app
        .services
        .invitations
        .request_join(&a_ctx, home.id, "me too")
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::AlreadyMember));

    let request = app
        .services
        .invitations
        .request_join(&b_ctx, home.id, "let me in")
        .await
        .expect("request");
    assert_eq!(request.kind, InvitationKind::Request);
    let err = app
        .services
        .invitations
        .request_join(&b_ctx, home.id, "again")
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::DuplicatePending));

    let queue = app
        .services
        .invitations
        .pending_requests_for_creator(&a_ctx)
        .await
        .expect("queue");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].invitation.id, request.id);
    assert_eq!(queue[0].from_user.as_ref().map(|u| u.name.as_str()), Some("BOB"));
    assert_eq!(
        queue[0].home.as_ref().map(|h| h.id),
        Some(home.id)
    );
    let sent = app.services.invitations.sent_by_user(&b_ctx).await.expect("sent");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].home.as_ref().map(|h| h.name.as_str()), Some("Kitchen"));

    // The requester cannot approve their own request.
    let err = app
        .services
        .invitations
        .respond_to_invitation(&b_ctx, request.id, InvitationAction::Accept)
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::Forbidden));

    let outcome = app
        .services
        .invitations
        .respond_to_invitation(&a_ctx, request.id, InvitationAction::Accept)
        .await
        .expect("approve");
    assert_eq!(
        outcome.home.expect("home").members,
        vec![a.user.id, b.user.id]
    );

    let homes = app.services.homes.list_homes(&b_ctx).await.expect("homes");
    assert_eq!(homes.len(), 1);
}

#[tokio::test]
async fn test_leave_remove_and_delete() {
    let app = TestApp::new();
    let a = app.register("alice").await;
    let b = app.register("bob").await;
    let c = app.register("carol").await;
    let a_ctx = app.context(&a.access_token).await.expect("ctx");
    let b_ctx = app.context(&b.access_token).await.expect("ctx");
    let c_ctx = app.context(&c.access_token).await.expect("ctx");
    let home = app.services.homes.create_home(&a_ctx, kitchen()).await.expect("create");

    for (ctx, email) in [(&b_ctx, "bob@x.com"), (&c_ctx, "carol@x.com")] {
        let invitation = app
            .services
            .invitations
            .invite_to_home(&a_ctx, home.id, invite(email))
            .await
            .expect("invite");
        app.services
            .invitations
            .respond_to_invitation(ctx, invitation.id, InvitationAction::Accept)
            .await
            .expect("accept");
    }

    let err = app
        .services
        .invitations
        .invite_to_home(&a_ctx, home.id, invite("bob@x.com"))
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::AlreadyMember));

    let err = app.services.homes.leave_home(&a_ctx, home.id).await.unwrap_err();
    assert!(err.is(ErrorReason::InvalidAction));
    let err = app
        .services
        .homes
        .remove_member(&a_ctx, home.id, a.user.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::InvalidAction));

    app.services.homes.leave_home(&b_ctx, home.id).await.expect("leave");
    let err = app.services.homes.leave_home(&b_ctx, home.id).await.unwrap_err();
    assert!(err.is(ErrorReason::NotAMember));

    let home = app
        .services
        .homes
        .remove_member(&a_ctx, home.id, c.user.id)
        .await
        .expect("remove");
    assert_eq!(home.members, vec![a.user.id]);
    let err = app
        .services
        .homes
        .remove_member(&a_ctx, home.id, c.user.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::NotAMember));

    let err = app.services.homes.delete_home(&b_ctx, home.id).await.unwrap_err();
    assert!(err.is(ErrorReason::Forbidden));
    app.services.homes.delete_home(&a_ctx, home.id).await.expect("delete");
    let err = app.services.homes.get_home(&a_ctx, home.id).await.unwrap_err();
    assert!(err.is(ErrorReason::NotFound));
}
