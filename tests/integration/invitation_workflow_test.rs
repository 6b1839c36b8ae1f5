//! Invitation Workflow Integration Tests
//!
//! End-to-end: an owner creates a team, invites by email, the invitee signs
//! up, verifies, accepts from the emailed link and shows up as a member.
//! Also covers the expired-invitation sweep and stale invitation
//! replacement. Requires `TEST_DATABASE_URL`.

#![allow(dead_code)]

mod common;

use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;
use teamtact_app::sweeper::sweep_once;

use crate::common::TestApp;

#[test_log::test(tokio::test)]
#[ignore = "requires TEST_DATABASE_URL"]
#[serial]
async fn test_invitation_workflow_e2e() {
    let app = TestApp::with_database().await.unwrap();

    // Owner and team
    let owner = app
        .verified_user("Sarah Johnson", "sarah@company.com", "sarah")
        .await;
    let team_id = app.create_team(&owner, "Awesome Development Team").await;

    // Invite someone who has no account yet
    let invited = app
        .post(
            &format!("/team-invitations/{}", team_id),
            json!({ "invitations": [{ "email": "newdev@company.com", "role": "ADMIN" }] }),
            Some(&owner.cookies),
        )
        .await;
    assert_eq!(invited.status, StatusCode::OK, "{}", invited.body);

    let token = app
        .wait_for_token(|mail| mail.get_invitation_token_for_email("newdev@company.com"))
        .await;

    let email = app
        .email
        .get_latest_email_of_type("newdev@company.com", "team_invitation")
        .unwrap();
    assert_eq!(
        email.message.subject,
        "[TeamTact] You've been invited to join a team!"
    );
    assert!(email.message.body_text.contains("Awesome Development Team"));
    assert!(email.message.body_text.contains("Sarah Johnson"));
    assert!(email
        .message
        .body_text
        .contains(&format!("accept-invite?token={}", token)));

    // Invitee joins and accepts
    let newdev = app
        .verified_user("New Dev", "newdev@company.com", "newdev")
        .await;
    let accepted = app
        .post(
            &format!("/team-invitations/accept/{}", token),
            json!({}),
            Some(&newdev.cookies),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);
    assert_eq!(accepted.data()["team_id"], team_id.to_string());

    // Team reflects the new member
    let members = app
        .get(&format!("/teams/{}/members", team_id), Some(&newdev.cookies))
        .await;
    assert_eq!(members.status, StatusCode::OK);
    let items = members.data()["pagination"]["items"].as_array().unwrap();
    let roles: Vec<&str> = items.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["OWNER", "ADMIN"]);

    let listing = app
        .get(&format!("/team-invitations/{}", team_id), Some(&owner.cookies))
        .await;
    assert_eq!(
        listing.data()["pagination"]["items"][0]["state"],
        "accepted"
    );

    // A member cannot be invited again
    let again = app
        .post(
            &format!("/team-invitations/{}", team_id),
            json!({ "invitations": [{ "email": "newdev@company.com", "role": "VIEWER" }] }),
            Some(&owner.cookies),
        )
        .await;
    assert_eq!(
        again.data()["unsent_invitations"][0]["code"],
        "already_member"
    );

    app.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
#[serial]
async fn test_stale_invitation_is_replaced() {
    let app = TestApp::with_database().await.unwrap();
    let owner = app
        .verified_user("Sarah Johnson", "sarah@company.com", "sarah")
        .await;
    let team_id = app.create_team(&owner, "Acme").await;
    let uri = format!("/team-invitations/{}", team_id);
    let body = json!({ "invitations": [{ "email": "late@company.com", "role": "VIEWER" }] });

    let first = app.post(&uri, body.clone(), Some(&owner.cookies)).await;
    assert_eq!(first.status, StatusCode::OK);
    let old_token = app
        .wait_for_token(|mail| mail.get_invitation_token_for_email("late@company.com"))
        .await;

    sqlx::query("UPDATE invitations SET expiration_date = NOW() - INTERVAL '1 minute'")
        .execute(&app.pool)
        .await
        .unwrap();
    app.email.clear();

    // Past due but never swept: re-inviting retires it
    let second = app.post(&uri, body, Some(&owner.cookies)).await;
    assert_eq!(second.status, StatusCode::OK, "{}", second.body);
    let new_token = app
        .wait_for_token(|mail| mail.get_invitation_token_for_email("late@company.com"))
        .await;
    assert_ne!(old_token, new_token);

    let listing = app.get(&uri, Some(&owner.cookies)).await;
    let states: Vec<&str> = listing.data()["pagination"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["pending", "cancelled"]);

    app.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
#[serial]
async fn test_sweeper_cancels_expired_invitations() {
    let app = TestApp::with_database().await.unwrap();
    let owner = app
        .verified_user("Sarah Johnson", "sarah@company.com", "sarah")
        .await;
    let team_id = app.create_team(&owner, "Acme").await;

    app.post(
        &format!("/team-invitations/{}", team_id),
        json!({ "invitations": [
            { "email": "one@company.com", "role": "VIEWER" },
            { "email": "two@company.com", "role": "VIEWER" },
        ] }),
        Some(&owner.cookies),
    )
    .await;

    sqlx::query(
        "UPDATE invitations SET expiration_date = NOW() - INTERVAL '1 minute' \
         WHERE email = 'one@company.com'",
    )
    .execute(&app.pool)
    .await
    .unwrap();

    let swept = sweep_once(&app.state.repos.invitations).await;
    assert_eq!(swept, Some(1));

    // Nothing left to sweep
    let again = sweep_once(&app.state.repos.invitations).await;
    tokio_test::assert_ok!(again.ok_or(()));
    assert_eq!(again, Some(0));

    app.cleanup().await.unwrap();
}
