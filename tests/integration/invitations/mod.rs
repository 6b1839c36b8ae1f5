//! Team invitation endpoint integration tests
//!
//! - POST /team-invitations/{team_id} (and POST /teams/{id}/invite)
//! - GET /team-invitations/{team_id}
//! - POST /team-invitations/accept/{token}
//! - POST /team-invitations/{id}/cancel
//! - DELETE /team-invitations/{id}

use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

use crate::common::{assertions::assert_error, TestApp, UserFixture};

struct TeamFixture {
    owner: UserFixture,
    team_id: Uuid,
}

async fn team(app: &TestApp) -> TeamFixture {
    let owner = app
        .verified_user("Olivia Owner", "olivia@example.com", "olivia")
        .await;
    let team_id = app.create_team(&owner, "Acme").await;
    TeamFixture { owner, team_id }
}

async fn invite(app: &TestApp, fixture: &TeamFixture, invitations: Value) -> crate::common::TestResponse {
    app.post(
        &format!("/team-invitations/{}", fixture.team_id),
        json!({ "invitations": invitations }),
        Some(&fixture.owner.cookies),
    )
    .await
}

async fn invitation_id(app: &TestApp, fixture: &TeamFixture, email: &str) -> Uuid {
    let listing = app
        .get(
            &format!("/team-invitations/{}?search={}", fixture.team_id, email),
            Some(&fixture.owner.cookies),
        )
        .await;
    listing.data()["pagination"]["items"][0]["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("invitation is listed")
}

mod test_batch_invite {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_all_sent() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;

        let response = invite(
            &app,
            &fixture,
            json!([
                { "email": "Ann@Example.com", "role": "ADMIN" },
                { "email": "ben@example.com", "role": "VIEWER" },
            ]),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        assert_eq!(response.body["success"], true);
        assert_eq!(response.message(), "Invitations sent!");
        assert_eq!(
            response.data()["sent_invitations"],
            json!(["ann@example.com", "ben@example.com"])
        );
        assert_eq!(response.data()["unsent_invitations"], json!([]));

        app.wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;
        app.wait_for_token(|mail| mail.get_invitation_token_for_email("ben@example.com"))
            .await;

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_partial_batch_reports_reasons() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;

        let response = invite(
            &app,
            &fixture,
            json!([
                { "email": "ann@example.com", "role": "VIEWER" },
                { "email": "ANN@example.com", "role": "ADMIN" },
                { "email": "boss@example.com", "role": "OWNER" },
                { "email": "olivia@example.com", "role": "VIEWER" },
            ]),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.message(), "Some invitations couldn't be processed!");
        assert_eq!(response.data()["sent_invitations"], json!(["ann@example.com"]));

        let codes: Vec<&str> = response.data()["unsent_invitations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["already_invited", "owner_role", "already_member"]);

        let again = invite(
            &app,
            &fixture,
            json!([{ "email": "ann@example.com", "role": "VIEWER" }]),
        )
        .await;
        assert_eq!(again.status, StatusCode::BAD_REQUEST);
        assert_eq!(again.message(), "Invitations couldn't be processed!");
        assert_eq!(
            again.data()["unsent_invitations"][0]["reason"],
            "Member already invited"
        );

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_invite_alias_route() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;

        let response = app
            .post(
                &format!("/teams/{}/invite", fixture.team_id),
                json!({ "invitations": [{ "email": "cat@example.com", "role": "VIEWER" }] }),
                Some(&fixture.owner.cookies),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_empty_batch_is_rejected() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;

        let response = invite(&app, &fixture, json!([])).await;

        assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_viewer_cannot_invite() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let viewer = app
            .verified_user("Vic Viewer", "vic@example.com", "vic")
            .await;

        invite(&app, &fixture, json!([{ "email": "vic@example.com", "role": "VIEWER" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("vic@example.com"))
            .await;
        let accepted = app
            .post(
                &format!("/team-invitations/accept/{}", token),
                json!({}),
                Some(&viewer.cookies),
            )
            .await;
        assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);

        let response = app
            .post(
                &format!("/team-invitations/{}", fixture.team_id),
                json!({ "invitations": [{ "email": "x@example.com", "role": "VIEWER" }] }),
                Some(&viewer.cookies),
            )
            .await;
        assert_error(&response, StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR");

        // Viewers may still list
        let listing = app
            .get(
                &format!("/team-invitations/{}", fixture.team_id),
                Some(&viewer.cookies),
            )
            .await;
        assert_eq!(listing.status, StatusCode::OK);

        app.cleanup().await.unwrap();
    }
}

mod test_invitation_listing {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_listing_shows_state_and_invitor() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        invite(
            &app,
            &fixture,
            json!([
                { "email": "ann@example.com", "role": "ADMIN" },
                { "email": "ben@example.com", "role": "VIEWER" },
            ]),
        )
        .await;

        let listing = app
            .get(
                &format!("/team-invitations/{}?role=ADMIN", fixture.team_id),
                Some(&fixture.owner.cookies),
            )
            .await;

        assert_eq!(listing.status, StatusCode::OK, "{}", listing.body);
        assert_eq!(
            listing.data()["filters"]["roles"],
            json!(["ADMIN", "VIEWER"])
        );
        let pagination = &listing.data()["pagination"];
        assert_eq!(pagination["total_rows"], 1);
        let item = &pagination["items"][0];
        assert_eq!(item["email"], "ann@example.com");
        assert_eq!(item["state"], "pending");
        assert_eq!(item["invitor"]["username"], "olivia");
        assert!(item.get("token").is_none());

        app.cleanup().await.unwrap();
    }
}

mod test_accept_guards {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_wrong_user_cannot_accept() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let intruder = app
            .verified_user("Ivan", "ivan@example.com", "ivan")
            .await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "VIEWER" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;

        let response = app
            .post(
                &format!("/team-invitations/accept/{}", token),
                json!({}),
                Some(&intruder.cookies),
            )
            .await;
        assert_error(&response, StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR");
        assert_eq!(response.message(), "The invitation was not intended for you");

        let unknown = app
            .post(
                "/team-invitations/accept/not-a-token",
                json!({}),
                Some(&intruder.cookies),
            )
            .await;
        assert_error(&unknown, StatusCode::NOT_FOUND, "NOT_FOUND");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_cancelled_invitation_cannot_be_accepted() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let ann = app.verified_user("Ann", "ann@example.com", "ann").await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "VIEWER" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;
        let id = invitation_id(&app, &fixture, "ann@example.com").await;

        let cancelled = app
            .post(
                &format!("/team-invitations/{}/cancel", id),
                json!({}),
                Some(&fixture.owner.cookies),
            )
            .await;
        assert_eq!(cancelled.status, StatusCode::OK, "{}", cancelled.body);
        assert_eq!(cancelled.data()["state"], "cancelled");

        let twice = app
            .post(
                &format!("/team-invitations/{}/cancel", id),
                json!({}),
                Some(&fixture.owner.cookies),
            )
            .await;
        assert_error(&twice, StatusCode::BAD_REQUEST, "ALREADY_PROCESSED");

        let response = app
            .post(
                &format!("/team-invitations/accept/{}", token),
                json!({}),
                Some(&ann.cookies),
            )
            .await;
        assert_error(&response, StatusCode::BAD_REQUEST, "ALREADY_PROCESSED");
        assert_eq!(response.message(), "Invitation has been cancelled");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_expired_invitation_cannot_be_accepted() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let ann = app.verified_user("Ann", "ann@example.com", "ann").await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "VIEWER" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;

        sqlx::query("UPDATE invitations SET expiration_date = NOW() - INTERVAL '1 minute'")
            .execute(&app.pool)
            .await
            .unwrap();

        let response = app
            .post(
                &format!("/team-invitations/accept/{}", token),
                json!({}),
                Some(&ann.cookies),
            )
            .await;
        assert_error(&response, StatusCode::BAD_REQUEST, "EXPIRED");
        assert_eq!(response.message(), "Invitation Expired");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_accepting_twice_is_already_processed() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let ann = app.verified_user("Ann", "ann@example.com", "ann").await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "ADMIN" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;
        let uri = format!("/team-invitations/accept/{}", token);

        let first = app.post(&uri, json!({}), Some(&ann.cookies)).await;
        assert_eq!(first.status, StatusCode::OK, "{}", first.body);
        assert_eq!(first.message(), "Invitation accepted successfully");
        assert_eq!(first.data()["role"], "ADMIN");
        assert_eq!(first.data()["user_id"], ann.id.to_string());

        let second = app.post(&uri, json!({}), Some(&ann.cookies)).await;
        assert_error(&second, StatusCode::BAD_REQUEST, "ALREADY_PROCESSED");
        assert_eq!(second.message(), "Invitation already accepted");

        app.cleanup().await.unwrap();
    }

    async fn member_rows(app: &TestApp, team_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM team_mates WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(&app.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_concurrent_accepts_admit_one_member() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let ann = app.verified_user("Ann", "ann@example.com", "ann").await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "VIEWER" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;
        let uri = format!("/team-invitations/accept/{}", token);

        let (a, b) = tokio::join!(
            app.post(&uri, json!({}), Some(&ann.cookies)),
            app.post(&uri, json!({}), Some(&ann.cookies)),
        );

        let (won, lost) = if a.status == StatusCode::OK { (a, b) } else { (b, a) };
        assert_eq!(won.status, StatusCode::OK, "{}", won.body);
        assert_error(&lost, StatusCode::BAD_REQUEST, "ALREADY_PROCESSED");
        assert_eq!(member_rows(&app, fixture.team_id).await, 2);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_existing_member_accept_rolls_back() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        let ann = app.verified_user("Ann", "ann@example.com", "ann").await;

        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "ADMIN" }])).await;
        let token = app
            .wait_for_token(|mail| mail.get_invitation_token_for_email("ann@example.com"))
            .await;

        // Joined by some other route while the invitation was outstanding
        sqlx::query(
            "INSERT INTO team_mates (id, team_id, user_id, role) \
             VALUES ($1, $2, $3, 'VIEWER')",
        )
        .bind(Uuid::new_v4())
        .bind(fixture.team_id)
        .bind(ann.id)
        .execute(&app.pool)
        .await
        .unwrap();

        let accepted = app
            .post(
                &format!("/team-invitations/accept/{}", token),
                json!({}),
                Some(&ann.cookies),
            )
            .await;
        assert_error(&accepted, StatusCode::BAD_REQUEST, "CONFLICT");
        assert_eq!(accepted.message(), "You are already a member of this team");
        assert_eq!(member_rows(&app, fixture.team_id).await, 2);

        let listing = app
            .get(
                &format!("/team-invitations/{}", fixture.team_id),
                Some(&fixture.owner.cookies),
            )
            .await;
        assert_eq!(listing.data()["pagination"]["items"][0]["state"], "pending");

        app.cleanup().await.unwrap();
    }
}

mod test_delete_invitation {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_admin_deletes_invitation() {
        let app = TestApp::with_database().await.unwrap();
        let fixture = team(&app).await;
        invite(&app, &fixture, json!([{ "email": "ann@example.com", "role": "VIEWER" }])).await;
        let id = invitation_id(&app, &fixture, "ann@example.com").await;

        let outsider = app
            .verified_user("Oscar", "oscar@example.com", "oscar")
            .await;
        let forbidden = app
            .delete(&format!("/team-invitations/{}", id), Some(&outsider.cookies))
            .await;
        assert_error(&forbidden, StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR");

        let deleted = app
            .delete(&format!("/team-invitations/{}", id), Some(&fixture.owner.cookies))
            .await;
        assert_eq!(deleted.status, StatusCode::OK, "{}", deleted.body);
        assert_eq!(deleted.message(), "Invitation deleted successfully!");

        let gone = app
            .delete(&format!("/team-invitations/{}", id), Some(&fixture.owner.cookies))
            .await;
        assert_error(&gone, StatusCode::NOT_FOUND, "NOT_FOUND");

        app.cleanup().await.unwrap();
    }
}
