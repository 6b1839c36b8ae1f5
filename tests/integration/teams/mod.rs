//! Team management endpoint integration tests
//!
//! - POST /teams, GET /teams
//! - GET /teams/autogenerate-code, POST /teams/validate-code
//! - GET /teams/{id}, DELETE /teams/{id}
//! - GET /teams/{id}/members

use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;
use teamtact_auth::{issue_access_token, AuthConfig};
use uuid::Uuid;

use crate::common::{assertions::assert_error, TestApp, UserFixture};

fn access_cookie(app: &TestApp) -> String {
    let config = AuthConfig::try_from(&app.config).unwrap();
    format!(
        "access_token={}",
        issue_access_token(Uuid::new_v4(), &config).unwrap()
    )
}

async fn owner(app: &TestApp) -> UserFixture {
    app.verified_user("Olivia Owner", "olivia@example.com", "olivia")
        .await
}

mod test_create_team {
    use super::*;

    #[tokio::test]
    async fn test_create_team_requires_session() {
        let app = TestApp::lazy();

        let response = app.post("/teams", json!({ "name": "Acme" }), None).await;

        assert_error(&response, StatusCode::UNAUTHORIZED, "MISSING_ACCESS_TOKEN");
    }

    #[tokio::test]
    async fn test_create_team_rejects_bad_code() {
        let app = TestApp::lazy();

        let response = app
            .post(
                "/teams",
                json!({ "name": "Acme", "code": "abc" }),
                Some(&access_cookie(&app)),
            )
            .await;

        assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_validate_code_rejects_lowercase() {
        let app = TestApp::lazy();

        let response = app
            .post(
                "/teams/validate-code",
                json!({ "code": "ab12cd" }),
                Some(&access_cookie(&app)),
            )
            .await;

        assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_create_team_enrolls_owner() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;

        let response = app
            .post(
                "/teams",
                json!({ "name": "Acme", "code": "ACME01" }),
                Some(&owner.cookies),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        assert_eq!(response.message(), "Team created");
        assert_eq!(response.data()["code"], "ACME01");
        assert_eq!(response.data()["owner_id"], owner.id.to_string());

        let teams = app.get("/teams", Some(&owner.cookies)).await;
        assert_eq!(teams.status, StatusCode::OK);
        let list = teams.data().as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "Acme");
        assert_eq!(list[0]["role"], "OWNER");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_duplicate_name_and_code_conflict() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;
        app.post(
            "/teams",
            json!({ "name": "Acme", "code": "ACME01" }),
            Some(&owner.cookies),
        )
        .await;

        let same_name = app
            .post("/teams", json!({ "name": "ACME" }), Some(&owner.cookies))
            .await;
        assert_error(&same_name, StatusCode::BAD_REQUEST, "CONFLICT");
        assert_eq!(same_name.message(), "Team name already exists");

        let same_code = app
            .post(
                "/teams",
                json!({ "name": "Other", "code": "ACME01" }),
                Some(&owner.cookies),
            )
            .await;
        assert_error(&same_code, StatusCode::BAD_REQUEST, "CONFLICT");
        assert_eq!(same_code.message(), "Team code already exists");

        let availability = app
            .post(
                "/teams/validate-code",
                json!({ "code": "ACME01" }),
                Some(&owner.cookies),
            )
            .await;
        assert_eq!(availability.status, StatusCode::OK);
        assert_eq!(availability.data()["available"], false);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_autogenerated_code_is_well_formed() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;

        let response = app
            .get("/teams/autogenerate-code", Some(&owner.cookies))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        let code = response.data()["code"].as_str().unwrap();
        assert_eq!(code.len(), 6);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        app.cleanup().await.unwrap();
    }
}

mod test_team_access {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_non_member_cannot_read_team() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;
        let outsider = app
            .verified_user("Oscar", "oscar@example.com", "oscar")
            .await;
        let team_id = app.create_team(&owner, "Acme").await;

        let detail = app
            .get(&format!("/teams/{}", team_id), Some(&outsider.cookies))
            .await;
        assert_error(&detail, StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR");

        let members = app
            .get(&format!("/teams/{}/members", team_id), Some(&outsider.cookies))
            .await;
        assert_error(&members, StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR");

        let missing = app
            .get(&format!("/teams/{}", Uuid::new_v4()), Some(&owner.cookies))
            .await;
        assert_error(&missing, StatusCode::NOT_FOUND, "NOT_FOUND");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_team_detail_and_members_listing() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;
        let team_id = app.create_team(&owner, "Acme").await;

        let detail = app
            .get(&format!("/teams/{}", team_id), Some(&owner.cookies))
            .await;
        assert_eq!(detail.status, StatusCode::OK);
        assert_eq!(detail.data()["members_count"], 1);
        assert_eq!(detail.data()["role"], "OWNER");

        let members = app
            .get(
                &format!("/teams/{}/members?search=OLIV&page=1&per_page=5", team_id),
                Some(&owner.cookies),
            )
            .await;
        assert_eq!(members.status, StatusCode::OK, "{}", members.body);
        assert_eq!(
            members.data()["filters"]["roles"],
            json!(["OWNER", "ADMIN", "VIEWER"])
        );
        let pagination = &members.data()["pagination"];
        assert_eq!(pagination["total_rows"], 1);
        assert_eq!(pagination["current_page"], 1);
        assert_eq!(pagination["page_size"], 5);
        assert_eq!(pagination["items"][0]["username"], "olivia");

        let filtered = app
            .get(
                &format!("/teams/{}/members?role=viewer", team_id),
                Some(&owner.cookies),
            )
            .await;
        assert_eq!(filtered.data()["pagination"]["total_rows"], 0);

        let bad_role = app
            .get(
                &format!("/teams/{}/members?role=superuser", team_id),
                Some(&owner.cookies),
            )
            .await;
        assert_error(&bad_role, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_listing_past_the_last_page_is_empty() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;
        let team_id = app.create_team(&owner, "Acme").await;

        for uri in [
            format!("/teams/{}/members?page=9223372036854775807", team_id),
            format!("/team-invitations/{}?page=9223372036854775807&per_page=100", team_id),
        ] {
            let response = app.get(&uri, Some(&owner.cookies)).await;
            assert_eq!(response.status, StatusCode::OK, "{}: {}", uri, response.body);
            let pagination = &response.data()["pagination"];
            assert_eq!(pagination["current_page"], i64::MAX);
            assert!(pagination["items"].as_array().unwrap().is_empty());
        }

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL"]
    #[serial]
    async fn test_only_owner_deletes_team() {
        let app = TestApp::with_database().await.unwrap();
        let owner = owner(&app).await;
        let team_id = app.create_team(&owner, "Acme").await;

        let deleted = app
            .delete(&format!("/teams/{}", team_id), Some(&owner.cookies))
            .await;
        assert_eq!(deleted.status, StatusCode::OK, "{}", deleted.body);

        let teams = app.get("/teams", Some(&owner.cookies)).await;
        assert_eq!(teams.data().as_array().unwrap().len(), 0);

        app.cleanup().await.unwrap();
    }
}
