use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{contact_body, spawn_app, OWNER_EMAIL};

#[tokio::test]
async fn contact_returns_200_for_a_complete_submission() {
    let app = spawn_app().await;
    app.mount_email_relay(2).await;

    let response = app.post_contact(&contact_body()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": true, "message": "Added to contact list"})
    );
}

#[tokio::test]
async fn contact_persists_exactly_one_inquiry() {
    let app = spawn_app().await;
    app.mount_email_relay(2).await;

    app.post_contact(&contact_body()).await;

    let saved = app.store.contact_inquiries();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "Ursula Le Guin");
    assert_eq!(saved[0].email, "ursula_le_guin@gmail.com");
    assert_eq!(saved[0].mobile, "+1 555 0100");
    assert_eq!(saved[0].service, "Recruitment");
    assert_eq!(saved[0].message, "Please call me back.");
    assert!(app.store.career_applications().is_empty());
}

#[tokio::test]
async fn contact_emails_the_submitter_then_the_owner() {
    let app = spawn_app().await;
    app.mount_email_relay(2).await;

    app.post_contact(&contact_body()).await;

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0]["To"], "ursula_le_guin@gmail.com");
    assert_eq!(emails[0]["Subject"], "Welcome to HR web");
    assert_eq!(emails[1]["To"], OWNER_EMAIL);
    assert_eq!(emails[1]["Subject"], "New Contact Form Submission");

    let owner_html = emails[1]["HtmlBody"].as_str().unwrap();
    for value in [
        "Ursula Le Guin",
        "ursula_le_guin@gmail.com",
        "+1 555 0100",
        "Recruitment",
        "Please call me back.",
    ] {
        assert!(owner_html.contains(value), "owner email is missing {}", value);
    }
}

#[tokio::test]
async fn contact_returns_500_and_sends_nothing_when_a_field_is_missing() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for field in ["name", "email", "mobile", "service", "message"] {
        let mut body = contact_body();
        body.as_object_mut().unwrap().remove(field);

        let response = app.post_contact(&body).await;

        assert_eq!(
            response.status().as_u16(),
            500,
            "The API did not fail with 500 when `{}` was missing.",
            field
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Failed to add to contact list"})
        );
    }
    assert!(app.store.contact_inquiries().is_empty());
}

#[tokio::test]
async fn contact_treats_an_empty_field_as_missing() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let mut body = contact_body();
    body["name"] = serde_json::json!("");

    let response = app.post_contact(&body).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": false, "error": "Failed to add to contact list"})
    );
    assert!(app.store.contact_inquiries().is_empty());
}

#[tokio::test]
async fn contact_reports_failure_but_keeps_the_record_when_the_relay_fails() {
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&contact_body()).await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(app.store.contact_inquiries().len(), 1);
}

#[tokio::test]
async fn contact_rejects_a_body_that_is_not_json() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/contact", &app.address))
        .header("Content-Type", "application/json")
        .body("name=Ursula")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.store.contact_inquiries().is_empty());
}

#[tokio::test]
async fn a_form_encoded_body_fails_like_an_empty_submission() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app
        .api_client
        .post(&format!("{}/contact", &app.address))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("name=Ursula&email=ursula_le_guin%40gmail.com")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": false, "error": "Failed to add to contact list"})
    );
    assert!(app.store.contact_inquiries().is_empty());
}

#[tokio::test]
async fn a_json_content_type_with_a_charset_is_parsed() {
    let app = spawn_app().await;
    app.mount_email_relay(2).await;

    let response = app
        .api_client
        .post(&format!("{}/contact", &app.address))
        .header("Content-Type", "application/json; charset=utf-8")
        .body(contact_body().to_string())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.store.contact_inquiries().len(), 1);
}

#[tokio::test]
async fn a_forty_kibibyte_message_is_accepted() {
    let app = spawn_app().await;
    app.mount_email_relay(2).await;

    let mut body = contact_body();
    body["message"] = serde_json::json!("a".repeat(40 * 1024));

    let response = app.post_contact(&body).await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.store.contact_inquiries()[0].message.len(), 40 * 1024);
}

#[tokio::test]
async fn a_body_over_one_hundred_kibibytes_is_refused() {
    let app = spawn_app().await;

    let mut body = contact_body();
    body["message"] = serde_json::json!("a".repeat(100 * 1024));

    let response = app.post_contact(&body).await;

    assert_eq!(response.status().as_u16(), 413);
    assert!(app.store.contact_inquiries().is_empty());
}
