mod common;

use axum::http::StatusCode;
use common::TestApp;
use taxi_backend::database::queries;

#[tokio::test]
async fn test_login_required_car_list() {
    let app = TestApp::new().await;
    let response = app.get("/cars/").await;
    assert_ne!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_car_list_search_by_model() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", None).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    app.create_car("Doblo", fiat).await;
    app.create_car("Punto", fiat).await;
    app.force_login(&user).await;

    let response = app.get("/cars/?model=DOB").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.template(), "taxi/car_list.html");
    assert_eq!(response.list_field("car_list", "model"), vec!["Doblo"]);
    assert_eq!(response.context()["search_form"]["initial"]["model"], "DOB");
    assert_eq!(response.context()["car_list"][0]["manufacturer"]["name"], "Fiat");
}

#[tokio::test]
async fn test_create_car_with_drivers() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", Some("TES34591")).await;
    let other = app.create_user("other", Some("OTH34591")).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    app.force_login(&user).await;

    let form = app.get("/cars/create/").await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(form.template(), "taxi/car_form.html");
    assert_eq!(form.context()["choices"]["manufacturers"][0]["name"], "Fiat");

    let fiat_id = fiat.to_string();
    let user_id = user.id.to_string();
    let other_id = other.id.to_string();
    let response = app
        .post(
            "/cars/create/",
            &[
                ("model", "Doblo"),
                ("manufacturer", fiat_id.as_str()),
                ("drivers", user_id.as_str()),
                ("drivers", other_id.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);

    let (car_id,): (i64,) = sqlx::query_as("SELECT id FROM cars WHERE model = 'Doblo'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let drivers: Vec<i64> = queries::drivers_of_car(&app.pool, car_id)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(drivers, vec![user.id, other.id]);
}

#[tokio::test]
async fn test_create_car_requires_existing_manufacturer() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", None).await;
    app.force_login(&user).await;

    let response = app
        .post("/cars/create/", &[("model", "Doblo"), ("manufacturer", "42")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.context()["errors"]["manufacturer"].is_array());
    assert_eq!(app.count("SELECT COUNT(*) FROM cars WHERE model = ?", "Doblo").await, 0);

    let missing = app.post("/cars/create/", &[("model", "Doblo")]).await;
    assert_eq!(missing.status, StatusCode::OK);
    assert!(missing.context()["errors"]["manufacturer"].is_array());
}

#[tokio::test]
async fn test_update_car_replaces_drivers() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", Some("TES34591")).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    let ford = app.create_manufacturer("Ford", "USA").await;
    let car = app.create_car("Doblo", fiat).await;
    queries::assign(&app.pool, user.id, car).await.unwrap();
    app.force_login(&user).await;

    let prefilled = app.get(&format!("/cars/{car}/update/")).await;
    assert_eq!(prefilled.status, StatusCode::OK);
    assert_eq!(prefilled.context()["form"]["drivers"][0], user.id.to_string());

    let ford_id = ford.to_string();
    let response = app
        .post(
            &format!("/cars/{car}/update/"),
            &[("model", "Transit"), ("manufacturer", ford_id.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);

    let updated = queries::find_car(&app.pool, car).await.unwrap().unwrap();
    assert_eq!(updated.car.model, "Transit");
    assert_eq!(updated.manufacturer.name, "Ford");
    assert!(queries::drivers_of_car(&app.pool, car).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_car_detail_reports_assignment() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", Some("TES34591")).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    let car = app.create_car("Doblo", fiat).await;
    app.force_login(&user).await;

    let before = app.get(&format!("/cars/{car}/")).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.template(), "taxi/car_detail.html");
    assert_eq!(before.context()["is_assigned"], false);

    app.post(&format!("/cars/{car}/toggle-assign/"), &[]).await;

    let after = app.get(&format!("/cars/{car}/")).await;
    assert_eq!(after.context()["is_assigned"], true);
    assert_eq!(after.context()["drivers"][0]["username"], "test user");
}

#[tokio::test]
async fn test_delete_car() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", Some("TES34591")).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    let car = app.create_car("Doblo", fiat).await;
    queries::assign(&app.pool, user.id, car).await.unwrap();
    app.force_login(&user).await;

    let confirm = app.get(&format!("/cars/{car}/delete/")).await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert_eq!(confirm.template(), "taxi/car_confirm_delete.html");

    let response = app.post(&format!("/cars/{car}/delete/"), &[]).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert!(queries::find_car(&app.pool, car).await.unwrap().is_none());
    assert!(queries::cars_of_driver(&app.pool, user.id).await.unwrap().is_empty());

    let detail = app.get(&format!("/cars/{car}/")).await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_car_reports_malformed_driver_values() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", Some("TES34591")).await;
    let fiat = app.create_manufacturer("Fiat", "Italy").await;
    app.force_login(&user).await;

    let fiat_id = fiat.to_string();
    for bad in ["abc", ""] {
        let response = app
            .post(
                "/cars/create/",
                &[
                    ("model", "Doblo"),
                    ("manufacturer", fiat_id.as_str()),
                    ("drivers", bad),
                ],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "drivers = {bad:?}");
        assert_eq!(response.template(), "taxi/car_form.html");
        assert!(response.context()["errors"]["drivers"].is_array());
    }
    assert_eq!(app.count("SELECT COUNT(*) FROM cars WHERE model = ?", "Doblo").await, 0);
}

#[tokio::test]
async fn test_non_numeric_car_id_is_not_found() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", None).await;
    app.force_login(&user).await;

    assert_eq!(app.get("/cars/abc/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/cars/abc/update/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/cars/abc/delete/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/cars/?page=abc").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_car_search_folds_non_ascii_case() {
    let mut app = TestApp::new().await;
    let user = app.create_user("test user", None).await;
    let skoda = app.create_manufacturer("Škoda", "Czechia").await;
    app.create_car("Octavia Ž", skoda).await;
    app.force_login(&user).await;

    let response = app.get("/cars/?model=%C5%BE").await;
    assert_eq!(response.list_field("car_list", "model"), vec!["Octavia Ž"]);
}
