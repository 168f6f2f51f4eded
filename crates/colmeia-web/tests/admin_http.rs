//! Drives the admin router end to end against an in-memory database.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use colmeia_config::ColmeiaConfig;
use colmeia_core::entities::{Hive, Species, User};
use colmeia_core::enums::{AcquisitionMethod, MenuItemType, MenuScope, ReviewType};
use colmeia_core::quantity::Quantity;
use colmeia_db::service::ColmeiaService;
use colmeia_db::updates::hive::HiveDraft;
use colmeia_db::updates::menu::{MenuConfigDraft, MenuItemDraft};
use colmeia_db::updates::revision::RevisionDraft;
use colmeia_db::updates::species::SpeciesDraft;
use colmeia_web::identity::USER_HEADER;
use colmeia_web::{AppState, build_router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct Fixture {
    router: Router,
    service: std::sync::Arc<ColmeiaService>,
    ana: User,
    bia: User,
    root: User,
    ana_hive: Hive,
    bia_hive: Hive,
    media: TempDir,
}

async fn make_hive(service: &ColmeiaService, owner: &User, species: &Species, name: &str) -> Hive {
    service
        .create_hive(
            &owner.id,
            HiveDraft {
                acquisition_method: Some(AcquisitionMethod::Donation),
                species_id: species.id.clone(),
                popular_name: name.to_string(),
                ..HiveDraft::default()
            },
        )
        .await
        .unwrap()
}

async fn harvest(service: &ColmeiaService, hive: &Hive, month: u32, honey: i64) {
    service
        .create_revision(RevisionDraft {
            hive_id: hive.id.clone(),
            review_date: Some(Utc.with_ymd_and_hms(2025, month, 10, 15, 0, 0).unwrap()),
            review_type: ReviewType::Harvest,
            honey_harvest_quantity: Some(Quantity::from_units(honey)),
            ..RevisionDraft::default()
        })
        .await
        .unwrap();
}

async fn fixture() -> Fixture {
    let service = ColmeiaService::new_local(":memory:").await.unwrap();
    let ana = service.create_user("ana", false, true).await.unwrap();
    let bia = service.create_user("bia", false, true).await.unwrap();
    let root = service.create_user("root", true, true).await.unwrap();
    for user in [&ana, &bia] {
        let codenames: Vec<String> = ["view_hive", "view_apiary", "add_apiary", "view_revision"]
            .iter()
            .map(|action| format!("apiary.{action}"))
            .collect();
        service.grant_permissions(&user.id, &codenames).await.unwrap();
    }

    let species = service
        .create_species(SpeciesDraft {
            scientific_name: "Melipona quadrifasciata".to_string(),
            popular_name: "Mandaçaia".to_string(),
            ..SpeciesDraft::default()
        })
        .await
        .unwrap();
    let ana_hive = make_hive(&service, &ana, &species, "Mandaçaia do quintal").await;
    let bia_hive = make_hive(&service, &bia, &species, "Mandaçaia da serra").await;
    harvest(&service, &ana_hive, 3, 1200).await;
    harvest(&service, &bia_hive, 3, 800).await;

    let media = TempDir::new().unwrap();
    let mut config = ColmeiaConfig::default();
    config.server.media_dir = media.path().display().to_string();
    let state = AppState::new(service, config).unwrap();
    let service = state.service.clone();

    Fixture {
        router: build_router(state),
        service,
        ana,
        bia,
        root,
        ana_hive,
        bia_hive,
        media,
    }
}

fn get(uri: &str, user: Option<&User>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user.id.as_str());
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, user: &User, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(USER_HEADER, user.id.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_file(uri: &str, user: &User, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "colmeia-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(USER_HEADER, user.id.as_str())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn grant_hive_edits(fx: &Fixture) {
    let codenames = vec!["apiary.add_hive".to_string(), "apiary.change_hive".to_string()];
    for user in [&fx.ana, &fx.bia] {
        fx.service.grant_permissions(&user.id, &codenames).await.unwrap();
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_needs_no_identity() {
    let fx = fixture().await;
    let (status, body) = send_json(&fx.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn privacy_policy_is_public() {
    let fx = fixture().await;
    let (status, page) = send_json(&fx.router, get("/politica-de-privacidade/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Política de privacidade");
    assert_eq!(page["admin_login_url"], "/admin/login/");
    assert!(!page["sections"].as_array().unwrap().is_empty());

    let entry = page["delete_data_entry_url"].as_str().unwrap().to_string();
    let response = fx.router.clone().oneshot(get(&entry, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/admin/login/?next=%2Fadmin%2Fexcluir-meus-dados%2F"
    );

    let response = fx.router.clone().oneshot(get(&entry, Some(&fx.ana))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/excluir-meus-dados/");
}

#[tokio::test]
async fn identity_is_required() {
    let fx = fixture().await;

    let (status, body) = send_json(&fx.router, get("/admin/", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let request = Request::builder()
        .uri("/admin/")
        .header(USER_HEADER, "usr-ffffffff")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&fx.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let visitor = fx.service.create_user("visitante", false, false).await.unwrap();
    let (status, body) = send_json(&fx.router, get("/admin/", Some(&visitor))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn dashboard_aggregates_only_the_actors_harvests() {
    let fx = fixture().await;
    let (status, page) = send_json(&fx.router, get("/admin/producao/?ano=2025", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::OK);

    let rows = page["monthly_table"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0]["label"], "Jan");
    assert_eq!(rows[2]["honey"], "1200.00");
    assert_eq!(page["monthly_table"]["totals"]["honey"], "1200.00");

    assert_eq!(page["cards"]["revision_count"], 1);
    assert_eq!(page["cards"]["production"]["honey"], "1200.00");
    assert_eq!(page["cards"]["active_hives"], 1);

    let rank = page["rank"]["items"].as_array().unwrap();
    assert_eq!(rank.len(), 1);
    assert_eq!(rank[0]["hive_id"], fx.ana_hive.id.as_str());
    assert_eq!(rank[0]["apiary"], "Sem meliponário");
    assert_eq!(page["rank"]["metric"], "mel");
    assert_eq!(page["rank"]["metric_label"], "Mel (ml)");
    assert_eq!(page["selected_year"], 2025);
    assert_eq!(page["available_filters"]["years"], json!([2025]));
    assert_eq!(page["filter_errors"], json!([]));
}

#[tokio::test]
async fn superuser_dashboard_sees_every_owner() {
    let fx = fixture().await;
    let (status, page) = send_json(&fx.router, get("/admin/producao/?ano=2025", Some(&fx.root))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["cards"]["production"]["honey"], "2000.00");
    assert_eq!(page["rank"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bad_filters_fall_back_with_messages() {
    let fx = fixture().await;
    let (status, page) = send_json(
        &fx.router,
        get("/admin/producao/?ano=abc&rank_metric=mel2&top=x", Some(&fx.ana)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let errors = page["filter_errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(page["rank"]["limit"], 10);
}

#[tokio::test]
async fn monthly_csv_export() {
    let fx = fixture().await;
    let response = fx
        .router
        .clone()
        .oneshot(get("/admin/producao/?ano=2025&export=meses", Some(&fx.ana)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=producao-2025.csv"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = text.split("\r\n").collect();
    assert_eq!(lines[0], "Mês,Mel (ml),Própolis (g),Cera (g),Pólen (g),# Colheitas");
    assert_eq!(lines[3], "Mar,1200.00,0.00,0.00,0.00,1");
    assert_eq!(lines[13], "Total,1200.00,0.00,0.00,0.00,1");
    assert_eq!(lines.len(), 15);
}

#[tokio::test]
async fn hive_detail_is_owner_scoped() {
    let fx = fixture().await;

    let uri = format!("/admin/producao/colmeia/{}/?ano=2025&top=5", fx.ana_hive.id);
    let (status, page) = send_json(&fx.router, get(&uri, Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["aggregates"]["honey"], "1200.00");
    assert_eq!(page["aggregates"]["harvests"], 1);
    assert_eq!(page["monthly"][0]["label"], "Mar/2025");
    assert_eq!(page["revisions"].as_array().unwrap().len(), 1);
    assert_eq!(page["back_url"], "/admin/producao/?ano=2025");
    assert_eq!(
        page["create_harvest_url"],
        format!("/admin/apiary/revision/add/?hive={}&review_type=colheita", fx.ana_hive.id)
    );

    let foreign = format!("/admin/producao/colmeia/{}/", fx.bia_hive.id);
    let (status, body) = send_json(&fx.router, get(&foreign, Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Colmeia não disponível para este usuário");

    let (status, body) = send_json(
        &fx.router,
        get("/admin/producao/colmeia/hiv-00000000/", Some(&fx.ana)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Colmeia não encontrada");

    let (status, _) = send(&fx.router, get(&foreign, Some(&fx.root))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn home_dashboard_for_regular_users() {
    let fx = fixture().await;

    let (status, page) = send_json(&fx.router, get("/admin/", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Administração do Site");
    assert_eq!(page["cards"]["hives"]["count"], 1);
    assert_eq!(page["cards"]["species"]["count"], 1);
    assert_eq!(page["recent_revisions"].as_array().unwrap().len(), 1);
    assert_eq!(page["create_revision_url"], "/admin/apiary/revision/add/");

    let (status, page) = send_json(&fx.router, get("/admin/", Some(&fx.root))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.get("cards").is_none());
    assert_eq!(page["app_list"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn menu_follows_the_active_configuration() {
    let fx = fixture().await;

    let (_, page) = send_json(&fx.router, get("/admin/menu/", Some(&fx.ana))).await;
    assert_eq!(page["app_list"][0]["app_label"], "apiary");

    let config = fx
        .service
        .create_menu_config(MenuConfigDraft {
            name: "Equipe".to_string(),
            scope: MenuScope::NonSuperuser,
            active: true,
            include_unlisted: false,
        })
        .await
        .unwrap();
    fx.service
        .create_menu_item(MenuItemDraft {
            config_id: config.id.clone(),
            order: 1,
            item_type: MenuItemType::Url,
            section: "Relatórios".to_string(),
            label: "Produção".to_string(),
            url_name: "production-dashboard".to_string(),
            ..MenuItemDraft::default()
        })
        .await
        .unwrap();

    let (status, page) = send_json(&fx.router, get("/admin/menu/", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::OK);
    let groups = page["app_list"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "Relatórios");
    assert_eq!(groups[0]["app_label"], "relatorios");
    assert_eq!(groups[0]["app_url"], "#");
    assert_eq!(groups[0]["models"][0]["admin_url"], "/admin/producao/");

    let (_, page) = send_json(&fx.router, get("/admin/menu/", Some(&fx.root))).await;
    assert_eq!(page["app_list"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn crud_checks_permissions_and_ownership() {
    let fx = fixture().await;

    let (status, created) = send_json(
        &fx.router,
        post_json("/admin/apiary/apiary/add/", &fx.ana, &json!({"name": "Sítio Boa Vista"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let apiary_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["owner_id"], fx.ana.id.as_str());

    let change_uri = format!("/admin/apiary/apiary/{apiary_id}/change/");
    let (status, _) = send(&fx.router, get(&change_uri, Some(&fx.bia))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send_json(&fx.router, get("/admin/apiary/apiary/", Some(&fx.bia))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 0);

    let (status, _) = send(
        &fx.router,
        post_json(&change_uri, &fx.ana, &json!({"name": "Sítio Novo"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&fx.router, get("/admin/core/menuconfig/", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(
        &fx.router,
        post_json("/admin/apiary/apiary/add/", &fx.ana, &json!({"name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_failed");
}

#[tokio::test]
async fn deleting_personal_data_redirects_to_login() {
    let fx = fixture().await;

    let (status, page) =
        send_json(&fx.router, get("/admin/excluir-meus-dados/", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["summary"]["hives"], 1);
    assert_eq!(page["summary"]["revisions"], 1);

    let request = Request::builder()
        .method("POST")
        .uri("/admin/excluir-meus-dados/")
        .header(USER_HEADER, fx.ana.id.as_str())
        .body(Body::empty())
        .unwrap();
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login/?deleted=1");

    let (status, _) = send(&fx.router, get("/admin/", Some(&fx.ana))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, page) = send_json(&fx.router, get("/admin/producao/?ano=2025", Some(&fx.root))).await;
    assert_eq!(page["cards"]["production"]["honey"], "800.00");
}

#[tokio::test]
async fn client_supplied_photo_paths_are_ignored() {
    let fx = fixture().await;
    grant_hive_edits(&fx).await;
    let other_dir = fx.media.path().join("revision_attachments");
    std::fs::create_dir_all(&other_dir).unwrap();
    std::fs::write(other_dir.join("bia.jpg"), b"bia").unwrap();

    let (status, created) = send_json(
        &fx.router,
        post_json(
            "/admin/apiary/hive/add/",
            &fx.ana,
            &json!({
                "acquisition_method": "doacao",
                "species_id": fx.ana_hive.species_id,
                "popular_name": "Nova",
                "photo": "revision_attachments/bia.jpg",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["photo"], Value::Null);

    let change_uri = format!("/admin/apiary/hive/{}/change/", fx.ana_hive.id);
    let (status, changed) = send_json(
        &fx.router,
        post_json(&change_uri, &fx.ana, &json!({"photo": "revision_attachments/bia.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(changed["photo"], Value::Null);

    let request = Request::builder()
        .method("POST")
        .uri("/admin/excluir-meus-dados/")
        .header(USER_HEADER, fx.ana.id.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&fx.router, request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(other_dir.join("bia.jpg").exists());
}

#[tokio::test]
async fn hive_photo_upload_replaces_the_previous_file() {
    let fx = fixture().await;
    grant_hive_edits(&fx).await;
    let uri = format!("/admin/apiary/hive/{}/photo/", fx.ana_hive.id);

    let (status, hive) =
        send_json(&fx.router, post_file(&uri, &fx.ana, "quintal.jpg", b"first")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hive["photo"], "hive_photos/quintal.jpg");
    let first = fx.media.path().join("hive_photos/quintal.jpg");
    assert_eq!(std::fs::read(&first).unwrap(), b"first");

    let (status, hive) =
        send_json(&fx.router, post_file(&uri, &fx.ana, "../../serra.jpg", b"second")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hive["photo"], "hive_photos/serra.jpg");
    assert!(!first.exists());
    assert!(fx.media.path().join("hive_photos/serra.jpg").exists());

    let (status, _) = send(&fx.router, post_file(&uri, &fx.bia, "alheia.jpg", b"x")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!fx.media.path().join("hive_photos/alheia.jpg").exists());

    let stored = fx.service.get_hive(&fx.ana_hive.id, None).await.unwrap();
    assert_eq!(stored.photo.as_deref(), Some("hive_photos/serra.jpg"));
}

#[tokio::test]
async fn hive_photo_upload_needs_change_permission() {
    let fx = fixture().await;
    let uri = format!("/admin/apiary/hive/{}/photo/", fx.ana_hive.id);
    let (status, _) = send(&fx.router, post_file(&uri, &fx.ana, "quintal.jpg", b"x")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        fx.service.get_hive(&fx.ana_hive.id, None).await.unwrap().photo,
        None
    );
}
