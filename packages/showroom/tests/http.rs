//! HTTP handlers end to end, over a mock database and a filesystem blob store.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::{BlobKey, BlobStore, Bucket, public_url};
use common::{StorageAppConfig, StorageBackend};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};

use showroom::config::{AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
use showroom::entity::{category, intro_slide, website_image};
use showroom::state::AppState;

const JWT_SECRET: &str = "test-secret-for-http-tests";
const BASE_URL: &str = "http://127.0.0.1:3000/media";

mod routes {
    pub const CATEGORIES: &str = "/api/v1/categories";
    pub const SLIDES: &str = "/api/v1/slides";

    pub fn website_image(image_type: &str) -> String {
        format!("/api/v1/website-images/{image_type}")
    }
}

/// A running server over a scripted database.
struct TestApp {
    addr: SocketAddr,
    client: Client,
    blobs: Arc<FilesystemBlobStore>,
    token: String,
    _dir: tempfile::TempDir,
}

struct TestResponse {
    status: u16,
    body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, body }
    }
}

fn app_config(media_root: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            admin_password_hash: String::new(),
        },
        storage: StorageAppConfig {
            backend: StorageBackend::Filesystem,
            public_base_url: BASE_URL.to_string(),
            root: media_root.to_path_buf(),
            ..Default::default()
        },
    }
}

impl TestApp {
    async fn spawn(db: DatabaseConnection) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = app_config(&dir.path().join("media"));
        let blobs = Arc::new(
            FilesystemBlobStore::new(
                config.storage.root.clone(),
                BASE_URL.to_string(),
                config.storage.max_upload_size,
            )
            .await
            .expect("Failed to open blob store"),
        );

        let state = AppState {
            db,
            blob_store: blobs.clone(),
            config: Arc::new(config),
        };
        let app = showroom::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            blobs,
            token: showroom::utils::jwt::sign(JWT_SECRET).unwrap(),
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let res = req.send().await.expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    async fn put_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send PUT request");
        TestResponse::from_response(res).await
    }

    async fn seed_blob(&self, bucket: Bucket, key: &str) {
        let key = BlobKey::parse(key).unwrap();
        self.blobs
            .put(bucket, &key, b"\x89PNG", "image/png")
            .await
            .unwrap();
    }

    async fn blob_keys(&self, bucket: Bucket) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .list(bucket)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.key.to_string())
            .collect();
        keys.sort();
        keys
    }
}

fn png(name: &str) -> Part {
    Part::bytes(b"\x89PNG\r\n".to_vec())
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn slide(id: i32, key: &str) -> intro_slide::Model {
    intro_slide::Model {
        id,
        image_url: public_url(BASE_URL, Bucket::Gallery, &BlobKey::parse(key).unwrap()),
        created_at: at(1_700_000_000 + i64::from(id)),
    }
}

fn deleted(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

mod categories {
    use super::*;

    #[tokio::test]
    async fn name_differing_only_in_case_is_a_conflict() {
        let ranger = category::Model {
            id: 1,
            name: "Ranger".into(),
            name_key: "ranger".into(),
            created_at: at(1_700_000_000),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ranger]])
            .into_connection();
        let app = TestApp::spawn(db).await;

        let res = app
            .post_json(routes::CATEGORIES, &json!({"name": "RANGER"}), Some(&app.token))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn create_requires_a_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = TestApp::spawn(db).await;

        let res = app
            .post_json(routes::CATEGORIES, &json!({"name": "Everest"}), None)
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod website_images {
    use super::*;

    #[tokio::test]
    async fn missing_slot_is_created() {
        let row = website_image::Model {
            image_type: "logo".into(),
            image_url: format!("{BASE_URL}/logos/logos/site_1_00000000.png"),
            updated_at: at(1_700_000_000),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<website_image::Model>::new()])
            .append_query_results([vec![row]])
            .into_connection();
        let app = TestApp::spawn(db).await;

        let res = app
            .put_form(
                &routes::website_image("logo"),
                Form::new().part("file", png("logo.png")),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["image_type"], "logo");
        let keys = app.blob_keys(Bucket::Logos).await;
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("logos/site_"));
    }

    #[tokio::test]
    async fn existing_slot_is_replaced_in_place() {
        let footer = |url: String| website_image::Model {
            image_type: "footer_logo".into(),
            image_url: url,
            updated_at: at(1_700_000_000),
        };
        let old_url = format!("{BASE_URL}/logos/logos/site_1_aaaaaaaa.png");
        let new_url = format!("{BASE_URL}/logos/logos/site_2_bbbbbbbb.png");
        // Lookup, then the RETURNING row of the update. No insert or delete is scripted.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![footer(old_url)]])
            .append_query_results([vec![footer(new_url)]])
            .into_connection();
        let app = TestApp::spawn(db).await;
        app.seed_blob(Bucket::Logos, "logos/site_1_aaaaaaaa.png").await;

        let res = app
            .put_form(
                &routes::website_image("footerLogo"),
                Form::new().part("file", png("footer.png")),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["image_type"], "footerLogo");
        let keys = app.blob_keys(Bucket::Logos).await;
        assert_eq!(keys.len(), 1);
        assert_ne!(keys[0], "logos/site_1_aaaaaaaa.png");
    }
}

mod slides {
    use super::*;

    #[tokio::test]
    async fn save_appends_new_and_drops_unkept() {
        let s1 = slide(1, "gallery/slide_1_11111111.png");
        let s2 = slide(2, "gallery/slide_2_22222222.png");
        let s3 = slide(3, "gallery/slide_3_33333333.png");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![s1.clone(), s2.clone()]])
            .append_query_results([vec![s3.clone()]])
            .append_query_results([vec![s1.clone(), s3.clone()]])
            .append_exec_results([deleted(1)])
            .into_connection();
        let app = TestApp::spawn(db).await;
        app.seed_blob(Bucket::Gallery, "gallery/slide_1_11111111.png").await;
        app.seed_blob(Bucket::Gallery, "gallery/slide_2_22222222.png").await;

        let form = Form::new().text("keep", "1").part("file", png("new.png"));
        let res = app.put_form(routes::SLIDES, form).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["created"], 1);
        assert_eq!(res.body["deleted"], 1);
        assert_eq!(res.body["cleanup_failures"], 0);
        assert_eq!(res.body["slides"].as_array().unwrap().len(), 2);

        let keys = app.blob_keys(Bucket::Gallery).await;
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"gallery/slide_1_11111111.png".to_string()));
        assert!(!keys.contains(&"gallery/slide_2_22222222.png".to_string()));
    }

    #[tokio::test]
    async fn unknown_keep_id_rejects_the_whole_save() {
        let s1 = slide(1, "gallery/slide_1_11111111.png");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![s1]])
            .into_connection();
        let app = TestApp::spawn(db).await;
        app.seed_blob(Bucket::Gallery, "gallery/slide_1_11111111.png").await;

        let form = Form::new()
            .text("keep", "1")
            .text("keep", "9")
            .part("file", png("new.png"));
        let res = app.put_form(routes::SLIDES, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(
            app.blob_keys(Bucket::Gallery).await,
            vec!["gallery/slide_1_11111111.png".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_save_keeps_existing_and_already_created_slides() {
        let s1 = slide(1, "gallery/slide_1_11111111.png");
        let s2 = slide(2, "gallery/slide_2_22222222.png");
        let s3 = slide(3, "gallery/slide_3_33333333.png");
        // The second insert finds nothing scripted and fails.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![s1, s2]])
            .append_query_results([vec![s3]])
            .into_connection();
        let app = TestApp::spawn(db).await;
        app.seed_blob(Bucket::Gallery, "gallery/slide_1_11111111.png").await;
        app.seed_blob(Bucket::Gallery, "gallery/slide_2_22222222.png").await;

        let form = Form::new()
            .text("keep", "1")
            .part("file", png("a.png"))
            .part("file", png("b.png"));
        let res = app.put_form(routes::SLIDES, form).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "INTERNAL_ERROR");

        // Both seeded slides survive, next to the two uploads.
        let keys = app.blob_keys(Bucket::Gallery).await;
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&"gallery/slide_1_11111111.png".to_string()));
        assert!(keys.contains(&"gallery/slide_2_22222222.png".to_string()));
    }
}
