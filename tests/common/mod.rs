use boxledger::config::AppConfig;
use boxledger::services::MongoDb;
use boxledger::Application;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("boxledger_test_{}", Uuid::new_v4().simple());

        let mut config = AppConfig::load().expect("Failed to load configuration");
        config.port = 0; // Random port
        config.mongodb.database = db_name.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            db,
            db_name,
        }
    }

    /// Register a fresh user and return their bearer token. Each token is
    /// its own tenant.
    pub async fn signup(&self, email: &str) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/signup", self.address))
            .json(&serde_json::json!({
                "email": email,
                "password": "password123",
                "name": "Test User",
            }))
            .send()
            .await
            .expect("Failed to execute signup request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        body["token"].as_str().expect("Missing token").to_string()
    }

    pub async fn import(
        &self,
        token: &str,
        customers: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/api/import", self.address))
            .bearer_auth(token)
            .json(&serde_json::json!({ "customers": customers }))
            .send()
            .await
            .expect("Failed to execute import request")
    }

    pub async fn create_customer(
        &self,
        token: &str,
        body: serde_json::Value,
    ) -> serde_json::Value {
        let response = self
            .client
            .post(format!("{}/api/customer/create", self.address))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute create request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse JSON")
    }

    pub async fn drop_database(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
