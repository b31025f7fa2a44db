//! Shared fixtures for the integration tests: an in-memory repository with
//! inline notification dispatch and helpers to seed it.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use erms_server::{
    config::{AppConfig, DispatchMode, StorageBackend},
    models::{
        device::{Device, NewDevice},
        spare_part::{CreatePart, SparePart},
        user::{NewUser, User},
        DeviceStatus, Role, UserClaims,
    },
    repository::Repository,
    services::Services,
    AppState,
};

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    config.notifications.dispatch = DispatchMode::Inline;
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config
}

pub async fn services_with(repository: Repository) -> Services {
    Services::new(repository, &test_config())
        .await
        .expect("services over the in-memory store")
}

pub async fn app_state(repository: Repository) -> AppState {
    let config = test_config();
    let services = Services::new(repository, &config)
        .await
        .expect("services over the in-memory store");
    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

pub async fn seed_user(repository: &Repository, role: Role, username: &str) -> User {
    repository
        .users
        .create(&NewUser {
            name: format!("{} {}", role, username),
            username: username.to_string(),
            email: format!("{}@example.org", username),
            password_hash: None,
            phone: None,
            address: Some("Building A, room 12".to_string()),
            department: Some("IT".to_string()),
            specialty: None,
            role,
        })
        .await
        .expect("seed user")
}

pub async fn seed_device(repository: &Repository, owner: &User) -> Device {
    repository
        .devices
        .create(&NewDevice {
            device_name: format!("{}'s laptop", owner.username),
            serial_number: format!("SN-{}", owner.id),
            device_type: "Laptop".to_string(),
            brand: Some("Lenovo".to_string()),
            model: Some("T14".to_string()),
            condition: Some("Good".to_string()),
            status: DeviceStatus::Active,
            assigned_to_id: Some(owner.id),
        })
        .await
        .expect("seed device")
}

pub async fn seed_part(repository: &Repository, name: &str, quantity: i32, min_stock: i32) -> SparePart {
    repository
        .inventory
        .create(&CreatePart {
            name: name.to_string(),
            category: "Display".to_string(),
            quantity,
            min_stock,
            price: Decimal::new(4999, 2),
        })
        .await
        .expect("seed part")
}

pub fn claims_for(user: &User) -> UserClaims {
    UserClaims::new(user.id, &user.username, &user.name, user.role, 1)
}

pub fn bearer(user: &User) -> String {
    let token = claims_for(user).create_token(JWT_SECRET).expect("token");
    format!("Bearer {}", token)
}
