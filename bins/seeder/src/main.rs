//! Database seeder for Caja development and testing.
//!
//! Seeds the denomination catalog and a test cash register, and prints a
//! development bearer token for the test user.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use caja_db::entities::{cash_registers, currency_rates};
use caja_shared::{JwtConfig, JwtService};

/// Test register ID (consistent for all seeds)
const TEST_REGISTER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = caja_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding currency rates...");
    seed_currency_rates(&db).await;

    println!("Seeding test cash register...");
    seed_cash_register(&db).await;

    println!("Seeding complete!");
    print_dev_token();
}

fn test_register_id() -> Uuid {
    Uuid::parse_str(TEST_REGISTER_ID).unwrap()
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

/// Seeds the denomination catalog used to price cash lines.
async fn seed_currency_rates(db: &DatabaseConnection) {
    let rates = [
        ("PYG", Decimal::ONE, "Guarani", "₲"),
        ("USD", Decimal::new(7300, 0), "US Dollar", "$"),
        ("EUR", Decimal::new(7950, 0), "Euro", "€"),
        ("BRL", Decimal::new(1350, 0), "Real", "R$"),
    ];

    for (code, rate, name, symbol) in rates {
        if currency_rates::Entity::find_by_id(code)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Rate {code} already exists, skipping...");
            continue;
        }

        currency_rates::ActiveModel {
            code: Set(code.to_string()),
            rate: Set(rate),
            name: Set(name.to_string()),
            symbol: Set(symbol.to_string()),
        }
        .insert(db)
        .await
        .expect("Failed to seed currency rate");
        println!("  Seeded rate {code}");
    }
}

/// Seeds a test cash register for development.
async fn seed_cash_register(db: &DatabaseConnection) {
    if cash_registers::Entity::find_by_id(test_register_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test register already exists, skipping...");
        return;
    }

    let now = chrono::Utc::now().into();
    cash_registers::ActiveModel {
        id: Set(test_register_id()),
        name: Set("Main counter".to_string()),
        description: Set(Some("Seeded register for local development".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed cash register");
    println!("  Seeded register {TEST_REGISTER_ID}");
}

/// Prints a bearer token for the test user so requests can be exercised
/// locally without the identity service.
fn print_dev_token() {
    let config = std::env::var("CAJA__JWT__SECRET").map_or_else(
        |_| JwtConfig::default(),
        |secret| JwtConfig {
            secret,
            leeway_secs: 30,
        },
    );

    let service = JwtService::new(config);
    match service.generate_token(test_user_id(), 8 * 60) {
        Ok(token) => {
            println!("Dev token for user {TEST_USER_ID} (valid 8h):");
            println!("  Authorization: Bearer {token}");
        }
        Err(e) => println!("Could not generate dev token: {e}"),
    }
}
