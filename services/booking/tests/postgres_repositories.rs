//! Round trips through the PostgreSQL repositories
//!
//! These run the hand-written SQL and row mapping against a live database
//! with the migrations applied, so they are ignored by default: run with
//! `cargo test -- --ignored` and `DATABASE_URL` pointing at a scratch database.

use auth::{
    Role, UserProfile,
    models::NewUser,
    repositories::{PgUserRepository, UserStore},
};
use booking::{
    BookingStatus,
    models::NewBooking,
    repositories::{BookingStore, PgBookingRepository},
};
use chrono::{NaiveDate, Utc};
use common::database::{DatabaseConfig, init_pool, run_migrations};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn new_booking(user_id: i64, reference: String, check_in: &str) -> NewBooking {
    NewBooking {
        user_id,
        hotel_id: "MCLONGHM".to_string(),
        provider_hotel_id: Some("MCLONGHM".to_string()),
        provider_booking_id: None,
        check_in: date(check_in),
        check_out: date("2030-01-20"),
        guests: 2,
        room_type: "double".to_string(),
        total_price: 512.4,
        currency: "EUR".to_string(),
        status: BookingStatus::Confirmed,
        booking_reference: reference,
        special_requests: Some("high floor".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_user_and_booking_repositories() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;

    let users = PgUserRepository::new(pool.clone());
    let bookings = PgBookingRepository::new(pool);

    // Unique per run so the test can be repeated against the same database
    let run = Utc::now().timestamp_micros();
    let email = format!("pg-{}@example.com", run);

    let new_user = NewUser {
        email: email.clone(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        profile: UserProfile {
            first_name: "Lucia".to_string(),
            last_name: "Perez".to_string(),
            phone: Some("+54 351 555 0000".to_string()),
            date_of_birth: None,
        },
        role: Role::Admin,
    };

    let user_id = users.insert(&new_user).await?;
    let user = users.find_by_id(user_id).await?.expect("user by id");
    assert_eq!(user.email, email);
    assert_eq!(user.role, Role::Admin);
    assert!(user.is_active);
    assert_eq!(user.profile, new_user.profile);
    assert_eq!(users.find_by_email(&email).await?.map(|u| u.id), Some(user_id));
    assert!(users.insert(&new_user).await.unwrap_err().is_unique_violation());

    let first = bookings
        .insert(&new_booking(user_id, format!("BKPGA{}", run), "2030-01-10"))
        .await?;
    let second = bookings
        .insert(&new_booking(user_id, format!("BKPGB{}", run), "2030-01-15"))
        .await?;

    let stored = bookings.find_by_id(first).await?.expect("booking by id");
    assert_eq!(stored.user_id, user_id);
    assert_eq!(stored.check_in, date("2030-01-10"));
    assert_eq!(stored.check_out, date("2030-01-20"));
    assert_eq!(stored.guests, 2);
    assert_eq!(stored.total_price, 512.4);
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.special_requests.as_deref(), Some("high floor"));
    assert_eq!(stored.provider_booking_id, None);

    let listed: Vec<i64> = bookings
        .find_by_user(user_id)
        .await?
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(listed, vec![second, first]);

    let duplicate = bookings
        .insert(&new_booking(user_id, format!("BKPGA{}", run), "2030-01-10"))
        .await;
    assert!(duplicate.unwrap_err().is_unique_violation());

    Ok(())
}
