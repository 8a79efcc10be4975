use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyseat_core::{Booking, BookingRepository, BoxError};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    flight_id: Uuid,
    passenger_name: String,
    seats: Vec<String>,
    price_amount: i64,
    price_currency: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            flight_id: row.flight_id,
            passenger_name: row.passenger_name,
            seats: row.seats,
            price_amount: row.price_amount,
            price_currency: row.price_currency,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, flight_id, passenger_name, seats, price_amount, price_currency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.flight_id)
        .bind(&booking.passenger_name)
        .bind(&booking.seats)
        .bind(booking.price_amount)
        .bind(&booking.price_currency)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT id, flight_id, passenger_name, seats, price_amount, price_currency, created_at FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }
}
