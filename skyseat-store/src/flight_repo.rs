use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use skyseat_core::search::FlightSearchQuery;
use skyseat_core::{BoxError, Flight, FlightHold, FlightInventoryStore, Seat, SeatMap};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

const FLIGHT_COLUMNS: &str = "id, flight_number, origin, destination, departure_date, departure_time, \
     price_amount, price_currency, available_seats, seat_map";

/// Flight inventory in Postgres. The exclusive hold is a row lock taken with
/// `SELECT ... FOR UPDATE` inside a transaction that lives as long as the hold.
pub struct PostgresFlightStore {
    pool: PgPool,
}

impl PostgresFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    departure_time: NaiveTime,
    price_amount: i64,
    price_currency: String,
    available_seats: i32,
    seat_map: Json<Vec<Seat>>,
}

impl TryFrom<FlightRow> for Flight {
    type Error = BoxError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        Ok(Flight {
            id: row.id,
            flight_number: row.flight_number,
            origin: row.origin,
            destination: row.destination,
            departure_date: row.departure_date,
            departure_time: row.departure_time,
            price_amount: row.price_amount,
            price_currency: row.price_currency,
            available_seats: u32::try_from(row.available_seats)
                .map_err(|_| format!("flight {} has negative available_seats", row.id))?,
            seat_map: SeatMap { seats: row.seat_map.0 },
        })
    }
}

#[async_trait]
impl FlightInventoryStore for PostgresFlightStore {
    async fn create_flight(&self, flight: &Flight) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, flight_number, origin, destination, departure_date, departure_time,
                                 price_amount, price_currency, available_seats, seat_map)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure_date)
        .bind(flight.departure_time)
        .bind(flight.price_amount)
        .bind(&flight.price_currency)
        .bind(i32::try_from(flight.available_seats)?)
        .bind(Json(&flight.seat_map.seats))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn read(&self, flight_id: Uuid) -> Result<Option<Flight>, BoxError> {
        let row = sqlx::query_as::<_, FlightRow>(&format!("SELECT {} FROM flights WHERE id = $1", FLIGHT_COLUMNS))
            .bind(flight_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Flight::try_from).transpose()
    }

    async fn search(&self, query: &FlightSearchQuery) -> Result<Vec<Flight>, BoxError> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            r#"
            SELECT {}
            FROM flights
            WHERE origin = $1
                AND destination = $2
                AND departure_date = $3
                AND available_seats > 0
            ORDER BY departure_time
            "#,
            FLIGHT_COLUMNS
        ))
        .bind(&query.origin)
        .bind(&query.destination)
        .bind(query.departure_date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    async fn lock_for_update(&self, flight_id: Uuid) -> Result<Option<Box<dyn FlightHold>>, BoxError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {} FROM flights WHERE id = $1 FOR UPDATE",
            FLIGHT_COLUMNS
        ))
        .bind(flight_id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                debug!("Row lock taken on flight {}", flight_id);
                Ok(Some(Box::new(PostgresHold {
                    tx,
                    flight: Flight::try_from(row)?,
                })))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}

/// Open transaction holding the row lock. Dropping it rolls back.
struct PostgresHold {
    tx: Transaction<'static, Postgres>,
    flight: Flight,
}

#[async_trait]
impl FlightHold for PostgresHold {
    fn snapshot(&self) -> &Flight {
        &self.flight
    }

    async fn commit(self: Box<Self>, seat_map: SeatMap, available_seats: u32) -> Result<(), BoxError> {
        let PostgresHold { mut tx, flight } = *self;

        let result = sqlx::query("UPDATE flights SET seat_map = $1, available_seats = $2 WHERE id = $3")
            .bind(Json(seat_map.seats))
            .bind(i32::try_from(available_seats)?)
            .bind(flight.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(format!("flight {} vanished while held", flight.id).into());
        }

        tx.commit().await?;
        Ok(())
    }
}
