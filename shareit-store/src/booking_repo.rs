use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_core::models::{Booking, BookingInterval, BookingStatus, NewBooking};
use shareit_core::repository::{BookingFilter, BookingRole, BookingStore, BookingWindow};
use shareit_core::{CoreError, CoreResult};
use shareit_shared::Page;
use sqlx::{Postgres, QueryBuilder};

use crate::database::{store_error, PgUnitOfWork};

const BOOKING_COLUMNS: &str = "b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    item_id: i64,
    booker_id: i64,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|e| CoreError::StoreError(e.to_string()))?;
        Ok(Booking {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            item_id: row.item_id,
            booker_id: row.booker_id,
            status,
        })
    }
}

#[derive(sqlx::FromRow)]
struct IntervalRow {
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
}

fn into_bookings(rows: Vec<BookingRow>) -> CoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// One statement covers every role/window combination; only the WHERE
/// clause differs.
fn booking_query(filter: &BookingFilter, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM bookings b JOIN items i ON i.id = b.item_id WHERE ",
        BOOKING_COLUMNS
    ));

    match filter.role {
        BookingRole::Borrower => qb.push("b.booker_id = "),
        BookingRole::Owner => qb.push("i.owner_id = "),
    };
    qb.push_bind(filter.user_id);

    match filter.window {
        BookingWindow::All => {}
        BookingWindow::Current(now) => {
            qb.push(" AND b.start_date <= ")
                .push_bind(now)
                .push(" AND b.end_date > ")
                .push_bind(now);
        }
        BookingWindow::Past(now) => {
            qb.push(" AND b.end_date < ").push_bind(now);
        }
        BookingWindow::Future(now) => {
            qb.push(" AND b.start_date > ").push_bind(now);
        }
        BookingWindow::Status(status) => {
            qb.push(" AND b.status = ").push_bind(status.as_str());
        }
    }

    qb.push(" ORDER BY b.start_date DESC, b.id ASC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

#[async_trait]
impl BookingStore for PgUnitOfWork {
    async fn insert_booking(&mut self, booking: NewBooking) -> CoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings AS b (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING b.id, b.start_date, b.end_date, b.item_id, b.booker_id, b.status
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(booking.status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)?;

        row.try_into()
    }

    async fn find_booking(&mut self, id: i64) -> CoreResult<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings b WHERE b.id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;

        row.map(Booking::try_from).transpose()
    }

    async fn update_booking_status(&mut self, id: i64, status: BookingStatus) -> CoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::StoreError(format!("no booking row {}", id)));
        }
        Ok(())
    }

    async fn find_approved_intervals(&mut self, item_id: i64) -> CoreResult<Vec<BookingInterval>> {
        let rows = sqlx::query_as::<_, IntervalRow>(
            "SELECT start_date, end_date FROM bookings WHERE item_id = $1 AND status = $2",
        )
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|r| BookingInterval::new(r.start_date, r.end_date))
            .collect())
    }

    async fn query_bookings(
        &mut self,
        filter: &BookingFilter,
        page: Page,
    ) -> CoreResult<Vec<Booking>> {
        let rows = booking_query(filter, page)
            .build_query_as::<BookingRow>()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn find_bookings_for_items(&mut self, item_ids: &[i64]) -> CoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings b WHERE b.item_id = ANY($1) ORDER BY b.start_date",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(item_ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn has_finished_approved_booking(
        &mut self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2 AND status = $3 AND end_date < $4
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(BookingStatus::Approved.as_str())
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(store_error)
    }
}
