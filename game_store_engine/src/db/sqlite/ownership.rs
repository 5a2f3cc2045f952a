use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::OwnedGame;

/// The first of `game_ids` (in the given order) that the customer already owns.
pub async fn first_owned(
    customer_id: i64,
    game_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, sqlx::Error> {
    if game_ids.is_empty() {
        return Ok(None);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT game_id FROM ownership WHERE customer_id = ");
    builder.push_bind(customer_id);
    builder.push(" AND game_id IN (");
    let mut ids = builder.separated(", ");
    for id in game_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(")");
    let owned: Vec<i64> = builder.build_query_scalar().fetch_all(conn).await?;
    Ok(game_ids.iter().find(|id| owned.contains(id)).copied())
}

/// Idempotent bulk grant. Existing (customer, game) pairs are left as they are. Returns the number of new rows.
pub async fn grant(
    customer_id: i64,
    order_id: Option<i64>,
    game_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    if game_ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO ownership (customer_id, game_id, order_id) ");
    builder.push_values(game_ids, |mut row, game_id| {
        row.push_bind(customer_id).push_bind(*game_id).push_bind(order_id);
    });
    builder.push(" ON CONFLICT (customer_id, game_id) DO NOTHING");
    let granted = builder.build().execute(conn).await?.rows_affected();
    trace!("🗃️ Granted {granted} of {} games to customer #{customer_id}", game_ids.len());
    Ok(granted)
}

pub async fn list_owned(customer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OwnedGame>, sqlx::Error> {
    let games = sqlx::query_as(
        r#"
        SELECT ownership.game_id, games.title, ownership.order_id, ownership.granted_at
        FROM ownership JOIN games ON games.id = ownership.game_id
        WHERE ownership.customer_id = $1
        ORDER BY ownership.granted_at, ownership.id
        "#,
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(games)
}
