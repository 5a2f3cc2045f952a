use sqlx::SqliteConnection;

use crate::db_types::GameInfo;

pub async fn fetch_game_info(game_id: i64, conn: &mut SqliteConnection) -> Result<Option<GameInfo>, sqlx::Error> {
    let game = sqlx::query_as("SELECT id, title, price FROM games WHERE id = $1 AND deleted_at IS NULL")
        .bind(game_id)
        .fetch_optional(conn)
        .await?;
    Ok(game)
}
