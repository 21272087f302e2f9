use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::room::Room;
use uuid::Uuid;

impl PostgresRepository {
    pub async fn get_room_by_id(&self, id: &Uuid) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, name, room_type, capacity, building, floor, created_at
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    pub async fn list_all_rooms(&self) -> Result<Vec<Room>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT id, name, room_type, capacity, building, floor, created_at
            FROM rooms
            ORDER BY building ASC NULLS LAST, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }
}
