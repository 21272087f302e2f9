use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    #[default]
    LectureHall,
    Lab,
    Seminar,
    Studio,
    Office,
}

#[derive(Serialize, Debug, Clone, Default, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: Option<i32>,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct RoomResponse {
    pub id: Uuid,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: Option<i32>,
    pub building: Option<String>,
    pub floor: Option<i32>,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
            room_type: room.room_type,
            capacity: room.capacity,
            building: room.building.clone(),
            floor: room.floor,
        }
    }
}
