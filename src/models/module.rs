use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Debug, Clone, Default, sqlx::FromRow)]
pub struct Module {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub leader_id: Option<Uuid>,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}
