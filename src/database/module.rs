use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::module::Module;
use uuid::Uuid;

impl PostgresRepository {
    pub async fn get_module_by_id(&self, id: &Uuid) -> Result<Option<Module>, AppError> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, code, name, leader_id, credits, created_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }
}
