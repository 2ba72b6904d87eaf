/*
 * Responsibility
 * - profiles テーブル向け SQLx 操作 (role のポイント参照のみ)
 * - 行が無い場合は None を返し、解釈は service 側に任せる
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct ProfileRoleRow {
    pub role: String,
}

pub async fn find_role(db: &PgPool, user_id: Uuid) -> Result<Option<ProfileRoleRow>, RepoError> {
    let row = sqlx::query_as::<_, ProfileRoleRow>(
        r#"
        SELECT role::text AS role
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
