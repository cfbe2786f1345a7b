//! Memory fact CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::MemoryFact;

/// List all memory facts in insertion order.
pub async fn list_facts(pool: &SqlitePool) -> Result<Vec<MemoryFact>> {
    let facts = sqlx::query_as::<_, MemoryFact>(
        r#"
        SELECT id, fact_text
        FROM memory_facts
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(facts)
}

/// Get a memory fact by ID.
pub async fn get_fact(pool: &SqlitePool, id: i64) -> Result<MemoryFact> {
    sqlx::query_as::<_, MemoryFact>(
        r#"
        SELECT id, fact_text
        FROM memory_facts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Memory fact",
        id: id.to_string(),
    })
}

/// Create a memory fact and return the stored row.
pub async fn create_fact(pool: &SqlitePool, fact_text: &str) -> Result<MemoryFact> {
    let fact = sqlx::query_as::<_, MemoryFact>(
        r#"
        INSERT INTO memory_facts (fact_text)
        VALUES (?)
        RETURNING id, fact_text
        "#,
    )
    .bind(fact_text)
    .fetch_one(pool)
    .await?;

    tracing::debug!(id = fact.id, "Created memory fact");
    Ok(fact)
}

/// Replace the text of an existing memory fact.
pub async fn update_fact(pool: &SqlitePool, id: i64, fact_text: &str) -> Result<MemoryFact> {
    sqlx::query_as::<_, MemoryFact>(
        r#"
        UPDATE memory_facts
        SET fact_text = ?
        WHERE id = ?
        RETURNING id, fact_text
        "#,
    )
    .bind(fact_text)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Memory fact",
        id: id.to_string(),
    })
}

/// Delete a memory fact by ID.
pub async fn delete_fact(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM memory_facts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Memory fact",
            id: id.to_string(),
        });
    }

    Ok(())
}
