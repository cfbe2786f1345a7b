//! Training instruction storage and seeding.

use std::collections::HashSet;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{DatabaseError, Result};
use crate::models::TrainingInstruction;

/// Outcome of seeding the built-in instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Instructions present before seeding.
    pub existing: usize,
    /// Seed instructions that were missing and got inserted.
    pub added: usize,
    /// Instructions present after seeding.
    pub total: usize,
}

/// List every instruction, hidden or not, in insertion order.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TrainingInstruction>> {
    let instructions = sqlx::query_as::<_, TrainingInstruction>(
        r#"
        SELECT id, instruction_text, is_hidden
        FROM training_instructions
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(instructions)
}

/// List instructions that are not hidden.
pub async fn list_visible(pool: &SqlitePool) -> Result<Vec<TrainingInstruction>> {
    let instructions = sqlx::query_as::<_, TrainingInstruction>(
        r#"
        SELECT id, instruction_text, is_hidden
        FROM training_instructions
        WHERE is_hidden = 0
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(instructions)
}

/// Create an instruction and return the stored row.
pub async fn create_instruction(
    pool: &SqlitePool,
    instruction_text: &str,
    is_hidden: bool,
) -> Result<TrainingInstruction> {
    let instruction = sqlx::query_as::<_, TrainingInstruction>(
        r#"
        INSERT INTO training_instructions (instruction_text, is_hidden)
        VALUES (?, ?)
        RETURNING id, instruction_text, is_hidden
        "#,
    )
    .bind(instruction_text)
    .bind(is_hidden)
    .fetch_one(pool)
    .await?;

    tracing::debug!(id = instruction.id, is_hidden, "Created training instruction");
    Ok(instruction)
}

/// Set the hidden flag of an instruction.
pub async fn set_hidden(pool: &SqlitePool, id: i64, is_hidden: bool) -> Result<TrainingInstruction> {
    sqlx::query_as::<_, TrainingInstruction>(
        r#"
        UPDATE training_instructions
        SET is_hidden = ?
        WHERE id = ?
        RETURNING id, instruction_text, is_hidden
        "#,
    )
    .bind(is_hidden)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Training instruction",
        id: id.to_string(),
    })
}

/// Delete an instruction by ID.
pub async fn delete_instruction(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM training_instructions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Training instruction",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Insert every seed instruction whose exact text is not stored yet.
///
/// Seeded rows are hidden. Runs in a single transaction; running it twice in
/// a row adds nothing the second time.
pub async fn seed_missing(pool: &SqlitePool, seeds: &[&str]) -> Result<SeedReport> {
    let mut tx = pool.begin().await?;
    let report = seed_in(&mut tx, seeds).await?;
    tx.commit().await?;

    info!(
        existing = report.existing,
        added = report.added,
        total = report.total,
        "Seed instruction check complete"
    );
    Ok(report)
}

/// Delete every instruction, then insert the seed set.
///
/// Both steps share one transaction, so a failure keeps the previous set.
/// Returns the number of deleted rows alongside the seed report.
pub async fn reset_and_seed(pool: &SqlitePool, seeds: &[&str]) -> Result<(u64, SeedReport)> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM training_instructions")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let report = seed_in(&mut tx, seeds).await?;
    tx.commit().await?;

    info!(deleted, added = report.added, "Reset training instructions");
    Ok((deleted, report))
}

async fn seed_in(conn: &mut SqliteConnection, seeds: &[&str]) -> Result<SeedReport> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT instruction_text FROM training_instructions")
            .fetch_all(&mut *conn)
            .await?;

    let existing_count = existing.len();
    let mut known: HashSet<String> = existing.into_iter().collect();
    let mut added = 0;

    for text in seeds {
        if !known.insert((*text).to_string()) {
            continue;
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO training_instructions (instruction_text, is_hidden)
            VALUES (?, 1)
            RETURNING id
            "#,
        )
        .bind(*text)
        .fetch_one(&mut *conn)
        .await?;

        info!(id, text = *text, "Added missing seed instruction (hidden)");
        added += 1;
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_instructions")
        .fetch_one(&mut *conn)
        .await?;

    Ok(SeedReport {
        existing: existing_count,
        added,
        total: total as usize,
    })
}
