//! Personal data summary and removal for a single user.

use serde::Serialize;

use crate::error::DatabaseError;
use crate::helpers::{count, exists};
use crate::service::ColmeiaService;

/// What `delete_personal_data` would remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonalDataSummary {
    pub apiaries: u32,
    pub hives: u32,
    pub revisions: u32,
    pub attachments: u32,
    pub hive_photos: u32,
    pub has_creator_profile: bool,
}

const OWNED_REVISIONS: &str = "SELECT r.id FROM revisions r JOIN hives h ON h.id = r.hive_id WHERE h.owner_id = ?1";

impl ColmeiaService {
    pub async fn personal_data_summary(
        &self,
        user_id: &str,
    ) -> Result<PersonalDataSummary, DatabaseError> {
        let conn = self.db().conn();
        let owner = || vec![libsql::Value::from(user_id)];
        Ok(PersonalDataSummary {
            apiaries: count(conn, "SELECT COUNT(*) FROM apiaries WHERE owner_id = ?1", owner())
                .await?,
            hives: count(conn, "SELECT COUNT(*) FROM hives WHERE owner_id = ?1", owner()).await?,
            revisions: count(
                conn,
                "SELECT COUNT(*) FROM revisions r JOIN hives h ON h.id = r.hive_id WHERE h.owner_id = ?1",
                owner(),
            )
            .await?,
            attachments: count(
                conn,
                &format!(
                    "SELECT COUNT(*) FROM revision_attachments WHERE revision_id IN ({OWNED_REVISIONS})"
                ),
                owner(),
            )
            .await?,
            hive_photos: count(
                conn,
                "SELECT COUNT(*) FROM hives WHERE owner_id = ?1 AND photo IS NOT NULL AND photo != ''",
                owner(),
            )
            .await?,
            has_creator_profile: exists(
                conn,
                "SELECT 1 FROM creator_profiles WHERE user_id = ?1",
                owner(),
            )
            .await?,
        })
    }

    /// Remove everything the user owns, then the user, in one transaction.
    ///
    /// Returns the stored file paths (attachments, then hive photos) so the
    /// caller can delete them once the transaction has committed.
    pub async fn delete_personal_data(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        self.get_user(user_id).await?;

        let tx = self.db().begin().await?;
        let mut files = Vec::new();
        let mut rows = tx
            .query(
                &format!(
                    "SELECT file FROM revision_attachments WHERE revision_id IN ({OWNED_REVISIONS}) ORDER BY rowid"
                ),
                [user_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            files.push(row.get::<String>(0)?);
        }
        let mut rows = tx
            .query(
                "SELECT photo FROM hives WHERE owner_id = ?1 AND photo IS NOT NULL AND photo != '' ORDER BY rowid",
                [user_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            files.push(row.get::<String>(0)?);
        }

        tx.execute(
            &format!("DELETE FROM revision_attachments WHERE revision_id IN ({OWNED_REVISIONS})"),
            [user_id],
        )
        .await?;
        tx.execute(
            "DELETE FROM revisions WHERE hive_id IN (SELECT id FROM hives WHERE owner_id = ?1)",
            [user_id],
        )
        .await?;
        tx.execute(
            "UPDATE hives SET origin_hive_id = NULL WHERE origin_hive_id IN (SELECT id FROM hives WHERE owner_id = ?1)",
            [user_id],
        )
        .await?;
        tx.execute("DELETE FROM hives WHERE owner_id = ?1", [user_id])
            .await?;
        tx.execute("DELETE FROM apiaries WHERE owner_id = ?1", [user_id])
            .await?;
        tx.execute("DELETE FROM creator_profiles WHERE user_id = ?1", [user_id])
            .await?;
        tx.execute("DELETE FROM user_permissions WHERE user_id = ?1", [user_id])
            .await?;
        tx.execute("DELETE FROM users WHERE id = ?1", [user_id])
            .await?;
        tx.commit().await?;

        tracing::info!(user_id, files = files.len(), "personal data deleted");
        Ok(files)
    }
}
