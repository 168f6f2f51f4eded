//! Revision attachment repository. Rows hold the stored path only; the web
//! layer owns the bytes.

use colmeia_core::entities::RevisionAttachment;
use colmeia_core::ids::PREFIX_ATTACHMENT;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::repos::REQUIRED;
use crate::scope::Conditions;
use crate::service::ColmeiaService;

const SELECT_COLS: &str = "a.id, a.revision_id, a.file";
const FROM_JOINED: &str =
    "FROM revision_attachments a JOIN revisions r ON r.id = a.revision_id JOIN hives h ON h.id = r.hive_id";

fn row_to_attachment(row: &libsql::Row) -> Result<RevisionAttachment, DatabaseError> {
    Ok(RevisionAttachment {
        id: row.get(0)?,
        revision_id: row.get(1)?,
        file: row.get(2)?,
    })
}

impl ColmeiaService {
    /// Attach a stored file to a revision visible to `owner`.
    pub async fn create_attachment(
        &self,
        revision_id: &str,
        owner: Option<&str>,
        file: &str,
    ) -> Result<RevisionAttachment, DatabaseError> {
        if file.trim().is_empty() {
            return Err(ValidationErrors::single("file", REQUIRED).into());
        }
        let revision = match self.get_revision(revision_id, owner).await {
            Ok(revision) => revision,
            Err(DatabaseError::NoResult) => {
                return Err(
                    ValidationErrors::single("revision", "Selecione uma opção válida.").into(),
                );
            }
            Err(e) => return Err(e),
        };

        let id = self.db().generate_id(PREFIX_ATTACHMENT).await?;
        let attachment = RevisionAttachment {
            id,
            revision_id: revision.id,
            file: file.to_string(),
        };
        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO revision_attachments (id, revision_id, file) VALUES (?1, ?2, ?3)",
            libsql::params![
                attachment.id.as_str(),
                attachment.revision_id.as_str(),
                attachment.file.as_str()
            ],
        )
        .await?;
        tx.commit().await?;
        tracing::debug!(attachment_id = %attachment.id, revision_id = %attachment.revision_id, "attachment stored");
        Ok(attachment)
    }

    pub async fn get_attachment(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<RevisionAttachment, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.eq("a.id", id).owner("h.owner_id", owner);
        let sql = format!("SELECT {SELECT_COLS} {FROM_JOINED} {}", conditions.where_sql());
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_attachment(&row)
    }

    /// Attachments visible to `owner`, optionally for one revision, in upload order.
    pub async fn list_attachments(
        &self,
        owner: Option<&str>,
        revision_id: Option<&str>,
    ) -> Result<Vec<RevisionAttachment>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        if let Some(revision_id) = revision_id {
            conditions.eq("a.revision_id", revision_id);
        }
        let sql = format!(
            "SELECT {SELECT_COLS} {FROM_JOINED} {} ORDER BY a.rowid",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next().await? {
            attachments.push(row_to_attachment(&row)?);
        }
        Ok(attachments)
    }

    /// Remove the row and hand back the stored path for file cleanup.
    pub async fn delete_attachment(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<String, DatabaseError> {
        let attachment = self.get_attachment(id, owner).await?;
        let tx = self.db().begin().await?;
        tx.execute(
            "DELETE FROM revision_attachments WHERE id = ?1",
            [attachment.id.as_str()],
        )
        .await?;
        tx.commit().await?;
        Ok(attachment.file)
    }
}
