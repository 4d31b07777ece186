//! Common repository traits
//!
//! Generic CRUD interfaces implemented by the repositories. Ids are `i64` rowids unless a
//! repository keys on a composite `(i64, i64)`.

/// Inserts a new row and returns it with its generated id
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Reads a single row by primary key, `Ok(None)` when absent
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Updates an existing row.
///
/// # Returns
/// * `Ok(Entity)` - the row after the update
/// * `Err(sqlx::Error::RowNotFound)` - nothing to update
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Deletes a row by primary key, `Ok(false)` when there was nothing to delete.
/// Dependent rows go through `ON DELETE CASCADE`.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<bool, sqlx::Error>;
}
