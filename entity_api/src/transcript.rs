//! CRUD operations for transcripts table.

use super::error::{EntityApiErrorKind, Error};
use entity::transcripts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates a new transcript record
pub async fn create(db: &DatabaseConnection, title: String, content: String) -> Result<Model, Error> {
    debug!("Creating new transcript: {title}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        title: Set(title),
        content: Set(content),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Returns every stored transcript, oldest first. Ties on `created_at` are
/// broken by id so repeated calls always see the same order.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Finds a transcript by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}
