use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{CreatedDateRecord, DatePatch, NewDatePayload};

const SELECT_DATE: &str = r#"
    SELECT
        id,
        fecha,
        hora_inicio,
        hora_fin,
        lugar,
        ciudad,
        parent_id,
        organizer_id,
        nombre,
        flyer_url,
        estado_publicacion
    FROM event_dates
"#;

pub async fn insert_dates(
    db: &SqlitePool,
    payloads: &[NewDatePayload],
) -> Result<Vec<CreatedDateRecord>, AppError> {
    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(payloads.len());

    for payload in payloads {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO event_dates
                (id, parent_id, organizer_id, nombre, biografia, fecha, hora_inicio, hora_fin,
                lugar, direccion, ciudad, referencias, requisitos, ritmos, zonas, cronograma,
                costos, flyer_url, estado_publicacion, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)
            "#,
        )
        .bind(&id)
        .bind(&payload.parent_id)
        .bind(&payload.organizer_id)
        .bind(&payload.nombre)
        .bind(&payload.biografia)
        .bind(&payload.fecha)
        .bind(&payload.hora_inicio)
        .bind(&payload.hora_fin)
        .bind(&payload.lugar)
        .bind(&payload.direccion)
        .bind(&payload.ciudad)
        .bind(&payload.referencias)
        .bind(&payload.requisitos)
        .bind(serde_json::to_string(&payload.ritmos)?)
        .bind(serde_json::to_string(&payload.zonas)?)
        .bind(serde_json::to_string(&payload.cronograma)?)
        .bind(serde_json::to_string(&payload.costos)?)
        .bind(&payload.flyer_url)
        .bind(payload.estado_publicacion.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        ids.push(id);
    }

    let mut created = Vec::with_capacity(ids.len());
    for id in &ids {
        let record = sqlx::query_as::<_, CreatedDateRecord>(&format!("{} WHERE id = ?1", SELECT_DATE))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        created.push(record);
    }

    tx.commit().await?;
    Ok(created)
}

pub async fn find_date_by_id(db: &SqlitePool, id: &str) -> Result<Option<CreatedDateRecord>, sqlx::Error> {
    sqlx::query_as::<_, CreatedDateRecord>(&format!("{} WHERE id = ?1", SELECT_DATE))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn fetch_dates_by_parent(
    db: &SqlitePool,
    parent_id: &str,
) -> Result<Vec<CreatedDateRecord>, sqlx::Error> {
    sqlx::query_as::<_, CreatedDateRecord>(&format!(
        "{} WHERE parent_id = ?1 ORDER BY fecha ASC, hora_inicio ASC",
        SELECT_DATE
    ))
    .bind(parent_id)
    .fetch_all(db)
    .await
}

pub async fn fetch_dates_by_organizer(
    db: &SqlitePool,
    organizer_id: &str,
) -> Result<Vec<CreatedDateRecord>, sqlx::Error> {
    sqlx::query_as::<_, CreatedDateRecord>(&format!(
        "{} WHERE organizer_id = ?1 ORDER BY fecha ASC, hora_inicio ASC",
        SELECT_DATE
    ))
    .bind(organizer_id)
    .fetch_all(db)
    .await
}

pub async fn update_date(
    db: &SqlitePool,
    id: &str,
    patch: &DatePatch,
) -> Result<Option<CreatedDateRecord>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let found = sqlx::query_as::<_, CreatedDateRecord>(&format!("{} WHERE id = ?1", SELECT_DATE))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let mut current = match found {
        Some(record) => record,
        None => return Ok(None),
    };

    if let Some(fecha) = &patch.fecha {
        current.fecha = fecha.clone();
    }
    if let Some(hora_inicio) = &patch.hora_inicio {
        current.hora_inicio = Some(hora_inicio.clone());
    }
    if let Some(hora_fin) = &patch.hora_fin {
        current.hora_fin = Some(hora_fin.clone());
    }
    if let Some(flyer_url) = &patch.flyer_url {
        current.flyer_url = Some(flyer_url.clone());
    }
    if let Some(estado) = patch.estado_publicacion {
        current.estado_publicacion = estado.as_str().to_string();
    }
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE event_dates
        SET fecha = ?1,
            hora_inicio = ?2,
            hora_fin = ?3,
            flyer_url = ?4,
            estado_publicacion = ?5,
            updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&current.fecha)
    .bind(&current.hora_inicio)
    .bind(&current.hora_fin)
    .bind(&current.flyer_url)
    .bind(&current.estado_publicacion)
    .bind(&now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    tx.commit().await?;
    Ok(Some(current))
}

pub async fn delete_date(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM event_dates WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
