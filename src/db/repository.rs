//! Database repository for record CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{DeleteOutcome, RecordFields, RecordFilter, StoredRecord, UpsertOutcome};

const RECORD_COLUMNS: &str = "id, nombre_super_heroe, nombre_real, edad, planeta_origen, \
     debilidad, poderes, aliados, enemigos, area, autor, created_at";

/// Text attributes that may be searched by name.
const SEARCHABLE_ATTRIBUTES: [&str; 7] = [
    "nombreSuperHeroe",
    "nombreReal",
    "planetaOrigen",
    "debilidad",
    "poderes",
    "aliados",
    "enemigos",
];

/// Validate and normalize a record identifier.
///
/// Malformed identifiers are a validation error, never a not-found.
pub fn parse_record_id(id: &str) -> Result<String, AppError> {
    uuid::Uuid::parse_str(id.trim())
        .map(|uuid| uuid.to_string())
        .map_err(|_| AppError::invalid("id", format!("Invalid record id: {}", id.trim())))
}

impl RecordFilter {
    fn clause(&self) -> Option<(&'static str, &str)> {
        match self {
            RecordFilter::All => None,
            RecordFilter::Author(tag) => Some(("autor = ?", tag.as_str())),
            RecordFilter::ExcludeAuthor(tag) => Some(("autor <> ?", tag.as_str())),
        }
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List records visible through `filter`, oldest first.
    pub async fn find_all(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, AppError> {
        let sql = match filter.clause() {
            Some((clause, _)) => format!(
                "SELECT {} FROM records WHERE {} ORDER BY created_at, nombre_super_heroe",
                RECORD_COLUMNS, clause
            ),
            None => format!(
                "SELECT {} FROM records ORDER BY created_at, nombre_super_heroe",
                RECORD_COLUMNS
            ),
        };

        let mut query = sqlx::query(&sql);
        if let Some((_, tag)) = filter.clause() {
            query = query.bind(tag);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Get a record by ID, whatever its author.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<StoredRecord>, AppError> {
        self.find_one(id, &RecordFilter::All).await
    }

    /// Get a record by ID only if it carries the given author tag.
    pub async fn find_by_id_and_author(
        &self,
        id: &str,
        tag: &str,
    ) -> Result<Option<StoredRecord>, AppError> {
        self.find_one(id, &RecordFilter::Author(tag.to_string())).await
    }

    /// Get a record by ID if it is visible through `filter`.
    pub async fn find_one(
        &self,
        id: &str,
        filter: &RecordFilter,
    ) -> Result<Option<StoredRecord>, AppError> {
        let id = parse_record_id(id)?;
        let sql = match filter.clause() {
            Some((clause, _)) => format!(
                "SELECT {} FROM records WHERE id = ? AND {}",
                RECORD_COLUMNS, clause
            ),
            None => format!("SELECT {} FROM records WHERE id = ?", RECORD_COLUMNS),
        };

        let mut query = sqlx::query(&sql).bind(&id);
        if let Some((_, tag)) = filter.clause() {
            query = query.bind(tag);
        }
        let row = query.fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(record_from_row))
    }

    /// Case-insensitive substring search on one text attribute.
    ///
    /// List attributes match on any single element. Case folding is Unicode
    /// aware, so "ángel" finds "Ángel".
    pub async fn find_by_attribute(
        &self,
        attribute: &str,
        value: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredRecord>, AppError> {
        if !SEARCHABLE_ATTRIBUTES.contains(&attribute) {
            return Err(AppError::invalid(
                "atributo",
                format!("Unknown attribute: {}", attribute),
            ));
        }

        let needle = value.trim().to_lowercase();
        let records = self.find_all(filter).await?;

        Ok(records
            .into_iter()
            .filter(|record| {
                attribute_values(record, attribute)
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Records older than 30 from planet "Tierra" with at least two powers.
    pub async fn find_veterans(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredRecord>, AppError> {
        let mut sql = format!(
            "SELECT {} FROM records \
             WHERE edad > 30 AND planeta_origen = 'Tierra' AND json_array_length(poderes) >= 2",
            RECORD_COLUMNS
        );
        if let Some((clause, _)) = filter.clause() {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        sql.push_str(" ORDER BY created_at, nombre_super_heroe");

        let mut query = sqlx::query(&sql);
        if let Some((_, tag)) = filter.clause() {
            query = query.bind(tag);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Insert a batch of records in one transaction.
    pub async fn insert_many(
        &self,
        records: &[RecordFields],
    ) -> Result<Vec<StoredRecord>, AppError> {
        for fields in records {
            fields.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(records.len());
        for fields in records {
            let record = fields.clone().into_new_record();
            insert_record(&mut tx, &record).await?;
            inserted.push(record);
        }
        tx.commit().await?;

        Ok(inserted)
    }

    /// Replace every record carrying `tag` with a fresh batch, atomically.
    ///
    /// Returns the number of removed records and the inserted ones.
    pub async fn replace_by_author(
        &self,
        tag: &str,
        records: &[RecordFields],
    ) -> Result<(u64, Vec<StoredRecord>), AppError> {
        for fields in records {
            fields.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM records WHERE autor = ?")
            .bind(tag)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = Vec::with_capacity(records.len());
        for fields in records {
            let record = fields.clone().into_new_record();
            insert_record(&mut tx, &record).await?;
            inserted.push(record);
        }
        tx.commit().await?;

        Ok((removed, inserted))
    }

    /// Insert a new record, or replace the mapped fields of an existing one.
    pub async fn upsert(
        &self,
        id: Option<&str>,
        fields: &RecordFields,
    ) -> Result<UpsertOutcome, AppError> {
        self.upsert_matching(id, fields, &RecordFilter::All).await
    }

    /// Like [`Repository::upsert`], but an update only touches a record
    /// visible through `filter`. Identity, author and creation time are kept.
    pub async fn upsert_matching(
        &self,
        id: Option<&str>,
        fields: &RecordFields,
        filter: &RecordFilter,
    ) -> Result<UpsertOutcome, AppError> {
        let id = id.map(parse_record_id).transpose()?;
        fields.validate()?;

        let Some(id) = id else {
            let record = fields.clone().into_new_record();
            let mut conn = self.pool.acquire().await?;
            insert_record(&mut conn, &record).await?;
            tracing::debug!(id = %record.id, "Created record");
            return Ok(UpsertOutcome::Created(record));
        };

        let mut sql = String::from(
            "UPDATE records SET nombre_super_heroe = ?, nombre_real = ?, edad = ?, \
             planeta_origen = ?, debilidad = ?, poderes = ?, aliados = ?, enemigos = ?, area = ? \
             WHERE id = ?",
        );
        if let Some((clause, _)) = filter.clause() {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        sql.push_str(" RETURNING ");
        sql.push_str(RECORD_COLUMNS);

        let poderes = to_json_array(&fields.poderes);
        let aliados = to_json_array(&fields.aliados);
        let enemigos = to_json_array(&fields.enemigos);

        let mut query = sqlx::query(&sql)
            .bind(&fields.nombre_super_heroe)
            .bind(&fields.nombre_real)
            .bind(fields.edad)
            .bind(&fields.planeta_origen)
            .bind(&fields.debilidad)
            .bind(&poderes)
            .bind(&aliados)
            .bind(&enemigos)
            .bind(fields.area)
            .bind(&id);
        if let Some((_, tag)) = filter.clause() {
            query = query.bind(tag);
        }

        match query.fetch_optional(&self.pool).await? {
            Some(row) => {
                tracing::debug!(%id, "Updated record");
                Ok(UpsertOutcome::Updated(record_from_row(&row)))
            }
            None => Ok(UpsertOutcome::NotFound),
        }
    }

    /// Delete a record by ID. With a tag, the author must match too.
    pub async fn delete_by_id(
        &self,
        id: &str,
        tag: Option<&str>,
    ) -> Result<DeleteOutcome, AppError> {
        let filter = match tag {
            Some(tag) => RecordFilter::Author(tag.to_string()),
            None => RecordFilter::All,
        };
        self.delete_matching(id, &filter).await
    }

    /// Delete a record by ID if it is visible through `filter`.
    pub async fn delete_matching(
        &self,
        id: &str,
        filter: &RecordFilter,
    ) -> Result<DeleteOutcome, AppError> {
        let id = parse_record_id(id)?;

        let mut sql = String::from("DELETE FROM records WHERE id = ?");
        if let Some((clause, _)) = filter.clause() {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
        sql.push_str(" RETURNING ");
        sql.push_str(RECORD_COLUMNS);

        let mut query = sqlx::query(&sql).bind(&id);
        if let Some((_, tag)) = filter.clause() {
            query = query.bind(tag);
        }

        match query.fetch_optional(&self.pool).await? {
            Some(row) => {
                tracing::debug!(%id, "Deleted record");
                Ok(DeleteOutcome::Deleted(record_from_row(&row)))
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

async fn insert_record(
    conn: &mut SqliteConnection,
    record: &StoredRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO records (
            id, nombre_super_heroe, nombre_real, edad, planeta_origen, debilidad,
            poderes, aliados, enemigos, area, autor, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&record.id)
    .bind(&record.nombre_super_heroe)
    .bind(&record.nombre_real)
    .bind(record.edad)
    .bind(&record.planeta_origen)
    .bind(&record.debilidad)
    .bind(to_json_array(&record.poderes))
    .bind(to_json_array(&record.aliados))
    .bind(to_json_array(&record.enemigos))
    .bind(record.area)
    .bind(&record.autor)
    .bind(&record.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

// Helper functions for row conversion

fn record_from_row(row: &SqliteRow) -> StoredRecord {
    let poderes: String = row.get("poderes");
    let aliados: String = row.get("aliados");
    let enemigos: String = row.get("enemigos");
    StoredRecord {
        id: row.get("id"),
        nombre_super_heroe: row.get("nombre_super_heroe"),
        nombre_real: row.get("nombre_real"),
        edad: row.get("edad"),
        planeta_origen: row.get("planeta_origen"),
        debilidad: row.get("debilidad"),
        poderes: parse_json_array(&poderes),
        aliados: parse_json_array(&aliados),
        enemigos: parse_json_array(&enemigos),
        area: row.get("area"),
        autor: row.get("autor"),
        created_at: row.get("created_at"),
    }
}

pub(crate) fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn to_json_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Values of a searchable attribute; list attributes yield one per element.
fn attribute_values<'a>(record: &'a StoredRecord, attribute: &str) -> Vec<&'a str> {
    match attribute {
        "nombreSuperHeroe" => vec![record.nombre_super_heroe.as_str()],
        "nombreReal" => vec![record.nombre_real.as_str()],
        "planetaOrigen" => vec![record.planeta_origen.as_str()],
        "debilidad" => vec![record.debilidad.as_str()],
        "poderes" => record.poderes.iter().map(String::as_str).collect(),
        "aliados" => record.aliados.iter().map(String::as_str).collect(),
        "enemigos" => record.enemigos.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_repository as repo;

    const COUNTRY_TAG: &str = "ISABENSA";

    fn hero(name: &str) -> RecordFields {
        RecordFields {
            nombre_super_heroe: name.to_string(),
            nombre_real: "Nombre Real".to_string(),
            edad: 35.0,
            planeta_origen: "Tierra".to_string(),
            debilidad: "Kryptonita".to_string(),
            poderes: vec!["Volar".to_string(), "Fuerza".to_string()],
            aliados: vec![],
            enemigos: vec![],
            area: None,
            autor: "Isabel".to_string(),
        }
    }

    fn country(name: &str) -> RecordFields {
        RecordFields {
            nombre_super_heroe: name.to_string(),
            nombre_real: "Capital".to_string(),
            poderes: vec!["Población: 10".to_string(), "Área: 20 km²".to_string()],
            area: Some(20.0),
            autor: COUNTRY_TAG.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_without_id_creates() {
        let (repo, _dir) = repo().await;

        let first = repo.upsert(None, &hero("Superman")).await.unwrap();
        let second = repo.upsert(None, &hero("Superman")).await.unwrap();

        let (UpsertOutcome::Created(a), UpsertOutcome::Created(b)) = (first, second) else {
            panic!("expected two created records");
        };
        assert_ne!(a.id, b.id);
        assert_eq!(repo.find_by_id(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_upsert_with_unknown_id_is_not_found() {
        let (repo, _dir) = repo().await;
        let missing = uuid::Uuid::new_v4().to_string();

        let outcome = repo.upsert(Some(&missing), &hero("Batman")).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::NotFound);
        assert!(repo.find_all(&RecordFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_replaces_fields_and_keeps_identity() {
        let (repo, _dir) = repo().await;
        let UpsertOutcome::Created(created) = repo.upsert(None, &hero("Flash")).await.unwrap()
        else {
            panic!("expected created");
        };

        let mut changes = hero("The Flash");
        changes.poderes = vec!["Velocidad".to_string()];
        changes.autor = "someone-else".to_string();
        let outcome = repo.upsert(Some(&created.id), &changes).await.unwrap();

        let UpsertOutcome::Updated(updated) = outcome else {
            panic!("expected updated");
        };
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.autor, "Isabel");
        assert_eq!(updated.nombre_super_heroe, "The Flash");
        assert_eq!(updated.poderes, vec!["Velocidad"]);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_shape() {
        let (repo, _dir) = repo().await;
        let mut fields = hero("Robin");
        fields.nombre_real = "  ".to_string();

        let err = repo.upsert(None, &fields).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_scoped_upsert_does_not_cross_domains() {
        let (repo, _dir) = repo().await;
        let UpsertOutcome::Created(hero) = repo.upsert(None, &hero("Aquaman")).await.unwrap()
        else {
            panic!("expected created");
        };

        let outcome = repo
            .upsert_matching(
                Some(&hero.id),
                &country("Chile"),
                &RecordFilter::Author(COUNTRY_TAG.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::NotFound);
        let unchanged = repo.find_by_id(&hero.id).await.unwrap().unwrap();
        assert_eq!(unchanged.nombre_super_heroe, "Aquaman");
    }

    #[tokio::test]
    async fn test_delete_with_mismatched_tag_keeps_record() {
        let (repo, _dir) = repo().await;
        let UpsertOutcome::Created(hero) = repo.upsert(None, &hero("Wonder Woman")).await.unwrap()
        else {
            panic!("expected created");
        };

        let outcome = repo.delete_by_id(&hero.id, Some(COUNTRY_TAG)).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert!(repo.find_by_id(&hero.id).await.unwrap().is_some());

        let outcome = repo.delete_by_id(&hero.id, Some("Isabel")).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(hero.clone()));
        assert!(repo.find_by_id(&hero.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_but_malformed_id_is_invalid() {
        let (repo, _dir) = repo().await;

        let missing = uuid::Uuid::new_v4().to_string();
        assert_eq!(repo.find_by_id(&missing).await.unwrap(), None);
        assert_eq!(
            repo.delete_by_id(&missing, None).await.unwrap(),
            DeleteOutcome::NotFound
        );

        for bad in ["", "123", "64b7f0c2e1a2b3c4d5e6f7a8"] {
            assert!(matches!(
                repo.find_by_id(bad).await,
                Err(AppError::Validation(_))
            ));
            assert!(matches!(
                repo.delete_by_id(bad, Some(COUNTRY_TAG)).await,
                Err(AppError::Validation(_))
            ));
            assert!(matches!(
                repo.upsert(Some(bad), &hero("X-Man")).await,
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_find_all_filters_by_author() {
        let (repo, _dir) = repo().await;
        repo.insert_many(&[hero("Hulk"), country("Perú"), country("Chile")])
            .await
            .unwrap();

        let all = repo.find_all(&RecordFilter::All).await.unwrap();
        let countries = repo
            .find_all(&RecordFilter::Author(COUNTRY_TAG.to_string()))
            .await
            .unwrap();
        let heroes = repo
            .find_all(&RecordFilter::ExcludeAuthor(COUNTRY_TAG.to_string()))
            .await
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(countries.len(), 2);
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].nombre_super_heroe, "Hulk");
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let (repo, _dir) = repo().await;
        let mut broken = country("Broken");
        broken.autor = String::new();

        let result = repo.insert_many(&[country("Perú"), broken]).await;

        assert!(result.is_err());
        assert!(repo.find_all(&RecordFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_by_author_only_touches_tag() {
        let (repo, _dir) = repo().await;
        repo.insert_many(&[hero("Hulk"), country("Perú"), country("Chile")])
            .await
            .unwrap();

        let (removed, inserted) = repo
            .replace_by_author(COUNTRY_TAG, &[country("Uruguay")])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(inserted.len(), 1);
        let all = repo.find_all(&RecordFilter::All).await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.nombre_super_heroe.as_str()).collect();
        assert!(names.contains(&"Hulk"));
        assert!(names.contains(&"Uruguay"));
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_attribute() {
        let (repo, _dir) = repo().await;
        let mut batman = hero("Batman");
        batman.poderes = vec!["Inteligencia".to_string(), "Artes marciales".to_string()];
        repo.insert_many(&[hero("Superman"), batman, country("Perú")])
            .await
            .unwrap();
        let heroes = RecordFilter::ExcludeAuthor(COUNTRY_TAG.to_string());

        let found = repo
            .find_by_attribute("nombreSuperHeroe", "bat", &heroes)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nombre_super_heroe, "Batman");

        let found = repo
            .find_by_attribute("poderes", "MARCIALES", &heroes)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let found = repo
            .find_by_attribute("nombreSuperHeroe", "%", &heroes)
            .await
            .unwrap();
        assert!(found.is_empty());

        assert!(matches!(
            repo.find_by_attribute("autor", "x", &heroes).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_attribute_folds_accented_capitals() {
        let (repo, _dir) = repo().await;
        repo.insert_many(&[hero("Ángel Oscuro"), hero("Superman")])
            .await
            .unwrap();
        let heroes = RecordFilter::ExcludeAuthor(COUNTRY_TAG.to_string());

        for value in ["ángel", "ÁNGEL", "OSCURO"] {
            let found = repo
                .find_by_attribute("nombreSuperHeroe", value, &heroes)
                .await
                .unwrap();
            assert_eq!(found.len(), 1, "{}", value);
            assert_eq!(found[0].nombre_super_heroe, "Ángel Oscuro");
        }
    }

    #[tokio::test]
    async fn test_find_by_attribute_matches_list_elements_only() {
        let (repo, _dir) = repo().await;
        repo.insert_many(&[hero("Superman")]).await.unwrap();
        let heroes = RecordFilter::ExcludeAuthor(COUNTRY_TAG.to_string());

        for value in ["\",\"", "\"", "[", "Volar\",\"Fuerza"] {
            let found = repo
                .find_by_attribute("poderes", value, &heroes)
                .await
                .unwrap();
            assert!(found.is_empty(), "{}", value);
        }

        let found = repo
            .find_by_attribute("poderes", "fuer", &heroes)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_find_veterans() {
        let (repo, _dir) = repo().await;
        let mut young = hero("Kid Flash");
        young.edad = 18.0;
        let mut alien = hero("Martian Manhunter");
        alien.planeta_origen = "Marte".to_string();
        let mut single_power = hero("Hawkeye");
        single_power.poderes = vec!["Punteria".to_string()];
        repo.insert_many(&[hero("Superman"), young, alien, single_power])
            .await
            .unwrap();

        let veterans = repo
            .find_veterans(&RecordFilter::ExcludeAuthor(COUNTRY_TAG.to_string()))
            .await
            .unwrap();

        assert_eq!(veterans.len(), 1);
        assert_eq!(veterans[0].nombre_super_heroe, "Superman");
    }
}
