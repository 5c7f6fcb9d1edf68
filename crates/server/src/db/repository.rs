use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use ficha_core::{
    BloodType, BloodTypeStore, Gender, GenderStore, NewBloodType, NewGender, Patient,
    PatientStore, StoreError,
};
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;

/// Patient columns joined with their gender and blood type
const PATIENT_SELECT: &str = "SELECT p.id, p.number, p.name, p.national_id, p.email, \
     p.birth_date, p.active, g.id, g.name, g.code, b.id, b.name \
     FROM patients p \
     JOIN genders g ON g.id = p.gender_id \
     JOIN blood_types b ON b.id = p.blood_type_id";

/// PostgreSQL-backed store for patients, genders and blood types
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn client(&self) -> Result<Object, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Backend(format!("Database pool error: {}", e)))
    }

    async fn exists(&self, sql: &str, value: &str) -> Result<bool, StoreError> {
        let client = self.client().await?;
        let row = client.query_one(sql, &[&value]).await.map_err(db_error)?;
        Ok(row.get(0))
    }
}

/// Unique and foreign-key violations become conflicts, everything else is a
/// backend failure
fn db_error(err: tokio_postgres::Error) -> StoreError {
    match err.code() {
        Some(code)
            if *code == SqlState::UNIQUE_VIOLATION || *code == SqlState::FOREIGN_KEY_VIOLATION =>
        {
            let detail = err
                .as_db_error()
                .map(|db| db.message().to_string())
                .unwrap_or_else(|| err.to_string());
            StoreError::Conflict(detail)
        }
        _ => StoreError::Backend(format!("Database error: {}", err)),
    }
}

fn patient_from_row(row: &Row) -> Patient {
    Patient {
        id: Some(row.get(0)),
        number: row.get(1),
        name: row.get(2),
        national_id: row.get(3),
        email: row.get(4),
        birth_date: row.get(5),
        active: row.get(6),
        gender: Gender {
            id: row.get(7),
            name: row.get(8),
            code: row.get(9),
        },
        blood_type: BloodType {
            id: row.get(10),
            name: row.get(11),
        },
    }
}

#[async_trait]
impl PatientStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt(&format!("{} WHERE p.id = $1", PATIENT_SELECT), &[&id])
            .await
            .map_err(db_error)?;
        Ok(row.as_ref().map(patient_from_row))
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                &format!("{} WHERE p.id = $1 AND p.active", PATIENT_SELECT),
                &[&id],
            )
            .await
            .map_err(db_error)?;
        Ok(row.as_ref().map(patient_from_row))
    }

    async fn find_all_active(&self) -> Result<Vec<Patient>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query(
                &format!("{} WHERE p.active ORDER BY p.id", PATIENT_SELECT),
                &[],
            )
            .await
            .map_err(db_error)?;
        Ok(rows.iter().map(patient_from_row).collect())
    }

    async fn exists_by_number(&self, number: &str) -> Result<bool, StoreError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM patients WHERE number = $1)",
            number,
        )
        .await
    }

    async fn exists_by_national_id(&self, national_id: &str) -> Result<bool, StoreError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM patients WHERE national_id = $1)",
            national_id,
        )
        .await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM patients WHERE email = $1)",
            email,
        )
        .await
    }

    async fn save(&self, mut patient: Patient) -> Result<Patient, StoreError> {
        let client = self.client().await?;

        match patient.id {
            None => {
                let row = client
                    .query_one(
                        "INSERT INTO patients \
                         (number, name, national_id, email, birth_date, active, \
                          gender_id, blood_type_id) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
                        &[
                            &patient.number,
                            &patient.name,
                            &patient.national_id,
                            &patient.email,
                            &patient.birth_date,
                            &patient.active,
                            &patient.gender.id,
                            &patient.blood_type.id,
                        ],
                    )
                    .await
                    .map_err(db_error)?;
                patient.id = Some(row.get(0));
            }
            Some(id) => {
                let updated = client
                    .execute(
                        "UPDATE patients SET number = $2, name = $3, national_id = $4, email = $5, \
                         birth_date = $6, active = $7, gender_id = $8, blood_type_id = $9 \
                         WHERE id = $1",
                        &[
                            &id,
                            &patient.number,
                            &patient.name,
                            &patient.national_id,
                            &patient.email,
                            &patient.birth_date,
                            &patient.active,
                            &patient.gender.id,
                            &patient.blood_type.id,
                        ],
                    )
                    .await
                    .map_err(db_error)?;
                if updated == 0 {
                    return Err(StoreError::Backend(format!("no patient row with id {}", id)));
                }
            }
        }

        Ok(patient)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client.query_one("SELECT 1", &[]).await.map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl GenderStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Gender>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt("SELECT id, name, code FROM genders WHERE id = $1", &[&id])
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| Gender {
            id: r.get(0),
            name: r.get(1),
            code: r.get(2),
        }))
    }

    async fn find_all(&self) -> Result<Vec<Gender>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query("SELECT id, name, code FROM genders ORDER BY id", &[])
            .await
            .map_err(db_error)?;
        Ok(rows
            .iter()
            .map(|r| Gender {
                id: r.get(0),
                name: r.get(1),
                code: r.get(2),
            })
            .collect())
    }

    async fn save(&self, gender: NewGender) -> Result<Gender, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO genders (name, code) VALUES ($1, $2) RETURNING id",
                &[&gender.name, &gender.code],
            )
            .await
            .map_err(db_error)?;
        Ok(Gender {
            id: row.get(0),
            name: gender.name,
            code: gender.code,
        })
    }
}

#[async_trait]
impl BloodTypeStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<BloodType>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt("SELECT id, name FROM blood_types WHERE id = $1", &[&id])
            .await
            .map_err(db_error)?;
        Ok(row.map(|r| BloodType {
            id: r.get(0),
            name: r.get(1),
        }))
    }

    async fn find_all(&self) -> Result<Vec<BloodType>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query("SELECT id, name FROM blood_types ORDER BY id", &[])
            .await
            .map_err(db_error)?;
        Ok(rows
            .iter()
            .map(|r| BloodType {
                id: r.get(0),
                name: r.get(1),
            })
            .collect())
    }

    async fn save(&self, blood_type: NewBloodType) -> Result<BloodType, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO blood_types (name) VALUES ($1) RETURNING id",
                &[&blood_type.name],
            )
            .await
            .map_err(db_error)?;
        Ok(BloodType {
            id: row.get(0),
            name: blood_type.name,
        })
    }
}
