use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::models::{Address, AddressFields, Contact, ContactFields, User};
use crate::database::store::{NewUser, Store, UserChanges};
use crate::filter::types::SqlResult;
use crate::filter::Predicate;
use crate::paging::Window;

/// `Store` backed by Postgres through sqlx
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn log_sql(sql: &SqlResult) {
        if crate::config::config().database.enable_query_logging {
            tracing::debug!(query = %sql.query, params = ?sql.params, "contact search");
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, name, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_insert)
    }

    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = COALESCE($2, name), password = COALESCE($3, password), updated_at = now()
             WHERE username = $1
             RETURNING *",
        )
        .bind(username)
        .bind(changes.name)
        .bind(changes.password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET token = $2, updated_at = now() WHERE username = $1 RETURNING *",
        )
        .bind(username)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_contact(&self, owner: &str, fields: &ContactFields) -> Result<Contact, DatabaseError> {
        let contact = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (username, first_name, last_name, email, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(owner)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn find_contact(&self, owner: &str, id: i64) -> Result<Option<Contact>, DatabaseError> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn update_contact(&self, owner: &str, id: i64, fields: &ContactFields) -> Result<Option<Contact>, DatabaseError> {
        let contact = sqlx::query_as::<_, Contact>(
            "UPDATE contacts
             SET first_name = $3, last_name = $4, email = $5, phone = $6, updated_at = now()
             WHERE id = $1 AND username = $2
             RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    async fn delete_contact(&self, owner: &str, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_contacts(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        let sql = predicate.to_count_sql();
        Self::log_sql(&sql);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn list_contacts(&self, predicate: &Predicate, window: &Window) -> Result<Vec<Contact>, DatabaseError> {
        let sql = predicate.to_select_sql(window);
        Self::log_sql(&sql);
        let mut q = sqlx::query_as::<_, Contact>(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_address(
        &self,
        owner: &str,
        contact_id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError> {
        let address = sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (contact_id, street, city, province, country, postal_code)
             SELECT c.id, $3, $4, $5, $6, $7 FROM contacts c
             WHERE c.id = $1 AND c.username = $2
             RETURNING *",
        )
        .bind(contact_id)
        .bind(owner)
        .bind(&fields.street)
        .bind(&fields.city)
        .bind(&fields.province)
        .bind(&fields.country)
        .bind(&fields.postal_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn find_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<Option<Address>, DatabaseError> {
        let address = sqlx::query_as::<_, Address>(
            "SELECT a.* FROM addresses a
             JOIN contacts c ON c.id = a.contact_id
             WHERE a.id = $1 AND a.contact_id = $2 AND c.username = $3",
        )
        .bind(id)
        .bind(contact_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn update_address(
        &self,
        owner: &str,
        contact_id: i64,
        id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError> {
        let address = sqlx::query_as::<_, Address>(
            "UPDATE addresses a
             SET street = $4, city = $5, province = $6, country = $7, postal_code = $8, updated_at = now()
             FROM contacts c
             WHERE a.id = $1 AND a.contact_id = $2 AND c.id = a.contact_id AND c.username = $3
             RETURNING a.*",
        )
        .bind(id)
        .bind(contact_id)
        .bind(owner)
        .bind(&fields.street)
        .bind(&fields.city)
        .bind(&fields.province)
        .bind(&fields.country)
        .bind(&fields.postal_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn delete_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM addresses a
             USING contacts c
             WHERE a.id = $1 AND a.contact_id = $2 AND c.id = a.contact_id AND c.username = $3",
        )
        .bind(id)
        .bind(contact_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_addresses(&self, owner: &str, contact_id: i64) -> Result<Vec<Address>, DatabaseError> {
        let rows = sqlx::query_as::<_, Address>(
            "SELECT a.* FROM addresses a
             JOIN contacts c ON c.id = a.contact_id
             WHERE a.contact_id = $1 AND c.username = $2
             ORDER BY a.id ASC",
        )
        .bind(contact_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
