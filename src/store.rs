use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::metrics::QUERY_LATENCY;
use crate::models::{Employee, EmployeeCreate, EmployeeUpdate, SearchFilter, StatusFilter};

const COLUMNS: &str =
    "id, first_name, last_name, contact_info, department, position, location, status";

/// Employee table over a SQLite pool.
#[derive(Clone)]
pub struct EmployeeStore {
    pool: SqlitePool,
}

impl EmployeeStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> ApiResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    // Single long-lived connection; every new sqlite::memory: connection is a fresh database
    pub async fn in_memory() -> ApiResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the table and its lookup indexes if missing.
    pub async fn init(&self) -> ApiResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                contact_info TEXT NOT NULL,
                department TEXT NOT NULL,
                position TEXT NOT NULL,
                location TEXT NOT NULL,
                status INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        for column in [
            "first_name",
            "last_name",
            "department",
            "position",
            "location",
            "status",
        ] {
            let ddl = format!(
                "CREATE INDEX IF NOT EXISTS ix_employees_{column} ON employees ({column})"
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }

        Ok(())
    }

    pub async fn create(&self, new: &EmployeeCreate) -> ApiResult<Employee> {
        let start = Instant::now();
        let sql = format!(
            "INSERT INTO employees (first_name, last_name, contact_info, department, position, location, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.contact_info)
            .bind(&new.department)
            .bind(&new.position)
            .bind(&new.location)
            .bind(new.status)
            .fetch_one(&self.pool)
            .await?;

        QUERY_LATENCY.observe(start.elapsed().as_secs_f64());
        Ok(employee)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Employee> {
        let start = Instant::now();
        let sql = format!("SELECT {COLUMNS} FROM employees WHERE id = ?");

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        QUERY_LATENCY.observe(start.elapsed().as_secs_f64());
        employee.ok_or(ApiError::NotFound)
    }

    pub async fn update(&self, id: i64, changes: EmployeeUpdate) -> ApiResult<Employee> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM employees WHERE id = ?");
        let mut employee = sqlx::query_as::<_, Employee>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ApiError::NotFound)?;

        changes.apply(&mut employee);

        sqlx::query(
            "UPDATE employees SET first_name = ?, last_name = ?, contact_info = ?, \
             department = ?, position = ?, location = ?, status = ? WHERE id = ?",
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.contact_info)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(&employee.location)
        .bind(employee.status)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        QUERY_LATENCY.observe(start.elapsed().as_secs_f64());
        Ok(employee)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let start = Instant::now();
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        QUERY_LATENCY.observe(start.elapsed().as_secs_f64());

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    pub async fn search(&self, filter: &SearchFilter) -> ApiResult<Vec<Employee>> {
        let start = Instant::now();

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM employees WHERE 1 = 1"));

        if let StatusFilter::AnyOf(values) = &filter.status {
            qb.push(" AND status IN (");
            let mut list = qb.separated(", ");
            for value in values {
                list.push_bind(*value);
            }
            list.push_unseparated(")");
        }

        // sqlite LIKE is case-insensitive for ASCII
        if let Some(name) = &filter.name {
            let pattern = format!("%{}%", escape_like(name));
            qb.push(" AND (first_name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR last_name LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(department) = &filter.department {
            qb.push(" AND department = ").push_bind(department.clone());
        }
        if let Some(position) = &filter.position {
            qb.push(" AND position = ").push_bind(position.clone());
        }
        if let Some(location) = &filter.location {
            qb.push(" AND location = ").push_bind(location.clone());
        }

        qb.push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let employees = qb
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await?;

        QUERY_LATENCY.observe(start.elapsed().as_secs_f64());
        Ok(employees)
    }
}

// Match user input literally inside a LIKE pattern
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
