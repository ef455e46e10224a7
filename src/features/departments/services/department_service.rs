use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::departments::models::{
    CreateDepartment, Department, DepartmentWithAreas, ServiceArea,
};

/// The department directory. Administrators are the single writer; the
/// routing engine only ever reads, always in stored insertion order.
pub struct DepartmentService {
    pool: PgPool,
}

impl DepartmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &CreateDepartment) -> Result<DepartmentWithAreas> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, categories)
            VALUES ($1, $2)
            RETURNING id, name, categories, position, created_at, updated_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.categories)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create department: {:?}", e);
            AppError::Database(e)
        })?;

        let mut areas = Vec::with_capacity(data.areas.len());
        for area in &data.areas {
            let created = sqlx::query_as::<_, ServiceArea>(
                r#"
                INSERT INTO department_service_areas
                    (department_id, center_lat, center_lon, radius_meters)
                VALUES ($1, $2, $3, $4)
                RETURNING id, department_id, center_lat, center_lon, radius_meters, position
                "#,
            )
            .bind(department.id)
            .bind(area.center_lat)
            .bind(area.center_lon)
            .bind(area.radius_meters)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create service area: {:?}", e);
                AppError::Database(e)
            })?;
            areas.push(created);
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit department creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created department: {} ({}) with {} service areas",
            department.name,
            department.id,
            areas.len()
        );

        Ok(DepartmentWithAreas { department, areas })
    }

    /// Replace a department's categories and service areas. The department
    /// keeps its directory position; only its jurisdiction changes.
    pub async fn update(&self, id: Uuid, data: &CreateDepartment) -> Result<DepartmentWithAreas> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let department = sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET name = $2, categories = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, categories, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.categories)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update department: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))?;

        sqlx::query("DELETE FROM department_service_areas WHERE department_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear service areas: {:?}", e);
                AppError::Database(e)
            })?;

        let mut areas = Vec::with_capacity(data.areas.len());
        for area in &data.areas {
            let created = sqlx::query_as::<_, ServiceArea>(
                r#"
                INSERT INTO department_service_areas
                    (department_id, center_lat, center_lon, radius_meters)
                VALUES ($1, $2, $3, $4)
                RETURNING id, department_id, center_lat, center_lon, radius_meters, position
                "#,
            )
            .bind(id)
            .bind(area.center_lat)
            .bind(area.center_lon)
            .bind(area.radius_meters)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create service area: {:?}", e);
                AppError::Database(e)
            })?;
            areas.push(created);
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit department update: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DepartmentWithAreas { department, areas })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<DepartmentWithAreas> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, categories, position, created_at, updated_at
            FROM departments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get department: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))?;

        let areas = self.areas_for(&[department.id]).await?;
        let areas = areas.into_values().next().unwrap_or_default();

        Ok(DepartmentWithAreas { department, areas })
    }

    /// List all departments with their service areas, in directory order
    pub async fn list(&self) -> Result<Vec<DepartmentWithAreas>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, categories, position, created_at, updated_at
            FROM departments
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list departments: {:?}", e);
            AppError::Database(e)
        })?;

        self.attach_areas(departments).await
    }

    /// List the routing candidates for a category, in directory order.
    /// The ordering here is the tie-break for routing and must stay stable.
    pub async fn list_for_category(&self, category: &str) -> Result<Vec<DepartmentWithAreas>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, categories, position, created_at, updated_at
            FROM departments
            WHERE $1 = ANY(categories)
            ORDER BY position
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list departments for category: {:?}", e);
            AppError::Database(e)
        })?;

        self.attach_areas(departments).await
    }

    async fn attach_areas(
        &self,
        departments: Vec<Department>,
    ) -> Result<Vec<DepartmentWithAreas>> {
        let ids: Vec<Uuid> = departments.iter().map(|d| d.id).collect();
        let mut by_department = self.areas_for(&ids).await?;

        Ok(departments
            .into_iter()
            .map(|department| {
                let areas = by_department.remove(&department.id).unwrap_or_default();
                DepartmentWithAreas { department, areas }
            })
            .collect())
    }

    async fn areas_for(&self, department_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ServiceArea>>> {
        if department_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let areas = sqlx::query_as::<_, ServiceArea>(
            r#"
            SELECT id, department_id, center_lat, center_lon, radius_meters, position
            FROM department_service_areas
            WHERE department_id = ANY($1)
            ORDER BY department_id, position
            "#,
        )
        .bind(department_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch service areas: {:?}", e);
            AppError::Database(e)
        })?;

        let mut by_department: HashMap<Uuid, Vec<ServiceArea>> = HashMap::new();
        for area in areas {
            by_department.entry(area.department_id).or_default().push(area);
        }

        Ok(by_department)
    }
}
