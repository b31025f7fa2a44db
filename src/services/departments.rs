//! Departments service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        department::{CreateDepartment, Department, UpdateDepartment},
        UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DepartmentsService {
    repository: Repository,
}

impl DepartmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Department>> {
        self.repository.departments.list().await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateDepartment) -> AppResult<Department> {
        claims.require_admin()?;
        data.validate()?;
        if self.repository.departments.find_by_name(data.name.trim()).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Department '{}' already exists",
                data.name.trim()
            )));
        }
        self.repository.departments.create(&data).await
    }

    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateDepartment) -> AppResult<Department> {
        claims.require_admin()?;
        let mut department = self
            .repository
            .departments
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))?;

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Name is required".to_string()));
            }
        }
        department.apply_update(&data);
        self.repository.departments.save(&department).await
    }

    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.departments.delete(id).await
    }
}
