use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::{
    models::{DepartmentAggregate, Employee, EmployeePatch, NewEmployee},
    query::{EmployeeFilter, EmployeeQuery},
    utils::sql,
};

const EMPLOYEE_COLUMNS: &str = "id, name, email, phone, age, department, position, join_date, \
     salary, status, attendance, role, avatar, created_at, updated_at";

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(&sql(&format!(
            "SELECT {} FROM employees WHERE id = ?",
            EMPLOYEE_COLUMNS
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(&sql(&format!(
            "SELECT {} FROM employees WHERE id = ANY(?)",
            EMPLOYEE_COLUMNS
        )))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Cursor page over the filtered ordering.
    ///
    /// Rows are numbered in the requested order (ties broken by id) and the
    /// page starts right after the cursor's row number. A cursor that is not
    /// part of the filtered set compares against NULL and yields no rows.
    pub async fn list(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "WITH ordered AS (SELECT {}, ROW_NUMBER() OVER (ORDER BY {} {}, id COLLATE \"C\" ASC) AS position_in_order FROM employees",
            EMPLOYEE_COLUMNS,
            query.order.field.order_expression(),
            query.order.direction.sql(),
        ));
        push_filter(&mut builder, &query.filter);
        builder.push(format!(") SELECT {} FROM ordered", EMPLOYEE_COLUMNS));

        if let Some(cursor) = &query.page.cursor {
            builder.push(
                " WHERE position_in_order > (SELECT position_in_order FROM ordered WHERE id = ",
            );
            builder.push_bind(cursor.clone());
            builder.push(")");
        }

        builder.push(" ORDER BY position_in_order LIMIT ");
        builder.push_bind(query.page.limit);

        builder
            .build_query_as::<Employee>()
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count(&self, filter: &EmployeeFilter) -> Result<i64, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM employees");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
    }

    pub async fn get_all_newest_first(&self) -> Result<Vec<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees ORDER BY created_at DESC, id ASC",
            EMPLOYEE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(&self, input: NewEmployee) -> Result<Employee, sqlx::Error> {
        let employee = input.into_employee();

        sqlx::query_as::<_, Employee>(&sql(&format!(
            r#"
            INSERT INTO
                employees (
                    id,
                    name,
                    email,
                    phone,
                    age,
                    department,
                    position,
                    join_date,
                    salary,
                    status,
                    attendance,
                    role,
                    avatar,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {}
            "#,
            EMPLOYEE_COLUMNS
        )))
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.age)
        .bind(employee.department)
        .bind(&employee.position)
        .bind(employee.join_date)
        .bind(employee.salary)
        .bind(employee.status)
        .bind(employee.attendance)
        .bind(employee.role)
        .bind(&employee.avatar)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Partial update: absent fields keep their stored value. Nullable columns
    /// bind a flag choosing between the new value and the stored one.
    pub async fn update(
        &self,
        id: &str,
        patch: EmployeePatch,
    ) -> Result<Option<Employee>, sqlx::Error> {
        sqlx::query_as::<_, Employee>(&sql(&format!(
            r#"
            UPDATE employees
            SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                phone = CASE WHEN ? THEN ? ELSE phone END,
                age = COALESCE(?, age),
                department = COALESCE(?, department),
                position = COALESCE(?, position),
                join_date = COALESCE(?, join_date),
                salary = CASE WHEN ? THEN ? ELSE salary END,
                status = COALESCE(?, status),
                attendance = COALESCE(?, attendance),
                role = COALESCE(?, role),
                avatar = CASE WHEN ? THEN ? ELSE avatar END,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                {}
            "#,
            EMPLOYEE_COLUMNS
        )))
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.phone.is_some())
        .bind(patch.phone.flatten())
        .bind(patch.age)
        .bind(patch.department)
        .bind(patch.position)
        .bind(patch.join_date)
        .bind(patch.salary.is_some())
        .bind(patch.salary.flatten())
        .bind(patch.status)
        .bind(patch.attendance)
        .bind(patch.role)
        .bind(patch.avatar.is_some())
        .bind(patch.avatar.flatten())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&sql("DELETE FROM employees WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn department_aggregates(&self) -> Result<Vec<DepartmentAggregate>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentAggregate>(
            r#"
            SELECT
                department,
                COUNT(*) AS count,
                AVG(salary) AS average_salary
            FROM
                employees
            GROUP BY
                department
            ORDER BY
                department
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    let mut first = true;
    let mut and = |builder: &mut QueryBuilder<'_, Postgres>| {
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(department) = &filter.department {
        and(builder);
        builder.push("department = ");
        builder.push_bind(department.clone());
    }

    if let Some(status) = &filter.status {
        and(builder);
        builder.push("status = ");
        builder.push_bind(status.clone());
    }

    if let Some(min) = filter.age_min {
        and(builder);
        builder.push("age >= ");
        builder.push_bind(min);
    }

    if let Some(max) = filter.age_max {
        and(builder);
        builder.push("age <= ");
        builder.push_bind(max);
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        and(builder);
        builder.push("(name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
