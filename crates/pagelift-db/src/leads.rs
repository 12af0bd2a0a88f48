//! Lead repository implementation.
//!
//! The inbox listing joins each lead with its source landing page and its
//! assignee so the admin UI renders one row per lead without follow-up
//! queries.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pagelift_core::{
    new_v7, AssignedFilter, Error, Lead, LeadDetail, LeadExportFilter, LeadExportRow,
    LeadRepository, LeadStatus, ListLeadsRequest, NewLead, PublishStatus, Result,
    LandingPageSummary, UserSummary,
};

use crate::escape_like;

const LEAD_COLUMNS: &str = "leads.id, leads.landing_page_id, leads.name, leads.email, \
     leads.phone, leads.company, leads.job_title, leads.message, leads.status, \
     leads.source, leads.source_details, leads.referrer_url, leads.landing_url, \
     leads.user_agent, leads.ip_address, leads.assigned_to, leads.assigned_at, \
     leads.created_at, leads.updated_at";

const JOINED_COLUMNS: &str = "landing_pages.id AS lp_id, landing_pages.title AS lp_title, \
     landing_pages.slug AS lp_slug, landing_pages.published_url AS lp_published_url, \
     landing_pages.publish_status AS lp_publish_status, \
     assigned_user.id AS assigned_user_id, assigned_user.name AS assigned_user_name, \
     assigned_user.email AS assigned_user_email";

/// PostgreSQL implementation of LeadRepository.
pub struct PgLeadRepository {
    pool: Pool<Postgres>,
}

impl PgLeadRepository {
    /// Create a new PgLeadRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_status(raw: &str) -> Result<LeadStatus> {
    LeadStatus::parse(raw).ok_or_else(|| Error::Internal(format!("unknown lead status '{}'", raw)))
}

fn lead_from_row(row: &PgRow) -> Result<Lead> {
    let status_raw: String = row.get("status");
    Ok(Lead {
        id: row.get("id"),
        landing_page_id: row.get("landing_page_id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company: row.get("company"),
        job_title: row.get("job_title"),
        message: row.get("message"),
        status: parse_status(&status_raw)?,
        source: row.get("source"),
        source_details: row.get("source_details"),
        referrer_url: row.get("referrer_url"),
        landing_url: row.get("landing_url"),
        user_agent: row.get("user_agent"),
        ip_address: row.get("ip_address"),
        assigned_to: row.get("assigned_to"),
        assigned_at: row.get("assigned_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn detail_from_row(row: &PgRow) -> Result<LeadDetail> {
    let lead = lead_from_row(row)?;

    let landing_page = match row.get::<Option<Uuid>, _>("lp_id") {
        Some(lp_id) => {
            let status_raw: String = row.get("lp_publish_status");
            Some(LandingPageSummary {
                id: lp_id,
                title: row.get("lp_title"),
                slug: row.get("lp_slug"),
                published_url: row.get("lp_published_url"),
                publish_status: PublishStatus::parse(&status_raw).ok_or_else(|| {
                    Error::Internal(format!("unknown publish_status '{}'", status_raw))
                })?,
            })
        }
        None => None,
    };

    let assigned_user = row
        .get::<Option<Uuid>, _>("assigned_user_id")
        .map(|id| UserSummary {
            id,
            name: row.get("assigned_user_name"),
            email: row.get("assigned_user_email"),
        });

    Ok(LeadDetail {
        lead,
        landing_page,
        assigned_user,
    })
}

/// Shared filter state for the list, count, and export queries. Conditions
/// are appended with sequential parameter numbers; `bind_all` must apply the
/// values in the same order.
struct LeadFilterSql {
    clauses: Vec<String>,
    search: Option<String>,
    landing_page_id: Option<Uuid>,
    status: Option<LeadStatus>,
    date_from: Option<chrono::DateTime<Utc>>,
    date_to: Option<chrono::DateTime<Utc>>,
    assigned_user: Option<Uuid>,
    params: usize,
}

impl LeadFilterSql {
    fn new(
        search: Option<String>,
        landing_page_id: Option<Uuid>,
        status: Option<LeadStatus>,
        date_from: Option<chrono::DateTime<Utc>>,
        date_to: Option<chrono::DateTime<Utc>>,
        assigned_to: Option<AssignedFilter>,
    ) -> Self {
        let mut clauses = Vec::new();
        let mut params = 0;
        let mut assigned_user = None;

        if search.is_some() {
            params += 1;
            clauses.push(format!(
                "(leads.name ILIKE ${p} OR leads.email ILIKE ${p})",
                p = params
            ));
        }
        if landing_page_id.is_some() {
            params += 1;
            clauses.push(format!("leads.landing_page_id = ${}", params));
        }
        if status.is_some() {
            params += 1;
            clauses.push(format!("leads.status = ${}", params));
        }
        if date_from.is_some() {
            params += 1;
            clauses.push(format!("leads.created_at >= ${}", params));
        }
        if date_to.is_some() {
            params += 1;
            clauses.push(format!("leads.created_at <= ${}", params));
        }
        match assigned_to {
            Some(AssignedFilter::Unassigned) => {
                clauses.push("leads.assigned_to IS NULL".to_string());
            }
            Some(AssignedFilter::Assigned) => {
                clauses.push("leads.assigned_to IS NOT NULL".to_string());
            }
            Some(AssignedFilter::User(id)) => {
                params += 1;
                clauses.push(format!("leads.assigned_to = ${}", params));
                assigned_user = Some(id);
            }
            None => {}
        }

        Self {
            clauses,
            search,
            landing_page_id,
            status,
            date_from,
            date_to,
            assigned_user,
            params,
        }
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn bind_all<'q>(
        &'q self,
        mut query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
        if let Some(search) = &self.search {
            query = query.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(id) = self.landing_page_id {
            query = query.bind(id);
        }
        if let Some(status) = self.status {
            query = query.bind(status.as_str());
        }
        if let Some(from) = self.date_from {
            query = query.bind(from);
        }
        if let Some(to) = self.date_to {
            query = query.bind(to);
        }
        if let Some(user) = self.assigned_user {
            query = query.bind(user);
        }
        query
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn insert(&self, lead: NewLead) -> Result<Uuid> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO leads (
                id, landing_page_id, name, email, phone, company, job_title,
                message, source, source_details, referrer_url, landing_url,
                user_agent, ip_address, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            "#,
        )
        .bind(id)
        .bind(lead.landing_page_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.job_title)
        .bind(&lead.message)
        .bind(&lead.source)
        .bind(&lead.source_details)
        .bind(&lead.referrer_url)
        .bind(&lead.landing_url)
        .bind(&lead.user_agent)
        .bind(&lead.ip_address)
        .bind(LeadStatus::New.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn list(&self, req: ListLeadsRequest) -> Result<(Vec<LeadDetail>, i64)> {
        let filter = LeadFilterSql::new(
            req.search,
            req.landing_page_id,
            req.status,
            req.date_from,
            req.date_to,
            req.assigned_to,
        );
        let where_clause = filter.where_clause();

        let count_sql = format!("SELECT COUNT(*) AS total FROM leads{where_clause}");
        let count_row = filter
            .bind_all(sqlx::query(&count_sql))
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        let total: i64 = count_row.get("total");

        let offset = (req.page - 1) * req.limit;
        let data_sql = format!(
            "SELECT {LEAD_COLUMNS}, {JOINED_COLUMNS} \
             FROM leads \
             LEFT JOIN landing_pages ON leads.landing_page_id = landing_pages.id \
             LEFT JOIN users AS assigned_user ON leads.assigned_to = assigned_user.id\
             {where_clause} \
             ORDER BY leads.{} {} \
             LIMIT ${} OFFSET ${}",
            req.sort_by.column(),
            req.sort_order.sql(),
            filter.params + 1,
            filter.params + 2,
        );

        let rows = filter
            .bind_all(sqlx::query(&data_sql))
            .bind(req.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let details = rows
            .iter()
            .map(detail_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok((details, total))
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadDetail>> {
        let sql = format!(
            "SELECT {LEAD_COLUMNS}, {JOINED_COLUMNS} \
             FROM leads \
             LEFT JOIN landing_pages ON leads.landing_page_id = landing_pages.id \
             LEFT JOIN users AS assigned_user ON leads.assigned_to = assigned_user.id \
             WHERE leads.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(detail_from_row).transpose()
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM leads WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("present"))
    }

    async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Option<Lead>> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "UPDATE leads SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(lead_from_row).transpose()
    }

    async fn assign(&self, id: Uuid, user_id: Option<Uuid>) -> Result<Option<Lead>> {
        let now = Utc::now();
        let row = match user_id {
            Some(user_id) => {
                sqlx::query(&format!(
                    "UPDATE leads SET assigned_to = $1, assigned_at = $2, updated_at = $2 \
                     WHERE id = $3 RETURNING {LEAD_COLUMNS}"
                ))
                .bind(user_id)
                .bind(now)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "UPDATE leads SET assigned_to = NULL, assigned_at = NULL, updated_at = $1 \
                     WHERE id = $2 RETURNING {LEAD_COLUMNS}"
                ))
                .bind(now)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        row.as_ref().map(lead_from_row).transpose()
    }

    async fn export_rows(&self, filter: LeadExportFilter) -> Result<Vec<LeadExportRow>> {
        let filter = LeadFilterSql::new(
            filter.search,
            filter.landing_page_id,
            filter.status,
            filter.date_from,
            filter.date_to,
            None,
        );
        let where_clause = filter.where_clause();

        let sql = format!(
            "SELECT leads.id, leads.name, leads.email, leads.phone, leads.source, \
             leads.status, leads.created_at, landing_pages.title AS landing_page_title \
             FROM leads \
             LEFT JOIN landing_pages ON leads.landing_page_id = landing_pages.id\
             {where_clause} \
             ORDER BY leads.created_at DESC \
             LIMIT ${}",
            filter.params + 1
        );

        let rows = filter
            .bind_all(sqlx::query(&sql))
            .bind(pagelift_core::defaults::EXPORT_FETCH_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                let status_raw: String = r.get("status");
                Ok(LeadExportRow {
                    id: r.get("id"),
                    name: r.get("name"),
                    email: r.get("email"),
                    phone: r.get("phone"),
                    landing_page_title: r.get("landing_page_title"),
                    source: r.get("source"),
                    status: parse_status(&status_raw)?,
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}
