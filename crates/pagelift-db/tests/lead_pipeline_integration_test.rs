//! Live-database round trips for the capture and triage path.
//!
//! Run with a local PostgreSQL instance:
//!
//! ```sh
//! PAGELIFT_TEST_DATABASE_URL=postgres://... cargo test -p pagelift-db -- --ignored
//! ```

use chrono::Utc;
use uuid::Uuid;

use pagelift_core::{
    AssignedFilter, CreateLandingPageRequest, Error, LandingPageRepository, LeadOrderBy,
    LeadRepository, LeadStatus, ListLeadsRequest, NewLead, PublishStatus, SortOrder,
};
use pagelift_db::test_fixtures::{setup_schema, test_database_url, truncate_all};
use pagelift_db::Database;

async fn test_db() -> Database {
    let db = Database::connect(&test_database_url())
        .await
        .expect("connect to test database");
    setup_schema(&db.pool).await.expect("schema");
    truncate_all(&db.pool).await.expect("truncate");
    db
}

async fn seed_user(db: &Database) -> Uuid {
    let id = pagelift_core::new_v7();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
         VALUES ($1, $2, $3, 'x', 'editor', NOW(), NOW())",
    )
    .bind(id)
    .bind("Seed User")
    .bind(format!("seed-{}@example.com", id))
    .execute(&db.pool)
    .await
    .expect("seed user");
    id
}

fn page_request(slug: &str) -> CreateLandingPageRequest {
    CreateLandingPageRequest {
        title: "Spring Sale".to_string(),
        slug: slug.to_string(),
        headline: Some("Save big".to_string()),
        subheading: None,
        body_text: None,
        cta_text: None,
        hero_image_url: None,
        form_fields: None,
    }
}

fn lead_for(page_id: Uuid, email: &str) -> NewLead {
    NewLead {
        landing_page_id: Some(page_id),
        name: Some("Visitor".to_string()),
        email: Some(email.to_string()),
        phone: None,
        company: None,
        job_title: None,
        message: None,
        source: "landing_page".to_string(),
        source_details: Some("LP: spring-sale".to_string()),
        referrer_url: None,
        landing_url: None,
        user_agent: Some("integration-test".to_string()),
        ip_address: Some("203.0.113.9".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn page_create_publish_and_slug_conflict() {
    let db = test_db().await;
    let owner = seed_user(&db).await;

    let page = db
        .landing_pages
        .create(owner, page_request("spring-sale"))
        .await
        .expect("create page");
    assert_eq!(page.publish_status, PublishStatus::Draft);
    assert!(page.form_fields.has_email_field(), "default form applied");

    // Duplicate slug maps to a conflict, not a bare database error.
    let err = db
        .landing_pages
        .create(owner, page_request("spring-sale"))
        .await
        .expect_err("duplicate slug rejected");
    assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);

    // Publish records the URL and keeps the first publish timestamp.
    let published = db
        .landing_pages
        .publish(page.id, "http://localhost:5001/pages/spring-sale.html")
        .await
        .expect("publish")
        .expect("page exists");
    assert_eq!(published.publish_status, PublishStatus::Published);
    let first_published_at = published.published_at.expect("published_at set");

    let republished = db
        .landing_pages
        .publish(page.id, "http://localhost:5001/pages/spring-sale.html")
        .await
        .expect("republish")
        .expect("page exists");
    assert_eq!(republished.published_at, Some(first_published_at));

    // Published slug lookup only sees published pages.
    assert!(db
        .landing_pages
        .get_published_by_slug("spring-sale")
        .await
        .expect("lookup")
        .is_some());
    assert!(db
        .landing_pages
        .get_published_by_slug("nonexistent")
        .await
        .expect("lookup")
        .is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn lead_capture_list_filter_and_assignment() {
    let db = test_db().await;
    let owner = seed_user(&db).await;
    let page = db
        .landing_pages
        .create(owner, page_request("capture-test"))
        .await
        .expect("create page");

    let lead_a = db
        .leads
        .insert(lead_for(page.id, "a@example.com"))
        .await
        .expect("insert a");
    let lead_b = db
        .leads
        .insert(lead_for(page.id, "b@example.com"))
        .await
        .expect("insert b");

    // New leads land with status `new` and the page join populated.
    let detail = db
        .leads
        .get(lead_a)
        .await
        .expect("get")
        .expect("lead exists");
    assert_eq!(detail.lead.status, LeadStatus::New);
    assert_eq!(
        detail.landing_page.as_ref().map(|p| p.id),
        Some(page.id),
        "joined page summary present"
    );

    // Search filter matches by email.
    let (found, total) = db
        .leads
        .list(ListLeadsRequest {
            page: 1,
            limit: 25,
            search: Some("a@example".to_string()),
            sort_by: LeadOrderBy::CreatedAt,
            sort_order: SortOrder::Desc,
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(total, 1);
    assert_eq!(found[0].lead.id, lead_a);

    // Status transition.
    let updated = db
        .leads
        .update_status(lead_b, LeadStatus::Qualified)
        .await
        .expect("update")
        .expect("lead exists");
    assert_eq!(updated.status, LeadStatus::Qualified);

    // Assignment stamps assigned_at; unassignment clears it.
    let assigned = db
        .leads
        .assign(lead_a, Some(owner))
        .await
        .expect("assign")
        .expect("lead exists");
    assert_eq!(assigned.assigned_to, Some(owner));
    assert!(assigned.assigned_at.is_some());

    let (assigned_only, assigned_total) = db
        .leads
        .list(ListLeadsRequest {
            page: 1,
            limit: 25,
            assigned_to: Some(AssignedFilter::Assigned),
            ..Default::default()
        })
        .await
        .expect("list assigned");
    assert_eq!(assigned_total, 1);
    assert_eq!(assigned_only[0].lead.id, lead_a);

    let unassigned = db
        .leads
        .assign(lead_a, None)
        .await
        .expect("unassign")
        .expect("lead exists");
    assert_eq!(unassigned.assigned_to, None);
    assert_eq!(unassigned.assigned_at, None);

    // Export honors filters and joins the page title.
    let rows = db
        .leads
        .export_rows(pagelift_core::LeadExportFilter {
            status: Some(LeadStatus::Qualified),
            ..Default::default()
        })
        .await
        .expect("export");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, lead_b);
    assert_eq!(rows[0].landing_page_title.as_deref(), Some("Spring Sale"));
    assert!(rows[0].created_at <= Utc::now());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn indexing_issue_resolved_status_sticks() {
    let db = test_db().await;
    let date = Utc::now().date_naive();

    let mut issue = pagelift_core::IndexingIssueUpsert {
        url: "https://example.com/spring-sale".to_string(),
        issue_type: "not_indexed".to_string(),
        severity: "warning".to_string(),
        description: Some("Discovered, currently not indexed".to_string()),
        detected_date: date,
        status: "open".to_string(),
    };
    db.seo.upsert_indexing_issue(&issue).await.expect("insert");

    // Operator resolves it out of band.
    sqlx::query("UPDATE seo_indexing_issues SET status = 'resolved'")
        .execute(&db.pool)
        .await
        .expect("resolve");

    // A re-detection of the same issue must not reopen it.
    issue.severity = "error".to_string();
    db.seo.upsert_indexing_issue(&issue).await.expect("re-upsert");

    let issues = db
        .seo
        .list_indexing_issues(None, None, 10, 0)
        .await
        .expect("list");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].status, "resolved");
    assert_eq!(issues[0].severity, "error", "severity still refreshed");

    let open_only = db
        .seo
        .list_indexing_issues(Some("open"), None, 10, 0)
        .await
        .expect("list open");
    assert!(open_only.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn seo_keyword_upsert_is_idempotent() {
    let db = test_db().await;
    let date = Utc::now().date_naive();

    let mut row = pagelift_core::SeoKeywordUpsert {
        keyword: "rust crm".to_string(),
        url: Some("https://example.com/spring-sale".to_string()),
        impressions: 100,
        clicks: 5,
        ctr: 5.0,
        position: Some(8.4),
        date,
        country: None,
        device: None,
    };
    db.seo.upsert_keyword(&row).await.expect("first upsert");

    // Re-sync with fresher numbers overwrites the same cell.
    row.impressions = 120;
    row.clicks = 9;
    db.seo.upsert_keyword(&row).await.expect("second upsert");

    let perf = db
        .seo
        .keyword_performance(&pagelift_core::KeywordFilter {
            limit: 10,
            ..Default::default()
        })
        .await
        .expect("performance");
    assert_eq!(perf.len(), 1);
    assert_eq!(perf[0].total_impressions, 120);
    assert_eq!(perf[0].total_clicks, 9);
    assert_eq!(perf[0].data_points, 1, "no duplicate rows after re-sync");
}
