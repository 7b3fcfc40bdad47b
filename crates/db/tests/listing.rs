//! Listing-engine behaviour against the Postgres store: pagination
//! metadata, filters, search escaping, sort fallback, and summaries
//! computed over the full filtered set rather than the fetched page.

use chrono::{Duration, Utc};
use estato_core::query::{ListParams, QueryError, SortOrder};
use estato_db::models::bill::{BillListQuery, CreateBill};
use estato_db::models::member::{CreateMember, MemberListQuery};
use estato_db::repositories::{BillRepo, MemberRepo};
use sqlx::PgPool;

async fn seed_members(pool: &PgPool, count: usize) {
    for i in 0..count {
        MemberRepo::create(
            pool,
            &CreateMember {
                membership_no: format!("M-{i:04}"),
                name: format!("Member {i:04}"),
                cnic: format!("35202-00000{i:02}-3"),
                phone: format!("0300-00000{i:02}"),
                email: None,
                address: None,
            },
            None,
        )
        .await
        .unwrap();
    }
}

async fn seed_bills(pool: &PgPool) -> estato_db::models::member::Member {
    let member = MemberRepo::create(
        pool,
        &CreateMember {
            membership_no: "M-BILL".to_string(),
            name: "Billed Member".to_string(),
            cnic: "35202-7777777-7".to_string(),
            phone: "0333-7777777".to_string(),
            email: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();

    for (no, amount, days) in [
        ("B-01", 1_000.0, -20),
        ("B-02", 2_000.0, -10),
        ("B-03", 3_000.0, 5),
        ("B-04", 4_000.0, 15),
    ] {
        BillRepo::create(
            pool,
            &CreateBill {
                bill_no: no.to_string(),
                member_id: member.id,
                plot_id: None,
                bill_type: "maintenance".to_string(),
                amount,
                late_surcharge_pct: None,
                due_date: Utc::now() + Duration::days(days),
            },
            None,
        )
        .await
        .unwrap();
    }

    // Settle one bill so the summary has two status groups.
    let page = BillRepo::list(pool, &BillListQuery::default()).await.unwrap();
    let target = page.records.iter().find(|b| b.bill_no == "B-01").unwrap();
    BillRepo::mark_paid(pool, target.id, None).await.unwrap();

    member
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn third_page_of_25_members_holds_the_remainder(pool: PgPool) {
    seed_members(&pool, 25).await;

    let params = MemberListQuery {
        list: ListParams {
            page: Some(3),
            limit: Some(10),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();

    assert_eq!(page.records.len(), 5);
    assert_eq!(page.pagination.total, 25);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.pagination.page, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn page_past_the_end_is_empty_with_correct_meta(pool: PgPool) {
    seed_members(&pool, 4).await;

    let params = MemberListQuery {
        list: ListParams {
            page: Some(9),
            limit: Some(10),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();

    assert!(page.records.is_empty());
    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.pages, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn records_are_a_contiguous_sorted_slice(pool: PgPool) {
    seed_members(&pool, 12).await;

    let params = MemberListQuery {
        list: ListParams {
            page: Some(2),
            limit: Some(5),
            sort_by: Some("membership_no".to_string()),
            sort_order: Some(SortOrder::Asc),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();

    let nos: Vec<&str> = page.records.iter().map(|m| m.membership_no.as_str()).collect();
    assert_eq!(nos, vec!["M-0005", "M-0006", "M-0007", "M-0008", "M-0009"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_sort_field_falls_back_without_erroring(pool: PgPool) {
    seed_members(&pool, 3).await;

    let params = MemberListQuery {
        list: ListParams {
            sort_by: Some("password_hash".to_string()),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();
    assert_eq!(page.pagination.total, 3);
}

// ---------------------------------------------------------------------------
// Filters and search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_matches_across_configured_fields(pool: PgPool) {
    seed_members(&pool, 10).await;

    // Matches the CNIC of exactly one seeded member.
    let params = MemberListQuery {
        list: ListParams {
            search: Some("35202-0000007".to_string()),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.records[0].membership_no, "M-0007");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_metacharacters_are_literal(pool: PgPool) {
    MemberRepo::create(
        &pool,
        &CreateMember {
            membership_no: "M-PCT".to_string(),
            name: "100% Paid".to_string(),
            cnic: "35202-1111111-1".to_string(),
            phone: "0311-1111111".to_string(),
            email: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();
    MemberRepo::create(
        &pool,
        &CreateMember {
            membership_no: "M-PLAIN".to_string(),
            name: "100 Rupees".to_string(),
            cnic: "35202-2222222-2".to_string(),
            phone: "0322-2222222".to_string(),
            email: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();

    // "100%" must not act as a wildcard that also matches "100 Rupees".
    let params = MemberListQuery {
        list: ListParams {
            search: Some("100%".to_string()),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.records[0].membership_no, "M-PCT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn no_match_search_yields_empty_page_and_summary(pool: PgPool) {
    seed_members(&pool, 5).await;

    let params = MemberListQuery {
        list: ListParams {
            search: Some("does-not-exist".to_string()),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };
    let page = MemberRepo::list(&pool, &params).await.unwrap();

    assert!(page.records.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.pages, 0);
    // Absent categories are omitted, not zero-filled.
    assert!(page.summary.unwrap().by_status.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_reference_id_is_invalid_argument(pool: PgPool) {
    let params = BillListQuery {
        member_id: Some("not-an-id".to_string()),
        ..BillListQuery::default()
    };
    let err = BillRepo::list(&pool, &params).await.unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_set_and_range_filters_compose(pool: PgPool) {
    seed_bills(&pool).await;

    let params = BillListQuery {
        statuses: vec!["unpaid".to_string()],
        due_from: Some(Utc::now() - Duration::days(15)),
        ..BillListQuery::default()
    };
    let page = BillRepo::list(&pool, &params).await.unwrap();

    // B-01 is paid, B-02 is unpaid within range, B-03/B-04 are future
    // (also within range); only B-01 drops out.
    assert_eq!(page.pagination.total, 3);
    assert!(page.records.iter().all(|b| b.status == "unpaid"));
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_covers_the_full_filtered_set_not_the_page(pool: PgPool) {
    seed_bills(&pool).await;

    let params = BillListQuery {
        list: ListParams {
            page: Some(1),
            limit: Some(1),
            ..ListParams::default()
        },
        ..BillListQuery::default()
    };
    let page = BillRepo::list(&pool, &params).await.unwrap();

    // One record on the page, but the summary spans all four bills.
    assert_eq!(page.records.len(), 1);
    let summary = page.summary.unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.by_status.get("paid"), Some(&1));
    assert_eq!(summary.by_status.get("unpaid"), Some(&3));
    assert_eq!(summary.total_amount, 10_000.0);
    assert_eq!(summary.paid_amount, 1_000.0);
    assert_eq!(summary.collection_pct, 10.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn per_group_counts_sum_to_total(pool: PgPool) {
    seed_bills(&pool).await;

    let page = BillRepo::list(&pool, &BillListQuery::default()).await.unwrap();
    let summary = page.summary.unwrap();
    let grouped: i64 = summary.by_status.values().sum();
    assert_eq!(grouped, page.pagination.total);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_listing_is_idempotent_on_an_unchanged_store(pool: PgPool) {
    seed_members(&pool, 8).await;

    let params = MemberListQuery {
        list: ListParams {
            page: Some(1),
            limit: Some(5),
            sort_by: Some("membership_no".to_string()),
            sort_order: Some(SortOrder::Asc),
            ..ListParams::default()
        },
        ..MemberListQuery::default()
    };

    let first = MemberRepo::list(&pool, &params).await.unwrap();
    let second = MemberRepo::list(&pool, &params).await.unwrap();

    assert_eq!(first.pagination, second.pagination);
    let ids = |page: &estato_core::query::Page<estato_db::models::member::Member, _>| {
        page.records.iter().map(|m| m.id).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}
