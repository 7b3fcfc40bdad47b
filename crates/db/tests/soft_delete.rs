//! Soft-delete behaviour across entity types.
//!
//! A soft-deleted row must vanish from `find_by_id`, listings, totals,
//! and summaries, stay in the table, and come back on restore. Deleting
//! twice is a no-op that reports `false`.

use chrono::{Duration, Utc};
use estato_db::models::bill::{BillListQuery, CreateBill};
use estato_db::models::member::{CreateMember, MemberListQuery};
use estato_db::repositories::{BillRepo, MemberRepo};
use sqlx::PgPool;

fn new_member(membership_no: &str, name: &str) -> CreateMember {
    CreateMember {
        membership_no: membership_no.to_string(),
        name: name.to_string(),
        cnic: "35202-9876543-2".to_string(),
        phone: "0345-0000000".to_string(),
        email: None,
        address: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_hides_from_find_by_id(pool: PgPool) {
    let member = MemberRepo::create(&pool, &new_member("M-1001", "Hidden"), None)
        .await
        .unwrap();

    let deleted = MemberRepo::soft_delete(&pool, member.id, None).await.unwrap();
    assert!(deleted, "first soft_delete should report true");

    let found = MemberRepo::find_by_id(&pool, member.id).await.unwrap();
    assert!(found.is_none(), "soft-deleted member must not be found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_is_idempotent(pool: PgPool) {
    let member = MemberRepo::create(&pool, &new_member("M-1002", "Twice"), None)
        .await
        .unwrap();

    assert!(MemberRepo::soft_delete(&pool, member.id, None).await.unwrap());
    assert!(
        !MemberRepo::soft_delete(&pool, member.id, None).await.unwrap(),
        "second soft_delete should report false"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_rows_leave_listings_and_summaries(pool: PgPool) {
    for i in 0..3 {
        MemberRepo::create(&pool, &new_member(&format!("M-110{i}"), "Kept"), None)
            .await
            .unwrap();
    }
    let doomed = MemberRepo::create(&pool, &new_member("M-1109", "Doomed"), None)
        .await
        .unwrap();
    MemberRepo::soft_delete(&pool, doomed.id, None).await.unwrap();

    let page = MemberRepo::list(&pool, &MemberListQuery::default()).await.unwrap();

    assert_eq!(page.pagination.total, 3);
    assert!(page.records.iter().all(|m| m.id != doomed.id));

    // The by-status summary runs over the same filtered set.
    let summary = page.summary.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_status.get("active"), Some(&3));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_brings_a_member_back(pool: PgPool) {
    let member = MemberRepo::create(&pool, &new_member("M-1201", "Returner"), None)
        .await
        .unwrap();
    MemberRepo::soft_delete(&pool, member.id, None).await.unwrap();

    assert!(MemberRepo::restore(&pool, member.id, None).await.unwrap());
    // Restoring a live row is a no-op.
    assert!(!MemberRepo::restore(&pool, member.id, None).await.unwrap());

    let found = MemberRepo::find_by_id(&pool, member.id).await.unwrap();
    assert!(found.is_some(), "restored member must be visible again");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_bills_drop_out_of_collection_totals(pool: PgPool) {
    let member = MemberRepo::create(&pool, &new_member("M-1301", "Payer"), None)
        .await
        .unwrap();

    for (no, amount) in [("B-1301", 4_000.0), ("B-1302", 6_000.0)] {
        BillRepo::create(
            &pool,
            &CreateBill {
                bill_no: no.to_string(),
                member_id: member.id,
                plot_id: None,
                bill_type: "maintenance".to_string(),
                amount,
                late_surcharge_pct: None,
                due_date: Utc::now() + Duration::days(10),
            },
            None,
        )
        .await
        .unwrap();
    }

    let before = BillRepo::list(&pool, &BillListQuery::default()).await.unwrap();
    assert_eq!(before.summary.as_ref().unwrap().total_amount, 10_000.0);

    let victim = before.records.iter().find(|b| b.bill_no == "B-1302").unwrap();
    BillRepo::soft_delete(&pool, victim.id, None).await.unwrap();

    let after = BillRepo::list(&pool, &BillListQuery::default()).await.unwrap();
    assert_eq!(after.pagination.total, 1);
    assert_eq!(after.summary.as_ref().unwrap().total_amount, 4_000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn the_row_itself_is_never_physically_removed(pool: PgPool) {
    let member = MemberRepo::create(&pool, &new_member("M-1401", "Archived"), None)
        .await
        .unwrap();
    MemberRepo::soft_delete(&pool, member.id, None).await.unwrap();

    let raw: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members WHERE id = $1")
        .bind(member.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(raw.0, 1, "soft delete must not remove the row");
}
