//! Ledger tests against a live PostgreSQL database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test --test postgres -- --ignored`.
//! Every test seeds its own creator and content item, so the suite can share
//! one scratch database and run in parallel.

#![allow(clippy::panic)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use drip_gateway::domain::{
    Content, ContentDraft, Creator, FeeSplit, PurchaseClaim, PurchaseRecord,
};
use drip_gateway::error::MarketError;
use drip_gateway::persistence::{LedgerStore, PostgresLedger};
use drip_gateway::service::{PurchaseService, PurchaseSubmission};
use drip_gateway::verifier::TrustingVerifier;

const BASE_URL: &str = "http://localhost:3000";

struct Fixture {
    ledger: PostgresLedger,
    creator: Creator,
    content: Content,
}

/// Lowercase hex of `len` random digits.
fn random_hex(len: usize) -> String {
    let mut hex = String::new();
    while hex.len() < len {
        hex.push_str(&Uuid::new_v4().simple().to_string());
    }
    hex.truncate(len);
    hex
}

fn wallet() -> String {
    format!("0x{}", random_hex(40))
}

fn tx_hash() -> String {
    format!("0x{}", random_hex(64))
}

fn dec(s: &str) -> Decimal {
    let Ok(d) = Decimal::from_str(s) else {
        panic!("bad decimal literal {s}");
    };
    d
}

async fn fixture() -> Fixture {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        panic!("DATABASE_URL must point at a scratch database");
    };
    let Ok(pool) = PgPool::connect(&url).await else {
        panic!("cannot connect to {url}");
    };
    let ledger = PostgresLedger::new(pool);
    if let Err(err) = ledger.migrate().await {
        panic!("migrations failed: {err}");
    }

    let Ok(creator) = ledger
        .find_or_create_creator(Creator::for_wallet(&wallet()))
        .await
    else {
        panic!("creator insert failed");
    };
    let content = ContentDraft {
        title: "Night Drive".to_string(),
        description: "Synthwave track".to_string(),
        category: "Music".to_string(),
        price: Decimal::ONE,
        file_url: "/uploads/night-drive.mp3".to_string(),
        thumbnail_url: None,
    }
    .into_content(&creator.id);
    if let Err(err) = ledger.insert_content(&content).await {
        panic!("content insert failed: {err}");
    }

    Fixture {
        ledger,
        creator,
        content,
    }
}

fn record(fx: &Fixture, buyer: &str, hash: &str, amount: &str) -> PurchaseRecord {
    let claim = PurchaseClaim {
        content_id: fx.content.id.clone(),
        buyer_address: buyer.to_string(),
        transaction_hash: hash.to_string(),
        amount: dec(amount),
    };
    let Ok(split) = FeeSplit::compute(claim.amount) else {
        panic!("split failed for {amount}");
    };
    PurchaseRecord::confirmed(&claim, &fx.creator.id, split, BASE_URL)
}

/// Purchase, library and earnings rows belonging to the fixture.
async fn row_counts(fx: &Fixture) -> (i64, i64, i64) {
    let counts = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT \
         (SELECT count(*) FROM purchases WHERE content_id = $1), \
         (SELECT count(*) FROM user_library WHERE content_id = $1), \
         (SELECT count(*) FROM earnings WHERE creator_id = $2)",
    )
    .bind(&fx.content.id)
    .bind(&fx.creator.id)
    .fetch_one(fx.ledger.pool())
    .await;
    match counts {
        Ok(counts) => counts,
        Err(err) => panic!("count query failed: {err}"),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_writes_of_one_hash_commit_once() {
    let fx = fixture().await;
    let hash = tx_hash();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = fx.ledger.clone();
        let record = record(&fx, &wallet(), &hash, "1");
        handles.push(tokio::spawn(async move {
            ledger.record_purchase(&record).await
        }));
    }

    let mut committed = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => committed += 1,
            Ok(Err(MarketError::DuplicateTransaction)) => duplicates += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(committed, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(row_counts(&fx).await, (1, 1, 1));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn replayed_hash_is_a_duplicate() {
    let fx = fixture().await;
    let hash = tx_hash();

    let Ok(()) = fx.ledger.record_purchase(&record(&fx, &wallet(), &hash, "1")).await else {
        panic!("first write failed");
    };
    let replay = fx.ledger.record_purchase(&record(&fx, &wallet(), &hash, "2")).await;
    assert!(matches!(replay, Err(MarketError::DuplicateTransaction)));
    assert_eq!(row_counts(&fx).await, (1, 1, 1));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn failed_earnings_insert_rolls_back_the_purchase() {
    let fx = fixture().await;
    let hash = tx_hash();

    // The earnings row references a creator that does not exist, so the
    // last insert of the transaction fails after the first two succeeded.
    let mut broken = record(&fx, &wallet(), &hash, "1");
    broken.earnings.creator_id = format!("ghost-{}", Uuid::new_v4());

    let result = fx.ledger.record_purchase(&broken).await;
    assert!(matches!(result, Err(MarketError::PersistenceError(_))), "{result:?}");
    assert_eq!(row_counts(&fx).await, (0, 0, 0));

    let Ok(found) = fx.ledger.find_purchase_by_transaction(&hash).await else {
        panic!("lookup failed");
    };
    assert!(found.is_none());

    // The hash was never consumed.
    let Ok(()) = fx.ledger.record_purchase(&record(&fx, &wallet(), &hash, "1")).await else {
        panic!("retry after rollback failed");
    };
    assert_eq!(row_counts(&fx).await, (1, 1, 1));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn fee_split_check_refuses_parts_that_do_not_sum() {
    let fx = fixture().await;

    let mut skewed = record(&fx, &wallet(), &tx_hash(), "1");
    skewed.purchase.platform_fee = Decimal::ZERO;

    let result = fx.ledger.record_purchase(&skewed).await;
    let Err(MarketError::PersistenceError(message)) = result else {
        panic!("expected a constraint violation, got {result:?}");
    };
    assert!(message.contains("purchases_fee_split_check"), "{message}");
    assert_eq!(row_counts(&fx).await, (0, 0, 0));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn stored_split_matches_the_receipt_at_the_range_limits() {
    let fx = fixture().await;

    for amount in ["0.3000000000000003", "0.0000000000000001", "999999999999999999.99"] {
        let hash = tx_hash();
        let written = record(&fx, &wallet(), &hash, amount);
        if let Err(err) = fx.ledger.record_purchase(&written).await {
            panic!("{amount} should be storable: {err}");
        }
        let Ok(Some(stored)) = fx.ledger.find_purchase_by_transaction(&hash).await else {
            panic!("{amount} was not stored");
        };
        assert_eq!(stored.amount, written.purchase.amount, "{amount}");
        assert_eq!(stored.platform_fee, written.purchase.platform_fee, "{amount}");
        assert_eq!(stored.creator_earnings, written.purchase.creator_earnings, "{amount}");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn service_refuses_amounts_the_columns_cannot_hold() {
    let fx = fixture().await;
    let store: Arc<dyn LedgerStore> = Arc::new(fx.ledger.clone());
    let service = PurchaseService::new(store, Arc::new(TrustingVerifier), BASE_URL);

    for amount in ["0.30000000000000003", "0.000000000000000001", "1000000000000000000"] {
        let result = service
            .submit_purchase(PurchaseSubmission {
                content_id: Some(fx.content.id.clone()),
                buyer_address: Some(wallet()),
                transaction_hash: Some(tx_hash()),
                amount: Some(amount.to_string()),
            })
            .await;
        assert!(
            matches!(result, Err(MarketError::InvalidRequest(_))),
            "{amount}: {result:?}"
        );
    }
    assert_eq!(row_counts(&fx).await, (0, 0, 0));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn library_lookup_ignores_hex_case_and_normalizes_amounts() {
    let fx = fixture().await;
    let buyer = wallet();

    let Ok(()) = fx.ledger.record_purchase(&record(&fx, &buyer, &tx_hash(), "1.0")).await else {
        panic!("purchase write failed");
    };

    let shouted = format!("0x{}", buyer.trim_start_matches("0x").to_uppercase());
    let Ok(items) = fx.ledger.library_for_wallet(&shouted).await else {
        panic!("library lookup failed");
    };
    assert_eq!(items.len(), 1);
    let Some(item) = items.first() else {
        panic!("expected one library item");
    };
    assert_eq!(item.entry.wallet_address, buyer);
    assert_eq!(item.content.id, fx.content.id);
    assert_eq!(item.content.price.to_string(), "1");

    let Ok(others) = fx.ledger.library_for_wallet(&wallet()).await else {
        panic!("library lookup failed");
    };
    assert!(others.is_empty());

    let Ok(pending) = fx.ledger.pending_earnings().await else {
        panic!("pending lookup failed");
    };
    let Some((earnings, _)) = pending
        .iter()
        .find(|(earnings, _)| earnings.creator_id == fx.creator.id)
    else {
        panic!("expected pending earnings for the fixture creator");
    };
    assert_eq!(earnings.amount.to_string(), "0.95");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn payout_replay_pays_nothing() {
    let fx = fixture().await;
    let written = record(&fx, &wallet(), &tx_hash(), "1");
    let Ok(()) = fx.ledger.record_purchase(&written).await else {
        panic!("purchase write failed");
    };
    let earnings_id = written.earnings.id;

    let Ok(foreign) = fx
        .ledger
        .mark_earnings_paid("someone-else", &[earnings_id], Utc::now())
        .await
    else {
        panic!("foreign payout failed");
    };
    assert!(foreign.is_empty());

    let Ok(first) = fx
        .ledger
        .mark_earnings_paid(&fx.creator.id, &[earnings_id], Utc::now())
        .await
    else {
        panic!("payout failed");
    };
    assert_eq!(first, vec![earnings_id]);

    let Ok(replay) = fx
        .ledger
        .mark_earnings_paid(&fx.creator.id, &[earnings_id], Utc::now())
        .await
    else {
        panic!("replayed payout failed");
    };
    assert!(replay.is_empty());

    let paid_at = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
        "SELECT paid_at FROM earnings WHERE id = $1",
    )
    .bind(earnings_id.as_uuid())
    .fetch_one(fx.ledger.pool())
    .await;
    assert!(matches!(paid_at, Ok(Some(_))), "{paid_at:?}");

    let Ok(pending) = fx.ledger.pending_earnings().await else {
        panic!("pending lookup failed");
    };
    assert!(pending.iter().all(|(earnings, _)| earnings.id != earnings_id));
}
