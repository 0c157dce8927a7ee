use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use creditbook_core::customers::{CustomerError, CustomerUpdate, NewCustomer};
use creditbook_core::entries::{CreditEntryUpdate, EntryError, NewCreditEntry, PaymentUpdate};
use creditbook_core::{Error, LedgerService};

mod common;

fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        id: None,
        name: name.to_string(),
        phone: Some("0700000000".to_string()),
        address: None,
    }
}

fn new_entry(customer_id: &str, amount: Decimal) -> NewCreditEntry {
    NewCreditEntry {
        id: None,
        customer_id: customer_id.to_string(),
        amount,
        description: Some("groceries".to_string()),
        entry_date: Utc::now(),
        image_data: None,
    }
}

#[test]
fn test_customer_lifecycle_totals() {
    let db_dir = common::get_test_db_path("customer_lifecycle_totals");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        // New customer starts with zero totals
        let customer = ledger.create_customer(new_customer("Asha")).await.unwrap();
        assert_eq!(customer.total_credit, Decimal::ZERO);
        assert_eq!(customer.outstanding_balance, Decimal::ZERO);

        // Add entry amount=500
        let first = ledger
            .create_entry(new_entry(&customer.id, dec!(500)))
            .await
            .unwrap();
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(500));
        assert_eq!(refreshed.outstanding_balance, dec!(500));

        // Mark it paid with paid_amount=500
        ledger
            .set_payment_status(
                &first.id,
                PaymentUpdate {
                    is_paid: true,
                    paid_amount: dec!(500),
                },
            )
            .await
            .unwrap();
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_paid, dec!(500));
        assert_eq!(refreshed.outstanding_balance, Decimal::ZERO);

        // Add a second entry amount=200
        ledger
            .create_entry(new_entry(&customer.id, dec!(200)))
            .await
            .unwrap();
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.outstanding_balance, dec!(200));

        // Delete the first entry
        ledger.delete_entry(&first.id).await.unwrap();
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(200));
        assert_eq!(refreshed.total_paid, Decimal::ZERO);
        assert_eq!(refreshed.outstanding_balance, dec!(200));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_outstanding_always_equals_credit_minus_paid() {
    let db_dir = common::get_test_db_path("outstanding_invariant");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Binta")).await.unwrap();

        let a = ledger
            .create_entry(new_entry(&customer.id, dec!(120.55)))
            .await
            .unwrap();
        ledger
            .create_entry(new_entry(&customer.id, dec!(79.45)))
            .await
            .unwrap();
        ledger
            .set_payment_status(
                &a.id,
                PaymentUpdate {
                    is_paid: false,
                    paid_amount: dec!(20.55),
                },
            )
            .await
            .unwrap();

        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(
            refreshed.outstanding_balance,
            refreshed.total_credit - refreshed.total_paid
        );
        assert_eq!(refreshed.total_credit, dec!(200.00));
        assert_eq!(refreshed.total_paid, dec!(20.55));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_paid_unpaid_round_trip_restores_totals() {
    let db_dir = common::get_test_db_path("paid_round_trip");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Chandra")).await.unwrap();
        let entry = ledger
            .create_entry(new_entry(&customer.id, dec!(350)))
            .await
            .unwrap();
        let before = ledger.get_customer(&customer.id).unwrap();

        ledger
            .set_payment_status(
                &entry.id,
                PaymentUpdate {
                    is_paid: true,
                    paid_amount: dec!(350),
                },
            )
            .await
            .unwrap();
        ledger
            .set_payment_status(
                &entry.id,
                PaymentUpdate {
                    is_paid: false,
                    paid_amount: Decimal::ZERO,
                },
            )
            .await
            .unwrap();

        let after = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(after.total_credit, before.total_credit);
        assert_eq!(after.total_paid, before.total_paid);
        assert_eq!(after.outstanding_balance, before.outstanding_balance);
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_overpayment_surfaces_instead_of_clamping() {
    let db_dir = common::get_test_db_path("overpayment");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Deepa")).await.unwrap();
        let entry = ledger
            .create_entry(new_entry(&customer.id, dec!(100)))
            .await
            .unwrap();

        // Paying more than the amount is recorded as-is
        let paid = ledger
            .set_payment_status(
                &entry.id,
                PaymentUpdate {
                    is_paid: true,
                    paid_amount: dec!(150),
                },
            )
            .await
            .unwrap();
        assert!(paid.is_overpaid());
        assert_eq!(paid.outstanding(), dec!(-50));

        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.outstanding_balance, dec!(-50));
        assert!(refreshed.is_overpaid());
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_invalid_entry_leaves_totals_unchanged() {
    let db_dir = common::get_test_db_path("invalid_entry");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Esha")).await.unwrap();
        ledger
            .create_entry(new_entry(&customer.id, dec!(75)))
            .await
            .unwrap();

        let zero = ledger.create_entry(new_entry(&customer.id, Decimal::ZERO)).await;
        assert!(matches!(zero, Err(Error::Validation(_))));

        let negative = ledger.create_entry(new_entry(&customer.id, dec!(-10))).await;
        assert!(matches!(negative, Err(Error::Validation(_))));

        // An entry against a customer that does not exist is a validation
        // failure too, and writes nothing
        let dangling = ledger.create_entry(new_entry("no-such-customer", dec!(10))).await;
        assert!(matches!(dangling, Err(Error::Validation(_))));

        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(75));
        assert_eq!(refreshed.outstanding_balance, dec!(75));
        assert_eq!(ledger.dashboard().unwrap().total_credit_entries, 1);
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_cascade_delete_leaves_no_orphans() {
    let db_dir = common::get_test_db_path("cascade_delete");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let keep = ledger.create_customer(new_customer("Farid")).await.unwrap();
        let gone = ledger.create_customer(new_customer("Gita")).await.unwrap();

        ledger.create_entry(new_entry(&keep.id, dec!(40))).await.unwrap();
        ledger.create_entry(new_entry(&gone.id, dec!(60))).await.unwrap();
        ledger.create_entry(new_entry(&gone.id, dec!(25))).await.unwrap();

        ledger.delete_customer(&gone.id).await.unwrap();

        let missing = ledger.get_customer(&gone.id);
        assert!(matches!(
            missing,
            Err(Error::Customer(CustomerError::NotFound(_)))
        ));
        assert!(ledger.get_entries(&gone.id).unwrap().is_empty());

        // The other aggregate is untouched
        let kept = ledger.get_customer(&keep.id).unwrap();
        assert_eq!(kept.total_credit, dec!(40));

        let summary = ledger.dashboard().unwrap();
        assert_eq!(summary.total_customers, 1);
        assert_eq!(summary.total_credit_entries, 1);
        assert_eq!(summary.total_credit, dec!(40));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_dashboard_sums_customer_derived_fields() {
    let db_dir = common::get_test_db_path("dashboard_sums");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let a = ledger.create_customer(new_customer("Hana")).await.unwrap();
        let b = ledger.create_customer(new_customer("Imran")).await.unwrap();

        let entry_a = ledger.create_entry(new_entry(&a.id, dec!(300))).await.unwrap();
        ledger.create_entry(new_entry(&b.id, dec!(450.50))).await.unwrap();
        ledger
            .set_payment_status(
                &entry_a.id,
                PaymentUpdate {
                    is_paid: false,
                    paid_amount: dec!(100),
                },
            )
            .await
            .unwrap();

        let customers = ledger.list_customers().unwrap();
        let summary = ledger.dashboard().unwrap();

        let expected_credit: Decimal = customers.iter().map(|c| c.total_credit).sum();
        let expected_paid: Decimal = customers.iter().map(|c| c.total_paid).sum();
        let expected_outstanding: Decimal =
            customers.iter().map(|c| c.outstanding_balance).sum();

        assert_eq!(summary.total_customers, 2);
        assert_eq!(summary.total_credit_entries, 2);
        assert_eq!(summary.total_credit, expected_credit);
        assert_eq!(summary.total_paid, expected_paid);
        assert_eq!(summary.total_outstanding, expected_outstanding);
        assert_eq!(summary.total_credit, dec!(750.50));
        assert_eq!(summary.total_outstanding, dec!(650.50));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_entry_update_recomputes_totals() {
    let db_dir = common::get_test_db_path("entry_update");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Joy")).await.unwrap();
        let entry = ledger
            .create_entry(new_entry(&customer.id, dec!(90)))
            .await
            .unwrap();

        let updated = ledger
            .update_entry(CreditEntryUpdate {
                id: entry.id.clone(),
                amount: Some(dec!(140)),
                description: Some("rice and oil".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.amount, dec!(140));
        assert_eq!(updated.customer_id, customer.id);

        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(140));

        // Non-positive amounts are rejected without touching state
        let rejected = ledger
            .update_entry(CreditEntryUpdate {
                id: entry.id.clone(),
                amount: Some(dec!(-5)),
                ..Default::default()
            })
            .await;
        assert!(matches!(rejected, Err(Error::Validation(_))));
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(140));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_missing_targets_are_not_found() {
    let db_dir = common::get_test_db_path("missing_targets");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let deleted = ledger.delete_entry("missing-entry").await;
        assert!(matches!(deleted, Err(Error::Entry(_))));

        let updated = ledger
            .update_entry(CreditEntryUpdate {
                id: "missing-entry".to_string(),
                amount: Some(dec!(10)),
                ..Default::default()
            })
            .await;
        assert!(matches!(updated, Err(Error::Entry(_))));

        let removed = ledger.delete_customer("missing-customer").await;
        assert!(matches!(removed, Err(Error::Customer(_))));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_customer_update_preserves_derived_totals() {
    let db_dir = common::get_test_db_path("customer_update");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        // Creation with an empty or whitespace-only name never writes
        let rejected = ledger.create_customer(new_customer("  ")).await;
        assert!(matches!(rejected, Err(Error::Validation(_))));
        assert!(ledger.list_customers().unwrap().is_empty());

        let customer = ledger.create_customer(new_customer("Kiran")).await.unwrap();
        ledger
            .create_entry(new_entry(&customer.id, dec!(220)))
            .await
            .unwrap();

        let updated = ledger
            .update_customer(CustomerUpdate {
                id: Some(customer.id.clone()),
                name: "Kiran Devi".to_string(),
                phone: None,
                address: Some("Market Road".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Kiran Devi");
        assert_eq!(updated.total_credit, dec!(220));
        assert_eq!(updated.outstanding_balance, dec!(220));

        // Whitespace-only names are rejected
        let rejected = ledger
            .update_customer(CustomerUpdate {
                id: Some(customer.id.clone()),
                name: "   ".to_string(),
                phone: None,
                address: None,
            })
            .await;
        assert!(matches!(rejected, Err(Error::Validation(_))));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_payment_status_rejects_bad_targets_and_amounts() {
    let db_dir = common::get_test_db_path("payment_rejections");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Omar")).await.unwrap();
        let entry = ledger
            .create_entry(new_entry(&customer.id, dec!(80)))
            .await
            .unwrap();

        // A negative paid amount never reaches the store
        let negative = ledger
            .set_payment_status(
                &entry.id,
                PaymentUpdate {
                    is_paid: true,
                    paid_amount: dec!(-1),
                },
            )
            .await;
        assert!(matches!(negative, Err(Error::Validation(_))));

        let fetched = ledger.get_entry(&entry.id).unwrap();
        assert!(!fetched.is_paid);
        assert_eq!(fetched.paid_amount, Decimal::ZERO);
        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_paid, Decimal::ZERO);
        assert_eq!(refreshed.outstanding_balance, dec!(80));

        let missing = ledger
            .set_payment_status(
                "missing-entry",
                PaymentUpdate {
                    is_paid: true,
                    paid_amount: dec!(10),
                },
            )
            .await;
        assert!(matches!(
            missing,
            Err(Error::Entry(EntryError::NotFound(_)))
        ));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_customer_creation_timestamps_round_trip() {
    let db_dir = common::get_test_db_path("customer_timestamps");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let first = ledger.create_customer(new_customer("Priya")).await.unwrap();
        let second = ledger.create_customer(new_customer("Qadir")).await.unwrap();

        // The stored row carries the same creation instant the create call
        // returned
        let fetched = ledger.get_customer(&first.id).unwrap();
        assert_eq!(fetched.created_at, first.created_at);
        assert_eq!(fetched.updated_at, first.updated_at);

        // Same-second creations still list newest first
        let listed = ledger.list_customers().unwrap();
        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_entries_ordered_by_date_desc_with_stable_ties() {
    let db_dir = common::get_test_db_path("entry_ordering");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Lata")).await.unwrap();
        let shared_date = Utc::now();

        let older = NewCreditEntry {
            entry_date: shared_date - chrono::Duration::days(2),
            ..new_entry(&customer.id, dec!(10))
        };
        let tie_first = NewCreditEntry {
            entry_date: shared_date,
            ..new_entry(&customer.id, dec!(20))
        };
        let tie_second = NewCreditEntry {
            entry_date: shared_date,
            ..new_entry(&customer.id, dec!(30))
        };

        let older = ledger.create_entry(older).await.unwrap();
        let tie_first = ledger.create_entry(tie_first).await.unwrap();
        let tie_second = ledger.create_entry(tie_second).await.unwrap();

        let listed = ledger.get_entries(&customer.id).unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();

        // Newest date first; same-date entries keep creation order
        assert_eq!(ids, vec![
            tie_first.id.as_str(),
            tie_second.id.as_str(),
            older.id.as_str(),
        ]);
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_concurrent_entry_creation_loses_no_update() {
    let db_dir = common::get_test_db_path("concurrent_creates");
    let pool = common::setup_pool(&db_dir);
    let ledger = Arc::new(LedgerService::new(pool));

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Mira")).await.unwrap();

        let first = ledger.create_entry(new_entry(&customer.id, dec!(100)));
        let second = ledger.create_entry(new_entry(&customer.id, dec!(150)));
        let (first, second) = tokio::join!(first, second);
        first.unwrap();
        second.unwrap();

        let refreshed = ledger.get_customer(&customer.id).unwrap();
        assert_eq!(refreshed.total_credit, dec!(250));
        assert_eq!(refreshed.outstanding_balance, dec!(250));
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_customer_update_races_entry_creation() {
    let db_dir = common::get_test_db_path("customer_update_race");
    let pool = common::setup_pool(&db_dir);
    let ledger = Arc::new(LedgerService::new(pool));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap();

    rt.block_on(async {
        let customer = ledger.create_customer(new_customer("Rehana")).await.unwrap();

        // Renaming the customer while entries land must never roll the
        // derived totals back to an earlier snapshot
        for i in 0..10u32 {
            let creator = {
                let ledger = ledger.clone();
                let customer_id = customer.id.clone();
                tokio::spawn(
                    async move { ledger.create_entry(new_entry(&customer_id, dec!(1))).await },
                )
            };
            let renamer = {
                let ledger = ledger.clone();
                let customer_id = customer.id.clone();
                tokio::spawn(async move {
                    ledger
                        .update_customer(CustomerUpdate {
                            id: Some(customer_id),
                            name: format!("Rehana {}", i),
                            phone: None,
                            address: None,
                        })
                        .await
                })
            };
            creator.await.unwrap().unwrap();
            renamer.await.unwrap().unwrap();

            let refreshed = ledger.get_customer(&customer.id).unwrap();
            assert_eq!(refreshed.total_credit, Decimal::from(i + 1));
            assert_eq!(refreshed.outstanding_balance, Decimal::from(i + 1));
        }
    });

    common::delete_db_file(&db_dir);
}

#[test]
fn test_image_data_passes_through_opaquely() {
    let db_dir = common::get_test_db_path("image_passthrough");
    let pool = common::setup_pool(&db_dir);
    let ledger = LedgerService::new(pool);

    tokio_test::block_on(async {
        let customer = ledger.create_customer(new_customer("Noor")).await.unwrap();
        let blob = "iVBORw0KGgoAAAANSUhEUg==".to_string();

        let entry = ledger
            .create_entry(NewCreditEntry {
                image_data: Some(blob.clone()),
                ..new_entry(&customer.id, dec!(15))
            })
            .await
            .unwrap();
        assert_eq!(entry.image_data.as_deref(), Some(blob.as_str()));

        let fetched = ledger.get_entry(&entry.id).unwrap();
        assert_eq!(fetched.image_data.as_deref(), Some(blob.as_str()));
    });

    common::delete_db_file(&db_dir);
}
