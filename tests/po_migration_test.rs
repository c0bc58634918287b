mod common;

use asset_api::{
    commands::purchaseorders::{
        MigratePoNumberCommand, MigrationStrategy, PurchaseOrderPatch, UpdatePurchaseOrderCommand,
    },
    errors::ServiceError,
};
use common::{asset_input, po_command, TestApp};

#[tokio::test]
async fn in_place_migration_repoints_every_asset() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-100", 5))
        .await
        .expect("create po");
    assets
        .create_assets_for_po(
            "PO-100",
            vec![
                asset_input("srv-01", Some("SN-M1")),
                asset_input("srv-02", Some("SN-M2")),
                asset_input("srv-03", Some("SN-M3")),
            ],
        )
        .await
        .expect("bulk create");

    let result = pos
        .migrate_po_number(MigratePoNumberCommand {
            old_number: "PO-100".to_string(),
            new_number: "PO-150".to_string(),
            strategy: MigrationStrategy::InPlace,
        })
        .await
        .expect("migration succeeds");

    assert_eq!(result.assets_repointed, 3);
    assert_eq!(result.purchase_order.po_number, "PO-150");

    // Postcondition: nothing references the old number, everything
    // references the new one.
    assert!(assets.find_by_po_number("PO-100").await.unwrap().is_empty());
    assert_eq!(assets.find_by_po_number("PO-150").await.unwrap().len(), 3);
    assert!(pos.find_by_po_number("PO-100").await.unwrap().is_none());

    // The renamed PO carries all prior field values.
    let migrated = pos.find_by_po_number("PO-150").await.unwrap().unwrap();
    assert_eq!(migrated.invoice_number.as_deref(), Some("INV-PO-100"));
    assert_eq!(migrated.total_devices, 5);
}

#[tokio::test]
async fn copy_and_swap_migration_is_observably_equivalent() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-200", 2))
        .await
        .expect("create po");
    assets
        .create_assets_for_po("PO-200", vec![asset_input("cam-01", Some("SN-C1"))])
        .await
        .expect("bulk create");

    let result = pos
        .migrate_po_number(MigratePoNumberCommand {
            old_number: "PO-200".to_string(),
            new_number: "PO-250".to_string(),
            strategy: MigrationStrategy::CopyAndSwap,
        })
        .await
        .expect("migration succeeds");

    assert_eq!(result.assets_repointed, 1);
    assert_eq!(result.purchase_order.po_number, "PO-250");

    assert!(pos.find_by_po_number("PO-200").await.unwrap().is_none());
    let replacement = pos.find_by_po_number("PO-250").await.unwrap().unwrap();
    assert_eq!(replacement.invoice_number.as_deref(), Some("INV-PO-200"));
    assert_eq!(replacement.total_devices, 2);

    assert!(assets.find_by_po_number("PO-200").await.unwrap().is_empty());
    assert_eq!(assets.find_by_po_number("PO-250").await.unwrap().len(), 1);
}

#[tokio::test]
async fn migration_to_existing_number_is_rejected_with_no_writes() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-300", 3))
        .await
        .expect("create po");
    pos.create_purchase_order(po_command("PO-301", 1))
        .await
        .expect("create other po");
    assets
        .create_assets_for_po(
            "PO-300",
            vec![
                asset_input("nas-01", Some("SN-N1")),
                asset_input("nas-02", Some("SN-N2")),
            ],
        )
        .await
        .expect("bulk create");

    for strategy in [MigrationStrategy::InPlace, MigrationStrategy::CopyAndSwap] {
        let err = pos
            .migrate_po_number(MigratePoNumberCommand {
                old_number: "PO-300".to_string(),
                new_number: "PO-301".to_string(),
                strategy,
            })
            .await
            .expect_err("collision must be rejected");
        assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");
    }

    // No asset or PO row was modified.
    assert_eq!(assets.find_by_po_number("PO-300").await.unwrap().len(), 2);
    assert!(assets.find_by_po_number("PO-301").await.unwrap().is_empty());
    let untouched = pos.find_by_po_number("PO-300").await.unwrap().unwrap();
    assert_eq!(untouched.invoice_number.as_deref(), Some("INV-PO-300"));
}

#[tokio::test]
async fn migration_rejects_missing_po_and_identical_numbers() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;

    let err = pos
        .migrate_po_number(MigratePoNumberCommand {
            old_number: "PO-GHOST".to_string(),
            new_number: "PO-NEW".to_string(),
            strategy: MigrationStrategy::InPlace,
        })
        .await
        .expect_err("missing po");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = pos
        .migrate_po_number(MigratePoNumberCommand {
            old_number: "PO-SAME".to_string(),
            new_number: "PO-SAME".to_string(),
            strategy: MigrationStrategy::InPlace,
        })
        .await
        .expect_err("identical numbers");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn update_with_number_change_repoints_and_syncs_in_one_pass() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    let po = pos
        .create_purchase_order(po_command("PO-400", 4))
        .await
        .expect("create po");
    assets
        .create_assets_for_po(
            "PO-400",
            vec![
                asset_input("prn-01", Some("SN-P1")),
                asset_input("prn-02", Some("SN-P2")),
            ],
        )
        .await
        .expect("bulk create");

    let result = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch {
                po_number: Some("PO-450".to_string()),
                invoice_number: Some("INV-RENUMBERED".to_string()),
                ..Default::default()
            },
        })
        .await
        .expect("update succeeds");

    assert_eq!(result.assets_repointed, 2);
    assert_eq!(result.assets_synced, 2);
    assert_eq!(result.purchase_order.po_number, "PO-450");

    let moved = assets.find_by_po_number("PO-450").await.unwrap();
    assert_eq!(moved.len(), 2);
    for linked in moved {
        assert_eq!(linked.invoice_number.as_deref(), Some("INV-RENUMBERED"));
    }
    assert!(assets.find_by_po_number("PO-400").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_number_collision_is_a_conflict() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;

    let po = pos
        .create_purchase_order(po_command("PO-500", 1))
        .await
        .expect("create po");
    pos.create_purchase_order(po_command("PO-501", 1))
        .await
        .expect("create other");

    let err = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch {
                po_number: Some("PO-501".to_string()),
                ..Default::default()
            },
        })
        .await
        .expect_err("collision");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The PO keeps its original number.
    assert!(pos.find_by_po_number("PO-500").await.unwrap().is_some());
}
