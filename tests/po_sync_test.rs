mod common;

use asset_api::commands::purchaseorders::{PurchaseOrderPatch, UpdatePurchaseOrderCommand};
use common::{asset_input, po_command, TestApp};

#[tokio::test]
async fn shared_fields_are_pushed_to_linked_assets_on_update() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    let po = pos
        .create_purchase_order(po_command("PO-SYNC-1", 5))
        .await
        .expect("create po");

    let outcome = assets
        .create_assets_for_po(
            "PO-SYNC-1",
            vec![
                asset_input("laptop-01", Some("SN-S1")),
                asset_input("laptop-02", Some("SN-S2")),
                asset_input("laptop-03", Some("SN-S3")),
            ],
        )
        .await
        .expect("bulk create");
    assert_eq!(outcome.succeeded, 3);

    // Assets inherit the PO's shared fields at creation time.
    for linked in assets.find_by_po_number("PO-SYNC-1").await.unwrap() {
        assert_eq!(linked.invoice_number.as_deref(), Some("INV-PO-SYNC-1"));
        assert_eq!(linked.acquisition_date, po.acquisition_date);
    }

    let result = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch {
                invoice_number: Some("INV-CORRECTED".to_string()),
                current_price: Some(rust_decimal_macros::dec!(799.99)),
                ..Default::default()
            },
        })
        .await
        .expect("update po");

    assert_eq!(result.assets_repointed, 0);
    assert_eq!(result.assets_synced, 3);

    for linked in assets.find_by_po_number("PO-SYNC-1").await.unwrap() {
        assert_eq!(linked.invoice_number.as_deref(), Some("INV-CORRECTED"));
        assert_eq!(
            linked.current_price,
            Some(rust_decimal_macros::dec!(799.99))
        );
    }
}

#[tokio::test]
async fn sync_is_idempotent_second_run_writes_nothing() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;

    let po = pos
        .create_purchase_order(po_command("PO-SYNC-2", 3))
        .await
        .expect("create po");

    app.state
        .assets
        .create_assets_for_po(
            "PO-SYNC-2",
            vec![
                asset_input("scanner-01", Some("SN-I1")),
                asset_input("scanner-02", Some("SN-I2")),
            ],
        )
        .await
        .expect("bulk create");

    // Assets were created from the PO, so the first explicit pass already
    // has nothing to write.
    assert_eq!(pos.resync_assets("PO-SYNC-2").await.unwrap(), 0);

    // A field change makes exactly one pass write, after which the state
    // is a fixed point again.
    let result = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch {
                invoice_number: Some("INV-NEW".to_string()),
                ..Default::default()
            },
        })
        .await
        .expect("update po");
    assert_eq!(result.assets_synced, 2);

    assert_eq!(pos.resync_assets("PO-SYNC-2").await.unwrap(), 0);
}

#[tokio::test]
async fn update_without_changes_syncs_nothing() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;

    let po = pos
        .create_purchase_order(po_command("PO-SYNC-3", 2))
        .await
        .expect("create po");

    app.state
        .assets
        .create_assets_for_po("PO-SYNC-3", vec![asset_input("dock-01", Some("SN-D1"))])
        .await
        .expect("bulk create");

    let result = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch::default(),
        })
        .await
        .expect("empty patch update");

    assert_eq!(result.assets_synced, 0);
}

#[tokio::test]
async fn sync_skips_soft_deleted_assets() {
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;

    let po = pos
        .create_purchase_order(po_command("PO-SYNC-4", 4))
        .await
        .expect("create po");

    app.state
        .assets
        .create_assets_for_po(
            "PO-SYNC-4",
            vec![
                asset_input("tablet-01", Some("SN-T1")),
                asset_input("tablet-02", Some("SN-T2")),
            ],
        )
        .await
        .expect("bulk create");

    // Soft-delete one asset out of band.
    let deleted = app
        .state
        .assets
        .find_by_serial_number("SN-T2")
        .await
        .unwrap()
        .expect("asset exists");
    let mut am = deleted.into_active_model();
    am.is_deleted = Set(true);
    am.update(app.state.db.as_ref()).await.expect("soft delete");

    let result = pos
        .update_purchase_order(UpdatePurchaseOrderCommand {
            id: po.id,
            patch: PurchaseOrderPatch {
                invoice_number: Some("INV-LIVE-ONLY".to_string()),
                ..Default::default()
            },
        })
        .await
        .expect("update po");

    assert_eq!(result.assets_synced, 1);
}
