mod common;

use asset_api::{
    commands::assets::{
        AssetUpdateInput, BatchDisposition, BulkCreateAssetsCommand, FailureKind,
    },
    entities::enums::AssetStatus,
    errors::ServiceError,
};
use common::{asset_input, po_command, TestApp};
use uuid::Uuid;

#[tokio::test]
async fn one_bad_item_does_not_abort_the_batch() {
    let app = TestApp::new().await;
    let assets = &app.state.assets;

    let mut bad = asset_input("ghost-model", Some("SN-G3"));
    bad.model_id = Some(Uuid::new_v4()); // no such model

    let outcome = assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![
                asset_input("node-01", Some("SN-G1")),
                asset_input("node-02", Some("SN-G2")),
                bad,
                asset_input("node-04", Some("SN-G4")),
                asset_input("node-05", Some("SN-G5")),
            ],
        })
        .await
        .expect("bulk call itself succeeds");

    assert_eq!(outcome.total, 5);
    assert_eq!(outcome.succeeded, 4);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.disposition, BatchDisposition::PartialSuccess);

    let failure = outcome
        .results
        .iter()
        .find(|r| !r.succeeded())
        .expect("one failure");
    assert_eq!(failure.index, 2);
    assert_eq!(failure.identifier, "SN-G3");
    let detail = failure.failure.as_ref().unwrap();
    assert_eq!(detail.kind, FailureKind::MissingReference);
    assert_eq!(detail.field.as_deref(), Some("model_id"));

    // The four valid assets are persisted and independently retrievable.
    for serial in ["SN-G1", "SN-G2", "SN-G4", "SN-G5"] {
        assert!(
            assets.find_by_serial_number(serial).await.unwrap().is_some(),
            "{serial} should exist"
        );
    }
    assert!(assets.find_by_serial_number("SN-G3").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_serial_is_an_integrity_failure_for_that_item_only() {
    let app = TestApp::new().await;
    let assets = &app.state.assets;

    let outcome = assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![
                asset_input("disk-01", Some("SN-DUP")),
                asset_input("disk-02", Some("SN-DUP")),
                asset_input("disk-03", Some("SN-OK")),
            ],
        })
        .await
        .expect("bulk call succeeds");

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);

    let failure = &outcome.results[1];
    assert!(!failure.succeeded());
    let detail = failure.failure.as_ref().unwrap();
    assert_eq!(detail.kind, FailureKind::Integrity);
    assert_eq!(detail.field.as_deref(), Some("serial_number"));
}

#[tokio::test]
async fn validation_failures_carry_field_and_fall_back_to_index_identifier() {
    let app = TestApp::new().await;
    let assets = &app.state.assets;

    let mut nameless = asset_input("", None);
    nameless.status = Some("In stock".to_string());
    let mut bad_status = asset_input("radio-01", Some("SN-V2"));
    bad_status.status = Some("vaporized".to_string());

    let outcome = assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![nameless, bad_status],
        })
        .await
        .expect("bulk call succeeds");

    assert_eq!(outcome.disposition, BatchDisposition::AllFailed);

    let first = outcome.results[0].failure.as_ref().unwrap();
    assert_eq!(first.kind, FailureKind::Validation);
    assert_eq!(first.field.as_deref(), Some("name"));
    assert_eq!(outcome.results[0].identifier, "#0");

    let second = outcome.results[1].failure.as_ref().unwrap();
    assert_eq!(second.kind, FailureKind::Validation);
    assert_eq!(second.field.as_deref(), Some("status"));
    assert_eq!(outcome.results[1].identifier, "SN-V2");
}

#[tokio::test]
async fn scoped_creation_validates_po_once_and_injects_shared_fields() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-BULK-1", 10))
        .await
        .expect("create po");

    let outcome = assets
        .create_assets_for_po(
            "PO-BULK-1",
            vec![
                asset_input("rack-01", Some("SN-R1")),
                asset_input("rack-02", Some("SN-R2")),
            ],
        )
        .await
        .expect("scoped bulk create");
    assert_eq!(outcome.succeeded, 2);

    for serial in ["SN-R1", "SN-R2"] {
        let created = assets.find_by_serial_number(serial).await.unwrap().unwrap();
        assert_eq!(created.po_number.as_deref(), Some("PO-BULK-1"));
        assert_eq!(created.invoice_number.as_deref(), Some("INV-PO-BULK-1"));
        assert_eq!(created.status, AssetStatus::InStock);
    }

    // A missing scoped PO fails the whole call, not per item.
    let err = assets
        .create_assets_for_po("PO-NOPE", vec![asset_input("x", Some("SN-X"))])
        .await
        .expect_err("missing po is fatal");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn model_resolution_fills_type_and_make() {
    let app = TestApp::new().await;
    let assets = &app.state.assets;

    let model = app.seed_model("Latitude 7440", "Laptop", "Dell").await;

    let mut item = asset_input("lt-01", Some("SN-MODEL"));
    item.model_id = Some(model.id);

    let outcome = assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![item],
        })
        .await
        .expect("bulk create");
    assert_eq!(outcome.succeeded, 1);

    let created = assets
        .find_by_serial_number("SN-MODEL")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.asset_type.as_deref(), Some("Laptop"));
    assert_eq!(created.make.as_deref(), Some("Dell"));
}

#[tokio::test]
async fn capacity_is_advisory_never_a_rejection() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-CAP-1", 2))
        .await
        .expect("create po");

    // Five assets against a quota of two.
    let outcome = assets
        .create_assets_for_po(
            "PO-CAP-1",
            (1..=5)
                .map(|i| asset_input(&format!("cap-{i:02}"), Some(&format!("SN-CAP-{i}"))))
                .collect(),
        )
        .await
        .expect("bulk create");
    assert_eq!(outcome.succeeded, 5);

    let summary = pos.get_po_summary("PO-CAP-1").await.expect("summary");
    assert_eq!(summary.total_devices, 2);
    assert_eq!(summary.linked_assets, 5);
    assert_eq!(summary.remaining, 0);
    assert!(!summary.can_create_more);

    // A sixth creation still succeeds; the capacity note only informs.
    let outcome = assets
        .create_assets_for_po("PO-CAP-1", vec![asset_input("cap-06", Some("SN-CAP-6"))])
        .await
        .expect("bulk create over quota");
    assert_eq!(outcome.succeeded, 1);
    let note = outcome.capacity.expect("scoped batches carry the note");
    assert_eq!(note.remaining_before, 0);
    assert!(!note.can_create_more);
}

#[tokio::test]
async fn bulk_update_normalizes_status_and_refreshes_cached_po_fields() {
    let app = TestApp::new().await;
    let pos = &app.state.purchase_orders;
    let assets = &app.state.assets;

    pos.create_purchase_order(po_command("PO-UP-1", 3))
        .await
        .expect("create po a");
    pos.create_purchase_order(po_command("PO-UP-2", 3))
        .await
        .expect("create po b");

    assets
        .create_assets_for_po("PO-UP-1", vec![asset_input("mon-01", Some("SN-U1"))])
        .await
        .expect("bulk create");
    let created = assets.find_by_serial_number("SN-U1").await.unwrap().unwrap();

    let outcome = assets
        .update_assets_in_bulk(vec![AssetUpdateInput {
            id: created.id,
            name: None,
            serial_number: None,
            asset_code: None,
            status: Some("in use".to_string()),
            po_number: Some("PO-UP-2".to_string()),
            assigned_user_id: None,
            model_id: None,
            asset_type: None,
            make: None,
            os_id: None,
            vendor_id: None,
            warranty_expiry: None,
        }])
        .await
        .expect("bulk update");
    assert_eq!(outcome.succeeded, 1);

    let updated = assets.find_by_serial_number("SN-U1").await.unwrap().unwrap();
    assert_eq!(updated.status, AssetStatus::InUse);
    assert_eq!(updated.po_number.as_deref(), Some("PO-UP-2"));
    // Repointing refreshed the cached shared fields from the new PO.
    assert_eq!(updated.invoice_number.as_deref(), Some("INV-PO-UP-2"));
}

#[tokio::test]
async fn bulk_update_isolates_missing_assets_per_item() {
    let app = TestApp::new().await;
    let assets = &app.state.assets;

    assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![asset_input("cam-01", Some("SN-BU1"))],
        })
        .await
        .expect("bulk create");
    let existing = assets.find_by_serial_number("SN-BU1").await.unwrap().unwrap();

    let outcome = assets
        .update_assets_in_bulk(vec![
            AssetUpdateInput {
                id: existing.id,
                name: Some("cam-01-renamed".to_string()),
                serial_number: None,
                asset_code: None,
                status: None,
                po_number: None,
                assigned_user_id: None,
                model_id: None,
                asset_type: None,
                make: None,
                os_id: None,
                vendor_id: None,
                warranty_expiry: None,
            },
            AssetUpdateInput {
                id: Uuid::new_v4(), // no such asset
                name: Some("phantom".to_string()),
                serial_number: None,
                asset_code: None,
                status: None,
                po_number: None,
                assigned_user_id: None,
                model_id: None,
                asset_type: None,
                make: None,
                os_id: None,
                vendor_id: None,
                warranty_expiry: None,
            },
        ])
        .await
        .expect("bulk update");

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.disposition, BatchDisposition::PartialSuccess);

    let failure = outcome.results[1].failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::MissingReference);
    assert_eq!(failure.field.as_deref(), Some("id"));

    let renamed = assets.find_by_serial_number("SN-BU1").await.unwrap().unwrap();
    assert_eq!(renamed.name, "cam-01-renamed");
}

#[tokio::test]
async fn empty_batch_is_rejected_up_front() {
    let app = TestApp::new().await;
    let err = app
        .state
        .assets
        .create_assets_in_bulk(BulkCreateAssetsCommand {
            po_number: None,
            items: vec![],
        })
        .await
        .expect_err("empty batch");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}
