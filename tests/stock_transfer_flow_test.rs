mod common;

use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{actor, drain_events, transfer_service};
use warehouse_workflow::events::Event;
use warehouse_workflow::services::{AddTransferItem, CreateStockTransfer};
use warehouse_workflow::workflow::stock_transfer::{ItemReceipt, ItemShipment};
use warehouse_workflow::{Role, TransferStatus, WorkflowError};

fn create_input() -> CreateStockTransfer {
    CreateStockTransfer {
        source_location_id: Uuid::new_v4(),
        destination_location_id: Uuid::new_v4(),
        notes: None,
    }
}

fn item(qty: rust_decimal::Decimal) -> AddTransferItem {
    AddTransferItem {
        product_id: Uuid::new_v4(),
        requested_qty: qty,
        unit_price: dec!(10),
        notes: None,
    }
}

#[tokio::test]
async fn full_transfer_lifecycle() {
    let (service, mut events) = transfer_service();
    let warehouse = actor(Role::Warehouse);
    let manager = actor(Role::ContractManager);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Draft);
    assert_eq!(
        transfer.transfer_number,
        format!("TR-{}-0001", Utc::now().year())
    );

    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    assert_eq!(transfer.total_items, 1);

    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Pending);

    let transfer = service.approve(transfer.id, &manager).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);

    let shipments = vec![ItemShipment {
        item_id: transfer.items[0].id,
        shipped_qty: dec!(5),
    }];
    let transfer = service.ship(transfer.id, &warehouse, &shipments).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::InTransit);
    assert_eq!(transfer.items[0].shipped_qty, Some(dec!(5)));

    let receipts = vec![ItemReceipt {
        item_id: transfer.items[0].id,
        received_qty: dec!(5),
    }];
    let transfer = service
        .receive(transfer.id, &warehouse, &receipts)
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Received);
    assert_eq!(transfer.items[0].received_qty, Some(dec!(5)));

    let err = service
        .cancel(transfer.id, &actor(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    assert_eq!(
        drain_events(&mut events),
        vec![
            Event::StockTransferSubmitted(transfer.id),
            Event::StockTransferApproved(transfer.id),
            Event::StockTransferShipped(transfer.id),
            Event::StockTransferReceived(transfer.id),
        ]
    );
}

#[tokio::test]
async fn rejected_transfer_cannot_ship() {
    let (service, mut events) = transfer_service();
    let warehouse = actor(Role::Warehouse);
    let manager = actor(Role::ContractManager);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();

    let transfer = service
        .reject(transfer.id, &manager, "saldo insuficiente")
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Rejected);
    assert_eq!(transfer.rejection_reason.as_deref(), Some("saldo insuficiente"));

    let shipments = vec![ItemShipment {
        item_id: transfer.items[0].id,
        shipped_qty: dec!(5),
    }];
    let err = service
        .ship(transfer.id, &warehouse, &shipments)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WorkflowError::InvalidTransition {
            transition: "ship",
            current: "REJECTED".into()
        }
    );

    let events = drain_events(&mut events);
    assert!(events.contains(&Event::StockTransferRejected(transfer.id)));
}

#[tokio::test]
async fn over_quantity_shipment_is_rejected_and_nothing_persists() {
    let (service, _events) = transfer_service();
    let warehouse = actor(Role::Warehouse);
    let manager = actor(Role::ContractManager);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();
    let transfer = service.approve(transfer.id, &manager).await.unwrap();

    let shipments = vec![ItemShipment {
        item_id: transfer.items[0].id,
        shipped_qty: dec!(7),
    }];
    let err = service
        .ship(transfer.id, &warehouse, &shipments)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    let stored = service.get(transfer.id).await.unwrap();
    assert_eq!(stored.status, TransferStatus::Approved);
    assert_eq!(stored.items[0].shipped_qty, None);
}

#[tokio::test]
async fn receive_cannot_exceed_shipped_quantity() {
    let (service, _events) = transfer_service();
    let warehouse = actor(Role::Warehouse);
    let manager = actor(Role::ContractManager);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();
    let transfer = service.approve(transfer.id, &manager).await.unwrap();

    let shipments = vec![ItemShipment {
        item_id: transfer.items[0].id,
        shipped_qty: dec!(4),
    }];
    let transfer = service.ship(transfer.id, &warehouse, &shipments).await.unwrap();

    let receipts = vec![ItemReceipt {
        item_id: transfer.items[0].id,
        received_qty: dec!(5),
    }];
    let err = service
        .receive(transfer.id, &warehouse, &receipts)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));

    let stored = service.get(transfer.id).await.unwrap();
    assert_eq!(stored.status, TransferStatus::InTransit);
    assert_eq!(stored.items[0].received_qty, None);
}

#[tokio::test]
async fn create_rejects_same_source_and_destination() {
    let (service, _events) = transfer_service();
    let location = Uuid::new_v4();
    let input = CreateStockTransfer {
        source_location_id: location,
        destination_location_id: location,
        notes: None,
    };
    let err = service
        .create(input, &actor(Role::Warehouse))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidArgument(_)));
}

#[tokio::test]
async fn items_are_editable_only_in_draft() {
    let (service, _events) = transfer_service();
    let warehouse = actor(Role::Warehouse);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();

    let err = service
        .add_item(transfer.id, item(dec!(1)), &warehouse)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn approval_requires_contract_manager_or_admin() {
    let (service, _events) = transfer_service();
    let warehouse = actor(Role::Warehouse);

    let transfer = service.create(create_input(), &warehouse).await.unwrap();
    let transfer = service
        .add_item(transfer.id, item(dec!(5)), &warehouse)
        .await
        .unwrap();
    let transfer = service.submit(transfer.id, &warehouse).await.unwrap();

    let err = service.approve(transfer.id, &warehouse).await.unwrap_err();
    assert_eq!(
        err,
        WorkflowError::PermissionDenied {
            role: Role::Warehouse,
            capability: warehouse_workflow::Capability::TransfersApprove
        }
    );
}
