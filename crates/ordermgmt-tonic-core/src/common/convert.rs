//! Conversions between generated wire messages and [`ordermgmt`] types.
//!
//! Inbound orders go through [`TryFrom`] so that structurally invalid messages
//! are rejected before they reach the store.

use crate::{Error, proto};
use ordermgmt::{Order, ShipmentBatch};

impl TryFrom<proto::Order> for Order {
    type Error = Error;

    fn try_from(order: proto::Order) -> Result<Self, Self::Error> {
        if order.id.is_empty() {
            return Err(Error::InvalidRequest {
                reason: "Order id must not be empty".to_string(),
            });
        }
        Ok(Self {
            id: order.id,
            items: order.items,
            description: order.description,
            price: order.price,
            destination: order.destination,
        })
    }
}

impl From<&Order> for proto::Order {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            items: order.items.clone(),
            description: order.description.clone(),
            price: order.price,
            destination: order.destination.clone(),
        }
    }
}

impl From<&ShipmentBatch> for proto::CombinedShipment {
    fn from(batch: &ShipmentBatch) -> Self {
        Self {
            id: batch.id().to_owned(),
            status: batch.status().to_owned(),
            orders_list: batch
                .orders()
                .iter()
                .map(|order| proto::Order::from(order.as_ref()))
                .collect(),
        }
    }
}

impl From<ShipmentBatch> for proto::CombinedShipment {
    fn from(batch: ShipmentBatch) -> Self {
        Self::from(&batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordermgmt::{OrderStore, ShipmentConsolidator};

    #[test]
    fn empty_id_is_invalid() {
        let err = Order::try_from(proto::Order::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn order_survives_the_wire() {
        let wire = proto::Order {
            id: "1".into(),
            items: vec!["Pixel".into()],
            description: "gift".into(),
            price: 12.5,
            destination: "MV".into(),
        };
        let order = Order::try_from(wire.clone()).unwrap();
        assert_eq!(proto::Order::from(&order), wire);
    }

    #[test]
    fn shipment_carries_id_status_and_orders() {
        let store = OrderStore::with_sample_data();
        let mut consolidator = ShipmentConsolidator::new(10);
        consolidator.accumulate(&store, "102");
        consolidator.accumulate(&store, "104");
        let batch = consolidator.flush_all().remove(0);

        let shipment = proto::CombinedShipment::from(batch);
        assert_eq!(shipment.id, "cmb-Mountain View, CA");
        assert_eq!(shipment.status, "Processed!");
        let ids: Vec<&str> = shipment.orders_list.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["102", "104"]);
    }
}
