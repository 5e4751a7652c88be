//! Demo client for `ordermgmt-server`.
//!
//! Walks through every RPC once against a server seeded with the sample
//! orders: a lookup, an add, a search, a bulk update and a consolidation
//! stream with a count-triggered flush followed by the end-of-stream flush.

use clap::Parser;
use ordermgmt_tonic_core::proto::{
    CombinedShipment, Order, OrderId, SearchQuery, order_management_client::OrderManagementClient,
};
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tonic::{codec::CompressionEncoding, transport::Channel};

#[derive(Parser, Debug)]
#[command(
    name = "ordermgmt-client",
    version,
    about = "Exercises every OrderManagement RPC against a running server"
)]
struct ClientArgs {
    /// Server endpoint.
    #[arg(long, default_value_t = String::from("http://127.0.0.1:50051"))]
    server_addr: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = ClientArgs::parse();

    let channel = Channel::from_shared(args.server_addr)?.connect().await?;
    let mut client = OrderManagementClient::new(channel)
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd);

    println!("\n=== GetOrder ===");
    let order = client
        .get_order(OrderId {
            value: "106".to_string(),
        })
        .await?
        .into_inner();
    println!("{order:?}");

    println!("\n=== AddOrder ===");
    let ack = client
        .add_order(order_of(
            "101",
            &["iPhone XS", "Mac Book Pro"],
            "San Jose, CA",
            2300.00,
        ))
        .await?
        .into_inner();
    println!("{}", ack.message);

    println!("\n=== SearchOrders ===");
    let mut matches = client
        .search_orders(SearchQuery {
            query: "Google".to_string(),
        })
        .await?
        .into_inner();
    while let Some(order) = matches.next().await {
        let order = order?;
        println!("{}: {:?}", order.id, order.items);
    }

    println!("\n=== UpdateOrders ===");
    let updates = tokio_stream::iter(vec![
        order_of(
            "102",
            &["Google Pixel 3A", "Google Pixel Book"],
            "Mountain View, CA",
            1100.00,
        ),
        order_of(
            "103",
            &["Apple Watch S4", "Mac Book Pro", "iPad Pro"],
            "San Jose, CA",
            2800.00,
        ),
        order_of(
            "104",
            &["Google Home Mini", "Google Nest Hub", "iPad Mini"],
            "Mountain View, CA",
            2200.00,
        ),
    ]);
    let ack = client.update_orders(updates).await?.into_inner();
    println!("{}", ack.message);

    println!("\n=== ProcessOrders ===");
    let (tx, rx) = mpsc::channel(8);
    let mut shipments = client
        .process_orders(ReceiverStream::new(rx))
        .await?
        .into_inner();

    let printer = tokio::spawn(async move {
        let mut received = 0usize;
        while let Some(shipment) = shipments.next().await {
            match shipment {
                Ok(shipment) => {
                    print_shipment(&shipment);
                    received += 1;
                }
                Err(status) => {
                    eprintln!("Stream failed: {status}");
                    break;
                }
            }
        }
        received
    });

    for id in ["102", "103", "104", "101"] {
        tx.send(OrderId {
            value: id.to_string(),
        })
        .await?;
    }
    // Half-close: the server flushes what is still pending and ends the stream.
    drop(tx);

    let received = printer.await?;
    println!("{received} shipments received");

    Ok(())
}

fn order_of(id: &str, items: &[&str], destination: &str, price: f32) -> Order {
    Order {
        id: id.to_string(),
        items: items.iter().map(ToString::to_string).collect(),
        description: String::new(),
        price,
        destination: destination.to_string(),
    }
}

fn print_shipment(shipment: &CombinedShipment) {
    let ids: Vec<&str> = shipment.orders_list.iter().map(|o| o.id.as_str()).collect();
    println!(
        "{} [{}] -> {}",
        shipment.id,
        shipment.status,
        ids.join(", ")
    );
}
