use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

/// Operator tool for the MSME Business Hub API
#[derive(Parser, Debug)]
#[command(name = "msme-hub")]
#[command(about = "client cli used by shop staff to interact with the server", version, long_about = None)]
struct Cli {
    #[arg(long, env = "MSME_HUB_URL", default_value = "http://localhost:8080")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// check that the server is up
    Status,
    /// bill related ops
    #[command(arg_required_else_help = true)]
    Bill(BillArgs),
    /// inventory related ops
    #[command(arg_required_else_help = true)]
    Inventory(InventoryArgs),
    /// revenue summary
    Report,
}

#[derive(Debug, Args)]
struct BillArgs {
    #[command(subcommand)]
    command: BillCmds,
}

#[derive(Debug, Subcommand)]
enum BillCmds {
    /// create a bill
    #[command(arg_required_else_help = true)]
    Create {
        #[arg(long, help = "Customer name")]
        customer: String,
        #[arg(long, help = "Customer phone")]
        phone: Option<String>,
        #[arg(
            long = "item",
            help = "Line item as NAME:QUANTITY:PRICE[:GST]",
            value_name = "ITEM",
            num_args = 1..,
            required = true
        )]
        items: Vec<String>,
    },
    /// show a bill with its items
    #[command(arg_required_else_help = true)]
    Get {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
    /// most recent bills
    History {
        #[arg(long)]
        page: Option<u8>,
    },
}

#[derive(Debug, Args)]
struct InventoryArgs {
    #[command(subcommand)]
    command: InventoryCmds,
}

#[derive(Debug, Subcommand)]
enum InventoryCmds {
    /// every inventory item
    List,
    /// items that can be billed
    Products,
}

/// `NAME:QUANTITY:PRICE[:GST]` into a create_bill item
fn parse_item(raw: &str) -> anyhow::Result<Value> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [name, quantity, price] => Ok(json!({"name": name, "quantity": quantity, "price": price})),
        [name, quantity, price, gst] => {
            Ok(json!({"name": name, "quantity": quantity, "price": price, "gst": gst}))
        }
        _ => bail!("invalid item {raw:?}, expected NAME:QUANTITY:PRICE[:GST]"),
    }
}

async fn print_response(res: Response) -> anyhow::Result<()> {
    let status = res.status();
    let body: Value = res.json().await.context("failed to read response, aborting")?;
    match status {
        StatusCode::OK => println!("{}", serde_json::to_string_pretty(&body)?),
        StatusCode::NOT_FOUND => println!("Resource not found"),
        unexpected => println!(
            "got status code {}, {}",
            unexpected,
            body["message"].as_str().unwrap_or("no message")
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let client = Client::new();
    let url = |path: &str| format!("{}{}", args.host.trim_end_matches('/'), path);

    let res = match args.command {
        Commands::Status => client.get(url("/api/status")).send().await?,
        Commands::Report => client.get(url("/api/reports/summary")).send().await?,
        Commands::Bill(bill) => match bill.command {
            BillCmds::Create { customer, phone, items } => {
                let items = items.iter().map(|i| parse_item(i)).collect::<anyhow::Result<Vec<_>>>()?;
                println!("creating bill for {} with {} items", customer, items.len());
                client
                    .post(url("/api/create_bill"))
                    .json(&json!({"customerName": customer, "customerPhone": phone, "items": items}))
                    .send()
                    .await?
            }
            BillCmds::Get { id } => client.get(url(&format!("/api/bill/{id}"))).send().await?,
            BillCmds::History { page } => {
                let mut req = client.get(url("/api/bill_history"));
                if let Some(page) = page {
                    req = req.query(&[("page", page)]);
                }
                req.send().await?
            }
        },
        Commands::Inventory(inventory) => match inventory.command {
            InventoryCmds::List => client.get(url("/api/inventory")).send().await?,
            InventoryCmds::Products => client.get(url("/api/products")).send().await?,
        },
    };
    print_response(res).await
}
