use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use storefront::cart::{CartStore, CheckoutOutcome, CheckoutReturn, MenuId, MenuSnapshot, Size};
use storefront::pricing::{self, format_price, PricedLine};

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "client cli used by customers to browse the menu, fill a cart and check out", version, long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// list the menu
    Menu,
    /// local cart related ops
    #[command(arg_required_else_help = true)]
    Cart(CartArgs),
    /// submit the cart and print the hosted checkout url
    #[command(arg_required_else_help = true)]
    Checkout(CheckoutArgs),
    /// list orders, or show one with --order
    #[command(arg_required_else_help = true)]
    Orders {
        #[arg(short = 'u', long, help = "Signed-in user id")]
        user: i64,
        #[arg(long, help = "Order id to show")]
        order: Option<i64>,
    },
    #[command(arg_required_else_help = true)]
    Profile {
        #[arg(short = 'u', long, help = "Signed-in user id")]
        user: i64,
    },
    /// update delivery contact of the profile
    #[command(arg_required_else_help = true)]
    Contact {
        #[arg(short = 'u', long, help = "Signed-in user id")]
        user: i64,
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        phone: String,
    },
    #[command(arg_required_else_help = true)]
    Register(RegisterArgs),
}

#[derive(Debug, Args)]
struct CartArgs {
    #[command(subcommand)]
    command: CartCmds,
}

#[derive(Debug, Subcommand)]
enum CartCmds {
    /// add a menu item, merging with an existing line of the same size
    #[command(arg_required_else_help = true)]
    Add {
        #[arg(help = "Menu item id", value_parser = clap::value_parser!(i64).range(1..))]
        menu_id: MenuId,
        #[arg(short, long, default_value = "NORMAL", help = "SMALL or NORMAL")]
        size: Size,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    #[command(arg_required_else_help = true)]
    Remove(LineArgs),
    #[command(arg_required_else_help = true)]
    Inc(LineArgs),
    /// decrease quantity, a line never goes below 1
    #[command(arg_required_else_help = true)]
    Dec(LineArgs),
    Clear,
    Show,
    /// feed back the url the hosted checkout redirected to
    #[command(arg_required_else_help = true)]
    Return {
        #[arg(help = "Redirect url or its query string")]
        url: String,
    },
}

#[derive(Debug, Args)]
struct LineArgs {
    #[arg(help = "Menu item id")]
    menu_id: MenuId,
    #[arg(short, long, default_value = "NORMAL", help = "SMALL or NORMAL")]
    size: Size,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    #[arg(short = 'u', long, help = "Signed-in user id")]
    user: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    phone: String,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
}

const DEFAULT_HOST: &str = "http://localhost:8080";
const DEFAULT_CART_PATH: &str = "cart.json";
const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MenuItem {
    id: MenuId,
    name: String,
    price: Decimal,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetMenuResponse {
    menu: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    stripe_session_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLine {
    name: String,
    size: Size,
    quantity: u32,
    line_total: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderView {
    id: i64,
    paid: bool,
    created_at: String,
    cart_items: Vec<OrderLine>,
    formatted_total: String,
}

#[derive(Debug, Deserialize)]
struct GetOrdersResponse {
    orders: Vec<OrderView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetOrderResponse {
    order_item: OrderView,
}

#[derive(Debug, Deserialize)]
struct GetProfileResponse {
    profile: serde_json::Value,
}

struct Api {
    http: Client,
    host: String,
}

impl Api {
    fn new() -> Self {
        Self {
            http: Client::new(),
            host: env::var("STOREFRONT_HOST").unwrap_or(DEFAULT_HOST.to_string()),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(format!("{}/api/{}", self.host, path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(format!("{}/api/{}", self.host, path))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(format!("{}/api/{}", self.host, path))
    }

    async fn menu(&self) -> anyhow::Result<Vec<MenuItem>> {
        let res = expect_status(self.get("menu").send().await?, StatusCode::OK).await?;
        Ok(res.json::<GetMenuResponse>().await?.menu)
    }
}

/// Fail with the server's message unless `res` has `status`
async fn expect_status(res: Response, status: StatusCode) -> anyhow::Result<Response> {
    if res.status() == status {
        return Ok(res);
    }
    let unexpected = res.status();
    match res.json::<MessageResponse>().await {
        Ok(body) => bail!("{}: {}", unexpected, body.message),
        Err(_) => bail!("got unexpected status code, {}", unexpected),
    }
}

fn open_cart() -> anyhow::Result<CartStore> {
    let path = env::var("STOREFRONT_CART").unwrap_or(DEFAULT_CART_PATH.to_string());
    CartStore::open(&path).with_context(|| format!("failed to open cart at {path}"))
}

fn print_cart(store: &CartStore) {
    let cart = store.cart();
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>4} {:<24} {:<6} x{:<3} {}",
            item.menu.id,
            item.menu.name,
            item.size,
            item.quantity,
            format_price(item.line_total())
        );
    }
    println!("subtotal {}", format_price(cart.subtotal()));
    println!("delivery {}", format_price(pricing::DELIVERY_FEE));
    println!("total    {}", format_price(cart.total()));
}

fn print_order(order: &OrderView) {
    println!(
        "order {} created {} {} total {}",
        order.id,
        order.created_at,
        if order.paid { "paid" } else { "unpaid" },
        order.formatted_total
    );
    for line in &order.cart_items {
        println!(
            "    {:<24} {:<6} x{:<3} {}",
            line.name,
            line.size,
            line.quantity,
            format_price(line.line_total)
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let args = Cli::parse();
    let api = Api::new();

    match args.command {
        Commands::Menu => {
            for item in api.menu().await? {
                println!(
                    "{:>4} {:<24} {:<12} {}",
                    item.id,
                    item.name,
                    item.category.unwrap_or_default(),
                    format_price(item.price)
                );
            }
        }
        Commands::Cart(cart) => {
            let mut store = open_cart()?;
            match cart.command {
                CartCmds::Add {
                    menu_id,
                    size,
                    quantity,
                } => {
                    let item = api
                        .menu()
                        .await?
                        .into_iter()
                        .find(|item| item.id == menu_id)
                        .with_context(|| format!("menu item {menu_id} does not exist"))?;
                    store.add_to_cart(
                        MenuSnapshot {
                            id: item.id,
                            name: item.name,
                            price: item.price,
                        },
                        size,
                        quantity,
                    )?;
                    print_cart(&store);
                }
                CartCmds::Remove(line) => {
                    if !store.remove_from_cart(line.menu_id, line.size)? {
                        println!("menu item {} ({}) is not in the cart", line.menu_id, line.size);
                    }
                    print_cart(&store);
                }
                CartCmds::Inc(line) => {
                    if !store.increase_quantity(line.menu_id, line.size)? {
                        println!("menu item {} ({}) is not in the cart", line.menu_id, line.size);
                    }
                    print_cart(&store);
                }
                CartCmds::Dec(line) => {
                    store.decrease_quantity(line.menu_id, line.size)?;
                    print_cart(&store);
                }
                CartCmds::Clear => {
                    store.clear_cart()?;
                    println!("cart cleared");
                }
                CartCmds::Show => print_cart(&store),
                CartCmds::Return { url } => {
                    let ret = url.parse::<CheckoutReturn>()?;
                    match ret.outcome {
                        CheckoutOutcome::Success => {
                            if store.observe_checkout_return(&ret)? {
                                println!("order {} paid, cart cleared", ret.order_id);
                            } else {
                                println!("order {} already settled", ret.order_id);
                            }
                        }
                        CheckoutOutcome::Canceled => {
                            println!("checkout of order {} canceled, cart kept", ret.order_id);
                        }
                    }
                }
            }
        }
        Commands::Checkout(args) => {
            let store = open_cart()?;
            if store.cart().is_empty() {
                bail!("cart is empty, add something first");
            }
            println!("submitting cart, total {}", format_price(store.cart().total()));
            let res = api
                .post("checkout")
                .header(USER_ID_HEADER, args.user)
                .json(&serde_json::json!({
                    "cart": store.cart(),
                    "userId": args.user,
                    "customerName": args.name,
                    "email": args.email,
                    "street": args.street,
                    "city": args.city,
                    "phone": args.phone,
                }))
                .send()
                .await?;
            let res = expect_status(res, StatusCode::CREATED).await?;
            let res = res.json::<CreateOrderResponse>().await?;
            println!("complete payment at {}", res.stripe_session_url);
        }
        Commands::Orders { user, order } => match order {
            Some(order) => {
                let res = api
                    .get(&format!("user/{user}/orders/{order}"))
                    .header(USER_ID_HEADER, user)
                    .send()
                    .await?;
                let res = expect_status(res, StatusCode::OK).await?;
                print_order(&res.json::<GetOrderResponse>().await?.order_item);
            }
            None => {
                let res = api
                    .get(&format!("user/{user}/orders"))
                    .header(USER_ID_HEADER, user)
                    .send()
                    .await?;
                let res = expect_status(res, StatusCode::OK).await?;
                let orders = res.json::<GetOrdersResponse>().await?.orders;
                if orders.is_empty() {
                    println!("no orders yet");
                }
                orders.iter().for_each(print_order);
            }
        },
        Commands::Profile { user } => {
            let res = api
                .get(&format!("user/{user}"))
                .header(USER_ID_HEADER, user)
                .send()
                .await?;
            let res = expect_status(res, StatusCode::OK).await?;
            let profile = res.json::<GetProfileResponse>().await?.profile;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Contact {
            user,
            street,
            city,
            phone,
        } => {
            let res = api
                .put(&format!("user/{user}/contact/update"))
                .header(USER_ID_HEADER, user)
                .json(&serde_json::json!({ "street": street, "city": city, "phone": phone }))
                .send()
                .await?;
            let res = expect_status(res, StatusCode::OK).await?;
            println!("{}", res.json::<MessageResponse>().await?.message);
        }
        Commands::Register(args) => {
            let res = api
                .post("auth/register")
                .json(&serde_json::json!({
                    "username": args.username,
                    "email": args.email,
                    "street": args.street,
                    "city": args.city,
                    "phone": args.phone,
                    "password": args.password,
                    "confirmPassword": args.confirm_password,
                }))
                .send()
                .await?;
            let res = expect_status(res, StatusCode::CREATED).await?;
            println!("{}", res.json::<MessageResponse>().await?.message);
        }
    }
    Ok(())
}
