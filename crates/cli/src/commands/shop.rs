//! Interactive shopping session.
//!
//! Reads commands line by line. `search` is debounced like a search box:
//! results print once typing pauses, and only the latest query's results
//! are shown.
//!
//! ```text
//! search <text>   search the catalog (blank lists everything)
//! list            show the last results
//! add <id> [n]    add n units (default 1)
//! inc <id>        one more unit
//! dec <id>        one fewer unit (removes at zero)
//! rm <id>         remove the line
//! cart            show the cart
//! checkout        place the order
//! quit
//! ```

#![allow(clippy::print_stdout)]

use kkomi_core::ProductId;
use kkomi_storefront::app::ExpiryAction;
use kkomi_storefront::cart::QuantityChange;
use kkomi_storefront::catalog::{ProductSearch, SearchState};
use kkomi_storefront::{App, CheckoutOutcome, ClientConfig, messages};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::catalog::print_product;
use super::{CliError, find_product, signed_in_app};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopCommand {
    Search(String),
    List,
    Add(ProductId, u32),
    Inc(ProductId),
    Dec(ProductId),
    Remove(ProductId),
    Cart,
    Checkout,
    Quit,
}

impl ShopCommand {
    /// Parse a line. `None` for anything unrecognised.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();
        let id = |arg: Option<&str>| arg?.parse::<i64>().ok().map(ProductId::new);

        match verb {
            "search" => Some(Self::Search(rest.to_string())),
            "list" => Some(Self::List),
            "add" => {
                let product = id(args.next())?;
                let quantity = match args.next() {
                    Some(n) => n.parse().ok()?,
                    None => 1,
                };
                Some(Self::Add(product, quantity))
            }
            "inc" => id(args.next()).map(Self::Inc),
            "dec" => id(args.next()).map(Self::Dec),
            "rm" => id(args.next()).map(Self::Remove),
            "cart" => Some(Self::Cart),
            "checkout" => Some(Self::Checkout),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run the shopping loop until `quit`, end of input, or session expiry.
pub async fn run(config: ClientConfig) -> Result<(), CliError> {
    let debounce = config.search_debounce;
    let mut app = signed_in_app(config)?;
    let search = ProductSearch::new(app.api().clone(), debounce);
    let mut results = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ketik `search <kata>` untuk mencari produk, `quit` untuk keluar.");
    search.search("");

    loop {
        tokio::select! {
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = results.borrow_and_update().clone();
                print_search_state(&app, &state);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let Some(command) = ShopCommand::parse(&line) else {
                    println!("Perintah tidak dikenal: {line}");
                    continue;
                };
                if command == ShopCommand::Quit {
                    break;
                }
                handle(&mut app, &search, command).await?;
            }
        }

        if session_ended(&mut app)? {
            break;
        }
    }

    search.cancel();
    Ok(())
}

async fn handle(
    app: &mut App,
    search: &ProductSearch<kkomi_storefront::ApiClient>,
    command: ShopCommand,
) -> Result<(), CliError> {
    match command {
        ShopCommand::Search(query) => search.search(query),
        ShopCommand::List => print_search_state(app, &search.state()),
        ShopCommand::Add(id, quantity) => {
            let product = find_product(search.state().products(), id)?;
            let name = product.name.clone();
            match app.add_to_cart(product, quantity) {
                Some(outcome) => println!("{name} di keranjang: {}", outcome.quantity),
                None => println!("Jumlah harus lebih dari nol."),
            }
        }
        ShopCommand::Inc(id) => report_change(app.update_quantity(id, 1)),
        ShopCommand::Dec(id) => report_change(app.update_quantity(id, -1)),
        ShopCommand::Remove(id) => match app.remove_from_cart(id) {
            Some(line) => println!("{} dihapus dari keranjang.", line.product().name),
            None => println!("Produk #{id} tidak ada di keranjang."),
        },
        ShopCommand::Cart => print_cart(app),
        ShopCommand::Checkout => match app.checkout().await {
            CheckoutOutcome::Skipped => println!("Keranjang kosong."),
            CheckoutOutcome::Placed(receipt) => {
                let message = receipt.message.as_deref().unwrap_or(messages::CHECKOUT_SUCCESS);
                match receipt.order {
                    Some(order) => println!("{message} (pesanan #{})", order.id),
                    None => println!("{message}"),
                }
            }
            CheckoutOutcome::Failed { message } => println!("{message}"),
        },
        ShopCommand::Quit => {}
    }
    Ok(())
}

fn report_change(change: QuantityChange) {
    match change {
        QuantityChange::Updated(quantity) => println!("Jumlah sekarang {quantity}."),
        QuantityChange::Removed => println!("Produk dihapus dari keranjang."),
        QuantityChange::Missing => println!("Produk tidak ada di keranjang."),
    }
}

fn print_search_state(app: &App, state: &SearchState) {
    let storage = app.config().storage_base_url.as_str();
    match state {
        SearchState::Idle => {}
        SearchState::Loading { query } => println!("Mencari \"{query}\"..."),
        SearchState::Ready { page, .. } if page.data.is_empty() => {
            println!("Tidak ada produk.");
        }
        SearchState::Ready { page, .. } => {
            for product in &page.data {
                print_product(product, storage);
            }
        }
        SearchState::Failed { message, .. } => println!("{message}"),
    }
}

fn print_cart(app: &App) {
    let cart = app.cart();
    if cart.is_empty() {
        println!("Keranjang kosong.");
        return;
    }
    for line in cart.lines() {
        println!(
            "#{:<4} {:<30} x{:<3} {:>14}",
            line.product_id(),
            line.product().name,
            line.quantity(),
            line.subtotal().display_idr()
        );
    }
    println!(
        "Total: {} ({} barang)",
        cart.total_price().display_idr(),
        cart.total_items()
    );
}

/// Apply the expiry policy. `true` when the session is gone.
fn session_ended(app: &mut App) -> Result<bool, CliError> {
    match app.poll_session_signals()? {
        None => Ok(false),
        Some(ExpiryAction::SignedOut) => {
            println!("{}", messages::ADMIN_SESSION_EXPIRED);
            Ok(true)
        }
        Some(ExpiryAction::Prompted) => {
            println!("{}", messages::SESSION_EXPIRED);
            app.dismiss_expiry_prompt()?;
            Ok(true)
        }
    }
}
