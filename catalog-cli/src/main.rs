use catalog_core::{
    CatalogConfig, CatalogError, CatalogSession, Product, ProductDraft, ProductId,
    ProductsClient, find_product,
};
use clap::{Args, Parser, Subcommand};
use std::fmt;
use time::OffsetDateTime;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Browse and edit the product catalog from the command line")]
struct Cli {
    /// Base URL of the product API (overrides CATALOG_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of products
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show the details of a single product
    Show { id: ProductId },
    /// Add a new product
    Add(NewProduct),
    /// Change fields of an existing product
    Edit {
        id: ProductId,
        #[command(flatten)]
        changes: ProductChanges,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Args)]
struct NewProduct {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    brand: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value = "0")]
    rating: f64,
    #[arg(long, default_value = "0")]
    stock: u32,
    /// Mark the product as out of stock
    #[arg(long)]
    unavailable: bool,
}

impl NewProduct {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            brand: self.brand,
            price: self.price,
            rating: self.rating,
            stock: self.stock,
            is_available: !self.unavailable,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Args)]
struct ProductChanges {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    rating: Option<f64>,
    #[arg(long)]
    stock: Option<u32>,
    #[arg(long)]
    available: Option<bool>,
}

impl ProductChanges {
    fn apply_to(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(brand) = self.brand {
            draft.brand = brand;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(rating) = self.rating {
            draft.rating = rating;
        }
        if let Some(stock) = self.stock {
            draft.stock = stock;
        }
        if let Some(available) = self.available {
            draft.is_available = available;
        }
        draft
    }
}

#[derive(Debug)]
enum CliError {
    Catalog(CatalogError),
    NotFound(ProductId),
    PageOutOfRange { page: usize, total_pages: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Catalog(e) => write!(f, "{}", e),
            CliError::NotFound(id) => write!(f, "No product with id {}", id),
            CliError::PageOutOfRange { page, total_pages: 0 } => {
                write!(f, "Page {} does not exist, the catalog is empty", page)
            }
            CliError::PageOutOfRange { page, total_pages } => {
                write!(f, "Page {} does not exist (pages 1-{})", page, total_pages)
            }
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(error: CatalogError) -> Self {
        CliError::Catalog(error)
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = CatalogConfig::load(cli.api_url)?;
    let client = ProductsClient::new(&config)?;
    log::debug!("Using product API at {}", client.base_url());

    let mut session = CatalogSession::new(client);
    let result = match cli.command {
        Commands::List { page } => list(&mut session, page).await,
        Commands::Show { id } => match find_product(session.store(), id).await? {
            Some(product) => {
                print_details(&product);
                Ok(())
            }
            None => Err(CliError::NotFound(id)),
        },
        Commands::Add(new_product) => {
            session.initialize().await?;
            let draft = new_product
                .into_draft()
                .stamped(OffsetDateTime::now_utc());
            let product = session.add(&draft).await?;
            println!("Added product {} ('{}')", product.id, product.title);
            print_position(&session);
            Ok(())
        }
        Commands::Edit { id, changes } => {
            let current = find_product(session.store(), id)
                .await?
                .ok_or(CliError::NotFound(id))?;
            let draft = changes
                .apply_to(ProductDraft::from_product(&current))
                .stamped(OffsetDateTime::now_utc());
            let product = session.edit(id, &draft).await?;
            println!("Updated product {} ('{}')", product.id, product.title);
            Ok(())
        }
        Commands::Delete { id } => {
            session.initialize().await?;
            session.remove(id).await?;
            println!("Deleted product {}", id);
            print_position(&session);
            Ok(())
        }
    };

    if let Some(call) = session.store().last_api_call() {
        log::debug!(
            "Last request: {} {} -> {} ({})",
            call.method,
            call.url,
            call.status_code,
            if call.success { "ok" } else { "failed" }
        );
    }

    result
}

async fn list(
    session: &mut CatalogSession<ProductsClient>,
    page: usize,
) -> Result<(), CliError> {
    session.initialize().await?;
    if page != 1 && !session.view_page(page).await? {
        return Err(CliError::PageOutOfRange {
            page,
            total_pages: session.snapshot().total_pages,
        });
    }

    let snapshot = session.snapshot();
    if snapshot.items.is_empty() {
        println!("No products.");
    }
    for product in snapshot.items {
        println!(
            "  [{}] {} - ${} ({}/5){}",
            product.id,
            product.title,
            product.price,
            product.rating,
            if product.is_available {
                ""
            } else {
                " [out of stock]"
            }
        );
    }
    println!(
        "Page {} of {} ({} products)",
        snapshot.current_page, snapshot.total_pages, snapshot.total_count
    );
    Ok(())
}

fn print_details(product: &Product) {
    println!("{} (#{})", product.title, product.id);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    println!("  Category: {}", product.category);
    println!("  Brand:    {}", product.brand);
    println!("  Price:    ${}", product.price);
    println!("  Rating:   {}/5", product.rating);
    println!("  Stock:    {} units", product.stock);
    println!(
        "  Status:   {}",
        if product.is_available {
            "Available"
        } else {
            "Out of Stock"
        }
    );
}

fn print_position(session: &CatalogSession<ProductsClient>) {
    let snapshot = session.snapshot();
    println!(
        "Now on page {} of {} ({} products)",
        snapshot.current_page, snapshot.total_pages, snapshot.total_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;

    struct CapturedLogs(Mutex<Vec<String>>);

    impl Log for CapturedLogs {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                self.0
                    .lock()
                    .unwrap()
                    .push(format!("{} {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static LOGS: CapturedLogs = CapturedLogs(Mutex::new(Vec::new()));

    // Nothing listens on the discard port, so every request is refused.
    const DEAD_API: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn test_session_warnings_reach_the_cli_logger() {
        log::set_logger(&LOGS).unwrap();
        log::set_max_level(LevelFilter::Warn);

        let cli = Cli::try_parse_from(["catalog-cli", "--api-url", DEAD_API, "list"]).unwrap();
        let result = run(cli).await;
        assert!(matches!(
            result,
            Err(CliError::Catalog(CatalogError::Network(_)))
        ));

        let logs = LOGS.0.lock().unwrap();
        assert!(
            logs.iter()
                .any(|line| line.starts_with("WARN Failed to fetch total product count")),
            "captured: {:?}",
            *logs
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CliError::NotFound(9).to_string(), "No product with id 9");
        assert_eq!(
            CliError::PageOutOfRange {
                page: 3,
                total_pages: 2
            }
            .to_string(),
            "Page 3 does not exist (pages 1-2)"
        );
        assert_eq!(
            CliError::PageOutOfRange {
                page: 2,
                total_pages: 0
            }
            .to_string(),
            "Page 2 does not exist, the catalog is empty"
        );
        let http = CatalogError::Http {
            status: 503,
            url: "http://localhost:3000/products".to_string(),
        };
        assert_eq!(
            CliError::from(http).to_string(),
            "Request to http://localhost:3000/products failed with status 503"
        );
    }

    #[test]
    fn test_edit_overlays_only_given_fields() {
        let current = NewProduct {
            title: "Kettle".to_string(),
            description: "Steel".to_string(),
            category: "Kitchen".to_string(),
            brand: "Acme".to_string(),
            price: 19.5,
            rating: 4.0,
            stock: 8,
            unavailable: false,
        }
        .into_draft();
        let changes = ProductChanges {
            title: None,
            description: None,
            category: None,
            brand: None,
            price: Some(17.0),
            rating: None,
            stock: Some(0),
            available: Some(false),
        };

        let draft = changes.apply_to(current);
        assert_eq!(draft.title, "Kettle");
        assert_eq!(draft.price, 17.0);
        assert_eq!(draft.stock, 0);
        assert!(!draft.is_available);
    }
}
