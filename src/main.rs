use anyhow::Context;
use cart_store::core::ConfigProvider;
use cart_store::utils::{logger, validation::Validate};
use cart_store::{
    CartCommand, CartProvider, CartStore, CliConfig, ConsoleNotifier, FileStore,
    HttpCatalogClient, Product, TomlConfig, UpdateProductAmount,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let succeeded = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let toml_config = TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path))?;
            run(&toml_config, config.command).await?
        }
        None => run(&config, config.command).await?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs one cart command; returns `false` when the user was shown an error.
async fn run<C: ConfigProvider + Validate>(settings: &C, command: CartCommand) -> anyhow::Result<bool> {
    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        return Ok(false);
    }

    let catalog = HttpCatalogClient::from_config(settings)
        .context("Failed to build the catalog client")?;
    let storage = FileStore::new(settings.storage_path());
    let store = CartStore::with_key(catalog, storage, settings.storage_key());
    let mut provider = CartProvider::new(store, ConsoleNotifier);

    tracing::debug!(
        "Catalog at {}, cart stored in {} under '{}'",
        settings.catalog_endpoint(),
        settings.storage_path(),
        settings.storage_key()
    );

    let notification = match command {
        CartCommand::Show => None,
        CartCommand::Add { product_id } => provider.add_product(product_id).await,
        CartCommand::Remove { product_id } => provider.remove_product(product_id),
        CartCommand::Update { product_id, amount } => {
            provider
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await
        }
    };

    print_cart(&provider.cart(), provider.store().total());

    Ok(!notification.is_some_and(|n| n.is_error()))
}

fn print_cart(cart: &[Product], total: f64) {
    if cart.is_empty() {
        println!("🛒 Cart is empty");
        return;
    }

    println!("🛒 {} product(s) in cart", cart.len());
    for product in cart {
        println!(
            "  #{:<5} {:<40} {:>3} x {:>9.2} = {:>10.2}",
            product.id,
            product.name,
            product.amount,
            product.price,
            product.subtotal()
        );
    }
    println!("  Total: {:.2}", total);
}
