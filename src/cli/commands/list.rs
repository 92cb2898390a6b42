//! List products command handler

use crate::catalog::{self, FilterBounds};
use crate::cli::ListArgs;
use crate::config::Config;
use crate::db;
use crate::services::CatalogQuery;

pub async fn cmd_list_products(config: &Config, args: ListArgs) -> anyhow::Result<()> {
    let stores = db::open(&config.storage).await?;
    let all = stores.products.list().await?;

    let state = CatalogQuery {
        brand: args.brand,
        max_price: args.max_price,
        conditions: args.condition,
        processor: args.processor,
        ram: args.ram,
    }
    .into_state(&all);
    let matched = catalog::filter(&all, &state);
    let bounds = FilterBounds::for_catalog(&all);

    if matched.is_empty() {
        println!("No products match ({} in catalog).", all.len());
        return Ok(());
    }

    println!(
        "{} of {} products | price ceiling {:.2} | brands: {}",
        matched.len(),
        all.len(),
        state.max_price,
        bounds.brands.join(", ")
    );
    println!("{:-<100}", "");
    println!(
        "{:<36}  {:<24}  {:<10}  {:>10}  {:<11}",
        "ID", "Name", "Brand", "Price", "Condition"
    );
    println!("{:-<100}", "");

    for product in &matched {
        let mut flags = Vec::new();
        if product.featured {
            flags.push("featured");
        }
        if product.new_arrival {
            flags.push("new");
        }

        println!(
            "{:<36}  {:<24}  {:<10}  {:>10.2}  {:<11} {}",
            product.id.as_str(),
            truncate(&product.name, 24),
            truncate(&product.brand, 10),
            product.price,
            product.condition.as_str(),
            flags.join(",")
        );
        println!(
            "{:<36}  {} | {} | {} image(s)",
            "",
            product.specs.processor,
            product.specs.ram,
            product.images.len()
        );
    }

    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Dell", 10), "Dell");
        assert_eq!(truncate("ThinkPad X1 Carbon", 8), "ThinkPa…");
    }
}
