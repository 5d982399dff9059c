//! Seed the database with a demo catalog.
//!
//! Categories are matched by name so re-running the command never creates
//! duplicates. Products are only inserted into an empty catalog.

use rust_decimal::Decimal;
use tracing::info;

use storehouse_api::db::{CategoryRepository, ProductRepository};
use storehouse_api::models::{NewProduct, PageRequest, ProductFilter};
use storehouse_core::{CategoryId, Price};

use super::connect;

const CATEGORIES: &[&str] = &["Kitchen", "Outdoors", "Stationery", "Lighting"];

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    cents: i64,
    categories: &'static [&'static str],
    images: &'static [&'static str],
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Enamel Camp Mug",
        description: "Speckled enamel mug that survives the campfire and the dishwasher.",
        cents: 1450,
        categories: &["Kitchen", "Outdoors"],
        images: &["/images/camp-mug.jpg"],
    },
    DemoProduct {
        name: "Cast Iron Skillet",
        description: "Pre-seasoned 26 cm skillet.",
        cents: 4900,
        categories: &["Kitchen"],
        images: &["/images/skillet.jpg", "/images/skillet-side.jpg"],
    },
    DemoProduct {
        name: "Dot Grid Notebook",
        description: "A5, 160 numbered pages, lay-flat binding.",
        cents: 1800,
        categories: &["Stationery"],
        images: &["/images/notebook.jpg"],
    },
    DemoProduct {
        name: "Brass Desk Lamp",
        description: "Adjustable arm with a warm 2700K bulb included.",
        cents: 8950,
        categories: &["Lighting", "Stationery"],
        images: &[],
    },
    DemoProduct {
        name: "Solar Lantern",
        description: "Collapsible lantern with a USB-C backup charge port.",
        cents: 2999,
        categories: &["Lighting", "Outdoors"],
        images: &["/images/lantern.jpg"],
    },
    DemoProduct {
        name: "Linen Tea Towels",
        description: "Set of two.",
        cents: 1200,
        categories: &["Kitchen"],
        images: &[],
    },
];

/// Insert the demo categories and products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn catalog() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let mut ids: Vec<(&str, CategoryId)> = Vec::with_capacity(CATEGORIES.len());
    let mut created = 0_usize;
    for &name in CATEGORIES {
        let category = match categories.get_by_name(name).await? {
            Some(existing) => existing,
            None => {
                created += 1;
                categories.create(name).await?
            }
        };
        ids.push((name, category.id));
    }
    info!(created, existing = CATEGORIES.len() - created, "Categories ready");

    let existing = products
        .search(&ProductFilter::new(), PageRequest::new(Some(1), Some(1)))
        .await?;
    if existing.total_count > 0 {
        info!(
            products = existing.total_count,
            "Catalog already has products, skipping product seed"
        );
        return Ok(());
    }

    for demo in PRODUCTS {
        let product = products.create(&demo_product(demo, &ids)?).await?;
        info!(id = %product.id, name = %product.name, "Created product");
    }

    info!("Seeding complete!");
    info!("  Categories: {}", CATEGORIES.len());
    info!("  Products: {}", PRODUCTS.len());
    Ok(())
}

fn demo_product(
    demo: &DemoProduct,
    ids: &[(&str, CategoryId)],
) -> Result<NewProduct, Box<dyn std::error::Error>> {
    let category_ids = demo
        .categories
        .iter()
        .filter_map(|name| ids.iter().find(|(n, _)| n == name).map(|(_, id)| *id))
        .collect();

    Ok(NewProduct {
        name: demo.name.to_owned(),
        description: demo.description.to_owned(),
        price: Price::new(Decimal::new(demo.cents, 2))?,
        category_ids,
        image_urls: demo.images.iter().map(|url| (*url).to_owned()).collect(),
    })
}
