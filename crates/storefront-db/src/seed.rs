//! # Sample Data
//!
//! Fills an empty catalog with a few categories and products so a fresh
//! server can take checkouts immediately.
//!
//! Used by the `seed` binary and by the API server when `SEED_DATA=true`.

use tracing::{info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use storefront_core::{CategoryInput, ProductInput};

/// `(category, description, [(product, price_cents, stock)])`
const SAMPLE_CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Minuman",
        "Hot and cold drinks",
        &[
            ("Kopi Susu", 1800, 50),
            ("Es Teh Manis", 800, 80),
            ("Jus Alpukat", 2200, 30),
            ("Air Mineral 600ml", 500, 120),
        ],
    ),
    (
        "Makanan",
        "Rice and noodle dishes",
        &[
            ("Nasi Goreng", 2500, 40),
            ("Mie Ayam", 2000, 40),
            ("Sate Ayam", 3000, 25),
            ("Gado-Gado", 2000, 20),
        ],
    ),
    (
        "Camilan",
        "Snacks",
        &[
            ("Pisang Goreng", 1000, 60),
            ("Keripik Singkong", 1200, 70),
            ("Martabak Manis", 3500, 15),
        ],
    ),
];

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

/// Inserts the sample catalog unless products or categories already exist.
///
/// ## Returns
/// * `Ok(None)` - Catalog not empty, nothing inserted
/// * `Ok(Some(summary))` - Rows inserted
pub async fn seed_sample_data(db: &Database) -> DbResult<Option<SeedSummary>> {
    let existing = db.categories().count().await? + db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Catalog not empty, skipping seed");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();

    for (category_name, description, products) in SAMPLE_CATALOG {
        let category = db
            .categories()
            .create(&CategoryInput {
                name: category_name.to_string(),
                description: description.to_string(),
            })
            .await?;
        summary.categories += 1;

        for (name, price_cents, stock) in products.iter() {
            db.products()
                .create(&ProductInput {
                    name: name.to_string(),
                    description: String::new(),
                    price_cents: *price_cents,
                    stock: *stock,
                    category_id: category.id,
                })
                .await?;
            summary.products += 1;
        }
    }

    info!(
        categories = summary.categories,
        products = summary.products,
        "Sample data inserted"
    );

    Ok(Some(summary))
}
