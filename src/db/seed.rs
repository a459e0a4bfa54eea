//! Sample booths and menus for local development.

use crate::domain::{NewBooth, NewMenu};
use crate::ports::CatalogRepository;

struct SeedBooth {
    name: &'static str,
    contact: &'static str,
    menus: &'static [(&'static str, i64, &'static str)],
}

const SEED_BOOTHS: &[SeedBooth] = &[
    SeedBooth {
        name: "Warung Nusantara",
        contact: "081234567801",
        menus: &[
            ("Nasi Goreng Spesial", 25000, "makanan"),
            ("Mie Goreng Jawa", 22000, "makanan"),
            ("Ayam Penyet", 28000, "makanan"),
        ],
    },
    SeedBooth {
        name: "Sate Pak Kumis",
        contact: "081234567802",
        menus: &[
            ("Sate Ayam (10 tusuk)", 30000, "makanan"),
            ("Sate Kambing (10 tusuk)", 40000, "makanan"),
            ("Lontong", 5000, "makanan"),
        ],
    },
    SeedBooth {
        name: "Es Segar",
        contact: "081234567803",
        menus: &[
            ("Es Teh Manis", 5000, "minuman"),
            ("Es Jeruk", 8000, "minuman"),
            ("Es Campur", 15000, "minuman"),
        ],
    },
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub booths_created: usize,
    pub menus_created: usize,
}

/// Inserts the sample catalog. Booths that already exist are left untouched.
pub async fn seed_catalog(repo: &dyn CatalogRepository) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for seed in SEED_BOOTHS {
        if repo.find_booth_by_name(seed.name).await?.is_some() {
            tracing::debug!(booth = seed.name, "Seed booth exists, skipping");
            continue;
        }

        let booth = repo
            .create_booth(&NewBooth {
                name: seed.name.to_string(),
                contact: seed.contact.to_string(),
                is_active: true,
            })
            .await?;
        summary.booths_created += 1;

        for (name, price, category) in seed.menus {
            repo.create_menu(&NewMenu {
                booth_id: booth.id,
                name: name.to_string(),
                price: *price,
                is_available: true,
                category: category.to_string(),
                description: String::new(),
                image_path: None,
            })
            .await?;
            summary.menus_created += 1;
        }
    }

    tracing::info!(
        booths = summary.booths_created,
        menus = summary.menus_created,
        "Catalog seeded"
    );
    Ok(summary)
}
