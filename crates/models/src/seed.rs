//! Demo catalog used by local runs and the test suites.
//!
//! Rows are inserted in a fixed order on an empty database, so the first
//! product ("The Lord of the Rings") receives id 1.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait};
use tracing::info;

use crate::errors::ModelError;
use crate::{category, product, product_category, role, user, user_role};

pub const CATEGORY_NAMES: [&str; 3] = ["Books", "Electronics", "Computers"];

/// (name, price, category index into `CATEGORY_NAMES`)
pub const PRODUCTS: [(&str, f64, usize); 25] = [
    ("The Lord of the Rings", 90.5, 0),
    ("Smart TV", 2190.0, 1),
    ("Macbook Pro", 1250.0, 2),
    ("PC Gamer", 1200.0, 2),
    ("Rails for Dummies", 100.99, 0),
    ("PC Gamer Ex", 1350.0, 2),
    ("PC Gamer X", 1350.0, 2),
    ("PC Gamer Alfa", 1850.0, 2),
    ("PC Gamer Tera", 1950.0, 2),
    ("PC Gamer Y", 1700.0, 2),
    ("PC Gamer Nitro", 1450.0, 2),
    ("PC Gamer Card", 1850.0, 2),
    ("PC Gamer Plus", 1350.0, 2),
    ("PC Gamer Hera", 2250.0, 2),
    ("PC Gamer Weed", 2200.0, 2),
    ("PC Gamer Max", 2100.0, 2),
    ("PC Gamer Turbo", 1350.0, 2),
    ("PC Gamer Hot", 1750.0, 2),
    ("PC Gamer Ez", 1300.0, 2),
    ("PC Gamer Tr", 1650.0, 2),
    ("PC Gamer Tx", 1680.0, 2),
    ("PC Gamer Er", 1850.0, 2),
    ("PC Gamer Min", 2250.0, 2),
    ("PC Gamer Boo", 2350.0, 2),
    ("PC Gamer Foo", 4170.0, 2),
];

pub const ROLES: [&str; 2] = ["ROLE_OPERATOR", "ROLE_ADMIN"];

/// (first name, last name, email, role indexes)
pub const USERS: [(&str, &str, &str, &[usize]); 2] = [
    ("Alex", "Brown", "alex@gmail.com", &[0]),
    ("Maria", "Green", "maria@gmail.com", &[0, 1]),
];

const FIRST_RELEASE: i64 = 1_594_673_407;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub users: usize,
}

/// Insert the demo catalog unless products already exist.
pub async fn seed_catalog(db: &DatabaseConnection, password_hash: &str) -> Result<SeedSummary, ModelError> {
    if product::Entity::find().count(db).await? > 0 {
        info!("catalog already populated; skip seeding");
        return Ok(SeedSummary::default());
    }

    let txn = db.begin().await?;
    let now = Utc::now();

    let mut category_ids = Vec::with_capacity(CATEGORY_NAMES.len());
    for name in CATEGORY_NAMES {
        let am = category::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(None),
            ..Default::default()
        };
        category_ids.push(am.insert(&txn).await?.id);
    }

    for (n, (name, price, category)) in PRODUCTS.iter().enumerate() {
        let date = DateTime::<Utc>::from_timestamp(FIRST_RELEASE + n as i64 * 86_400, 0).unwrap_or(now);
        let am = product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(format!("{name}: Lorem ipsum dolor sit amet, consectetur adipiscing elit.")),
            price: Set(*price),
            img_url: Set(format!(
                "https://raw.githubusercontent.com/devsuperior/dscatalog-resources/master/backend/img/{}-big.jpg",
                n + 1
            )),
            date: Set(date.into()),
            ..Default::default()
        };
        let created = am.insert(&txn).await?;
        product_category::ActiveModel {
            product_id: Set(created.id),
            category_id: Set(category_ids[*category]),
        }
        .insert(&txn)
        .await?;
    }

    let mut role_ids = Vec::with_capacity(ROLES.len());
    for authority in ROLES {
        let am = role::ActiveModel { authority: Set(authority.to_string()), ..Default::default() };
        role_ids.push(am.insert(&txn).await?.id);
    }

    for (first_name, last_name, email, roles) in USERS {
        let am = user::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            email: Set(email.to_string()),
            password: Set(password_hash.to_string()),
            ..Default::default()
        };
        let created = am.insert(&txn).await?;
        for idx in roles {
            user_role::ActiveModel { user_id: Set(created.id), role_id: Set(role_ids[*idx]) }
                .insert(&txn)
                .await?;
        }
    }

    txn.commit().await?;
    let summary = SeedSummary { categories: CATEGORY_NAMES.len(), products: PRODUCTS.len(), users: USERS.len() };
    info!(categories = summary.categories, products = summary.products, users = summary.users, "demo catalog seeded");
    Ok(summary)
}
