use std::sync::LazyLock;

use axum::{Json, Router, extract::State, http::HeaderMap, routing::get};
use chrono::{TimeZone, Utc};
use querycrate::{
    ApiError, MemoryStore, QueryBuilder, QueryConfig, QueryResult, RawParameters, SeaOrmStore,
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Schema,
};
use sea_orm_migration::prelude::*;
use serde_json::{Value, json};

pub mod category_entity;
pub mod plant_entity;

pub static PLANTS: LazyLock<QueryBuilder> = LazyLock::new(|| {
    QueryBuilder::new(
        QueryConfig::new("created_at")
            .with_limits(5, 50)
            .with_sort_fields(["name", "status", "height", "created_at", "updated_at"])
            .with_filter_fields(["name", "description", "status", "category", "height"])
            .with_search_fields(["name", "description"])
            .with_date_field("created_at"),
    )
});

pub static CATEGORIES: LazyLock<QueryBuilder> = LazyLock::new(|| {
    QueryBuilder::new(
        QueryConfig::new("created_at")
            .with_limits(5, 50)
            .with_sort_fields(["name", "status", "created_at"])
            .with_filter_fields(["name", "description", "status"])
            .with_search_fields(["name", "description"])
            .with_date_field("created_at"),
    )
});

/// (name, description, status, category)
pub const PLANT_FIXTURES: [(&str, &str, &str, Option<i32>); 12] = [
    ("Aloe", "Soothing green succulent", "active", Some(1)),
    ("Basil", "Fragrant kitchen herb", "active", Some(2)),
    ("Cactus", "Spiky desert plant", "active", Some(1)),
    ("Daisy", "Cheerful white flower", "active", None),
    ("Echeveria", "Rosette shaped succulent", "active", Some(1)),
    ("Fern", "Shade loving green fronds", "active", None),
    ("Gardenia", "Fragrant white blooms", "active", None),
    ("Hosta", "Green shade perennial", "inactive", None),
    ("Iris", "Purple bearded flower", "inactive", None),
    ("Jade", "Lucky money plant", "inactive", Some(1)),
    ("Kale", "Curly leafy green", "inactive", Some(2)),
    ("Lavender", "Fragrant purple herb", "inactive", Some(2)),
];

fn day(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreatePlantTables)]
    }
}

pub struct CreatePlantTables;

#[async_trait::async_trait]
impl MigrationName for CreatePlantTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_plant_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePlantTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(category_entity::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(plant_entity::Entity))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(plant_entity::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(category_entity::Entity).to_owned())
            .await?;
        Ok(())
    }
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    // Shows the engine's debug logs with `cargo test -- --nocapture`
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Two categories and the twelve fixture plants: seven active, five
/// inactive, created on consecutive days of January 2024.
pub async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let categories = [
        (1, "Succulents", "Water storing plants"),
        (2, "Herbs", "Plants for the kitchen"),
    ]
    .into_iter()
    .map(|(id, name, description)| category_entity::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        status: Set("active".to_string()),
        created_at: Set(day(1)),
        updated_at: Set(day(1)),
    });
    category_entity::Entity::insert_many(categories).exec(db).await?;

    let plants = PLANT_FIXTURES
        .iter()
        .zip(1_u32..)
        .map(|(&(name, description, status, category), n)| plant_entity::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            image: Set(format!("{}.jpg", name.to_lowercase())),
            status: Set(status.to_string()),
            category: Set(category),
            height: Set(<i32 as TryFrom<u32>>::try_from(n * 10).unwrap()),
            created_at: Set(day(n)),
            updated_at: Set(day(n)),
            ..Default::default()
        });
    plant_entity::Entity::insert_many(plants).exec(db).await?;
    Ok(())
}

/// The fixture plants as JSON documents, keyed like the Sea-ORM records.
pub fn memory_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (&(name, description, status, category), n) in PLANT_FIXTURES.iter().zip(1_u32..) {
        store
            .insert(json!({
                "name": name,
                "description": description,
                "status": status,
                "category": category,
                "height": n * 10,
                "created_at": day(n).to_rfc3339(),
                "updated_at": day(n).to_rfc3339(),
            }))
            .unwrap();
    }
    store
}

/// A thirteenth plant whose name and description need Unicode case folding.
pub const TURKISH_PLANT: (&str, &str) = ("Gül", "Yeşil yapraklı gül");

pub async fn insert_turkish_plant(db: &DatabaseConnection) -> Result<(), DbErr> {
    let (name, description) = TURKISH_PLANT;
    plant_entity::Entity::insert(plant_entity::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        image: Set("gul.jpg".to_string()),
        status: Set("active".to_string()),
        category: Set(None),
        height: Set(130),
        created_at: Set(day(13)),
        updated_at: Set(day(13)),
        ..Default::default()
    })
    .exec(db)
    .await?;
    Ok(())
}

pub fn memory_store_with_turkish_plant() -> MemoryStore {
    let (name, description) = TURKISH_PLANT;
    let store = memory_store();
    store
        .insert(json!({
            "name": name,
            "description": description,
            "status": "active",
            "category": null,
            "height": 130,
            "created_at": day(13).to_rfc3339(),
            "updated_at": day(13).to_rfc3339(),
        }))
        .unwrap();
    store
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub plants: SeaOrmStore<plant_entity::Entity>,
    pub categories: SeaOrmStore<category_entity::Entity>,
}

/// `filter[category]` carries a category name; resolve it to ids before
/// querying and answer an empty page for unknown names.
async fn list_plants(
    State(state): State<AppState>,
    params: RawParameters,
) -> Result<(HeaderMap, Json<QueryResult<Value>>), ApiError> {
    let mut parsed = PLANTS.parse(&params);

    if let Some(names) = parsed.filter_values("category") {
        let ids: Vec<String> = category_entity::Entity::find()
            .filter(category_entity::Column::Name.is_in(names.to_vec()))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|category| category.id.to_string())
            .collect();

        if ids.is_empty() {
            let empty = QueryResult::empty(parsed.page, parsed.limit);
            return Ok((empty.content_range("plants"), Json(empty)));
        }
        parsed = parsed.with_filter_values("category", ids);
    }

    let result = PLANTS.list_parsed(&parsed, &state.plants).await?;
    let headers = result.content_range("plants");
    let result = result.map(|mut plant| {
        let image_url = plant["image"].as_str().map(|image| format!("/images/{image}"));
        if let (Some(url), Value::Object(fields)) = (image_url, &mut plant) {
            fields.insert("imageUrl".to_string(), Value::String(url));
        }
        plant
    });
    Ok((headers, Json(result)))
}

async fn list_categories(
    State(state): State<AppState>,
    params: RawParameters,
) -> Result<Json<QueryResult<Value>>, ApiError> {
    Ok(Json(CATEGORIES.list(&params, &state.categories).await?))
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let state = AppState {
        plants: SeaOrmStore::new(db.clone()),
        categories: SeaOrmStore::new(db.clone()),
        db,
    };

    let api = Router::new()
        .route("/plants", get(list_plants))
        .route("/category", get(list_categories))
        .with_state(state);

    Router::new().nest("/api", api)
}
