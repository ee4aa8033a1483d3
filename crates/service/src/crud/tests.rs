use chrono::{TimeZone, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};

use models::{product, user};

use crate::catalog::password::verify_password;
use crate::catalog::{
    CategoryDto, CategoryService, ProductDto, ProductService, RoleDto, UserDto, UserInsertDto, UserService,
};
use crate::errors::ServiceError;
use crate::pagination::{PageRequest, SortOrder};
use crate::test_support::{seeded_db, SEED_PASSWORD};

const EXISTING_ID: i32 = 1;
const NON_EXISTING_ID: i32 = 1000;
const COUNT_TOTAL_PRODUCTS: u64 = 25;

fn new_product(categories: Vec<i32>) -> ProductDto {
    ProductDto {
        id: None,
        name: "Phone X".into(),
        description: "Good phone".into(),
        price: 800.0,
        img_url: "https://img.example.com/phone.jpg".into(),
        date: Utc.with_ymd_and_hms(2020, 7, 13, 20, 50, 7).unwrap(),
        categories: categories.into_iter().map(|id| CategoryDto { id: Some(id), name: String::new() }).collect(),
    }
}

fn is_not_found(err: &ServiceError, resource: &str, id: i32) -> bool {
    matches!(err, ServiceError::NotFound { resource: r, id: i } if *r == resource && *i == id)
}

async fn product_count(svc_db: &sea_orm::DatabaseConnection) -> u64 {
    product::Entity::find().count(svc_db).await.unwrap()
}

#[tokio::test]
async fn missing_ids_are_not_found() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    let err = svc.find_by_id(NON_EXISTING_ID).await.unwrap_err();
    assert!(is_not_found(&err, "product", NON_EXISTING_ID), "{err:?}");

    let err = svc.update(NON_EXISTING_ID, new_product(vec![1])).await.unwrap_err();
    assert!(is_not_found(&err, "product", NON_EXISTING_ID), "{err:?}");

    let err = svc.delete(NON_EXISTING_ID).await.unwrap_err();
    assert!(is_not_found(&err, "product", NON_EXISTING_ID), "{err:?}");

    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS);
    Ok(())
}

#[tokio::test]
async fn delete_then_repeat_keeps_count() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    svc.delete(EXISTING_ID).await?;
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS - 1);

    let err = svc.find_by_id(EXISTING_ID).await.unwrap_err();
    assert!(is_not_found(&err, "product", EXISTING_ID));

    let err = svc.delete(EXISTING_ID).await.unwrap_err();
    assert!(is_not_found(&err, "product", EXISTING_ID));
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS - 1);
    Ok(())
}

#[tokio::test]
async fn insert_then_find_returns_same_dto() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    let created = svc.insert(new_product(vec![2, 3])).await?;
    let id = created.id.expect("assigned id");
    assert!(id > COUNT_TOTAL_PRODUCTS as i32);
    assert_eq!(created.name, "Phone X");
    assert_eq!(created.date, Utc.with_ymd_and_hms(2020, 7, 13, 20, 50, 7).unwrap());
    let names: Vec<_> = created.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Electronics", "Computers"]);

    let found = svc.find_by_id(id).await?;
    assert_eq!(found, created);
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS + 1);
    Ok(())
}

#[tokio::test]
async fn insert_ignores_client_id() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = CategoryService::new(db);
    let mut dto = CategoryDto::named("Garden");
    dto.id = Some(1);
    let created = svc.insert(dto).await?;
    assert_ne!(created.id, Some(1));
    assert_eq!(svc.find_by_id(1).await?.name, "Books");
    Ok(())
}

#[tokio::test]
async fn update_overwrites_fields_and_associations() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    let mut dto = new_product(vec![1, 2]);
    dto.name = "The Hobbit".into();
    let updated = svc.update(EXISTING_ID, dto).await?;
    assert_eq!(updated.id, Some(EXISTING_ID));
    assert_eq!(updated.name, "The Hobbit");

    let found = svc.find_by_id(EXISTING_ID).await?;
    assert_eq!(found, updated);
    let ids: Vec<_> = found.categories.iter().filter_map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS);
    Ok(())
}

#[tokio::test]
async fn dangling_category_is_not_found_and_rolled_back() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    let err = svc.insert(new_product(vec![1, 77])).await.unwrap_err();
    assert!(is_not_found(&err, "category", 77), "{err:?}");
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS);

    let err = svc.update(EXISTING_ID, new_product(vec![77])).await.unwrap_err();
    assert!(is_not_found(&err, "category", 77), "{err:?}");
    assert_eq!(svc.find_by_id(EXISTING_ID).await?.name, "The Lord of the Rings");
    Ok(())
}

#[tokio::test]
async fn invalid_dto_is_never_persisted() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db.clone());

    let mut dto = new_product(vec![1]);
    dto.price = -5.0;
    let err = svc.insert(dto).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "price"));
    assert_eq!(product_count(&db).await, COUNT_TOTAL_PRODUCTS);
    Ok(())
}

#[tokio::test]
async fn referenced_category_delete_is_integrity_conflict() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = CategoryService::new(db);

    let err = svc.delete(1).await.unwrap_err();
    assert!(matches!(err, ServiceError::IntegrityConflict { resource: "category", id: 1 }), "{err:?}");
    assert_eq!(svc.find_by_id(1).await?.name, "Books");

    let page = svc.find_all_paged(PageRequest::of(0, 10)).await?;
    assert_eq!(page.total_elements, 3);
    Ok(())
}

#[tokio::test]
async fn unreferenced_category_can_be_deleted() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = CategoryService::new(db);
    let created = svc.insert(CategoryDto::named("Garden")).await?;
    let id = created.id.expect("id");
    svc.delete(id).await?;
    assert_eq!(svc.find_all_paged(PageRequest::of(0, 10)).await?.total_elements, 3);
    Ok(())
}

#[tokio::test]
async fn paging_window_and_beyond_last_page() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db);

    let page = svc.find_all_paged(PageRequest::of(0, 10)).await?;
    assert_eq!(page.content.len(), 10);
    assert_eq!(page.total_elements, COUNT_TOTAL_PRODUCTS);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content[0].id, Some(1));

    let last = svc.find_all_paged(PageRequest::of(2, 10)).await?;
    assert_eq!(last.content.len(), 5);
    assert!(last.is_last());

    let beyond = svc.find_all_paged(PageRequest::of(50, 10)).await?;
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_elements, COUNT_TOTAL_PRODUCTS);
    Ok(())
}

#[tokio::test]
async fn huge_page_index_is_empty_not_a_crash() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db);

    for page in [u64::MAX / 5, i64::MAX as u64 / 10 + 1, 2_000_000_000_000_000_000, u64::MAX] {
        let result = svc.find_all_paged(PageRequest::of(page, 10)).await?;
        assert!(result.is_empty(), "page {page}");
        assert_eq!(result.number, page);
        assert_eq!(result.total_elements, COUNT_TOTAL_PRODUCTS);
        assert_eq!(result.total_pages, 3);
    }
    Ok(())
}

#[tokio::test]
async fn sorted_by_name() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db);

    let page = svc.find_all_paged(PageRequest::of(0, 10).sorted(SortOrder::asc("name"))).await?;
    let names: Vec<_> = page.content.iter().take(3).map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Macbook Pro", "PC Gamer", "PC Gamer Alfa"]);

    let page = svc.find_all_paged(PageRequest::of(0, 1).sorted(SortOrder::desc("price"))).await?;
    assert_eq!(page.content[0].name, "PC Gamer Foo");
    Ok(())
}

#[tokio::test]
async fn filter_by_name_substring() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db);
    let page = svc.find_all_paged(PageRequest::of(0, 5).filtered("Gamer")).await?;
    assert_eq!(page.total_elements, 21);
    assert!(page.content.iter().all(|p| p.name.contains("Gamer")));
    Ok(())
}

#[tokio::test]
async fn bad_page_requests() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = ProductService::new(db).with_max_page_size(20);

    let err = svc.find_all_paged(PageRequest::of(0, 10).sorted(SortOrder::asc("colour"))).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "sort"));

    let err = svc.find_all_paged(PageRequest::of(0, 0)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "size"));

    let clamped = svc.find_all_paged(PageRequest::of(0, 1000)).await?;
    assert_eq!(clamped.size, 20);
    assert_eq!(clamped.content.len(), 20);
    Ok(())
}

#[tokio::test]
async fn user_insert_hashes_password_and_rejects_duplicate_email() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = UserService::new(db.clone());

    let dto = UserInsertDto {
        user: UserDto {
            id: None,
            first_name: "Bob".into(),
            last_name: "Stone".into(),
            email: "bob@gmail.com".into(),
            roles: vec![RoleDto { id: Some(1), authority: String::new() }],
        },
        password: "s3cret!".into(),
    };
    let created = svc.insert(dto.clone()).await?;
    let id = created.id.expect("id");
    assert_eq!(created.roles[0].authority, "ROLE_OPERATOR");

    let stored = user::Entity::find_by_id(id).one(&db).await?.expect("row");
    assert_ne!(stored.password, "s3cret!");
    assert!(verify_password("s3cret!", &stored.password));

    let err = svc.insert(dto).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "unique"), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn user_update_keeps_password_and_replaces_roles() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = UserService::new(db.clone());

    let maria = svc.find_all_paged(PageRequest::of(0, 5).filtered("maria")).await?;
    let maria = maria.content.first().cloned().expect("seeded user");
    assert_eq!(maria.roles.len(), 2);

    let mut dto = maria.clone();
    dto.last_name = "Blue".into();
    dto.roles.truncate(1);
    let id = maria.id.expect("id");
    let updated = svc.update(id, dto).await?;
    assert_eq!(updated.last_name, "Blue");
    assert_eq!(updated.roles.len(), 1);

    let stored = user::Entity::find_by_id(id).one(&db).await?.expect("row");
    assert!(verify_password(SEED_PASSWORD, &stored.password));
    Ok(())
}

#[tokio::test]
async fn user_update_missing_id_is_not_found() -> anyhow::Result<()> {
    let db = seeded_db().await?;
    let svc = UserService::new(db);
    let dto = UserDto { first_name: "Ghost".into(), email: "ghost@gmail.com".into(), ..UserDto::default() };
    let err = svc.update(NON_EXISTING_ID, dto).await.unwrap_err();
    assert!(is_not_found(&err, "user", NON_EXISTING_ID), "{err:?}");
    Ok(())
}
