use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Name ordering and filtering on the list endpoints
        manager
            .create_index(
                Index::create()
                    .name("idx_product_name")
                    .table(Product::Table)
                    .col(Product::Name)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_category_name")
                    .table(Category::Table)
                    .col(Category::Name)
                    .to_owned(),
            )
            .await?;

        // Reverse lookups on the join tables
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_category")
                    .table(ProductCategory::Table)
                    .col(ProductCategory::CategoryId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_role")
                    .table(UserRole::Table)
                    .col(UserRole::RoleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_name").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_category_name").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_category_category").table(ProductCategory::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_role_role").table(UserRole::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Name }

#[derive(DeriveIden)]
enum Category { Table, Name }

#[derive(DeriveIden)]
enum ProductCategory { Table, CategoryId }

#[derive(DeriveIden)]
enum UserRole { Table, RoleId }
