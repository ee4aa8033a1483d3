use sea_orm::{DatabaseTransaction, EntityTrait, PaginatorTrait, QueryOrder, Select};

use crate::pagination::PageRequest;

use super::{StoreError, StoreResult};

/// Order `select` by the requested properties (plus `id` as tie-breaker so
/// pages are stable), then fetch one page and the total count.
///
/// A page beyond the result set, however far, yields no rows and still
/// reports the total.
pub async fn fetch_page<E, F>(
    tx: &DatabaseTransaction,
    mut select: Select<E>,
    request: &PageRequest,
    sort_column: F,
    id_column: E::Column,
) -> StoreResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    F: Fn(&str) -> Option<E::Column>,
{
    let mut by_id = false;
    for order in &request.sort {
        let column = sort_column(&order.field).ok_or_else(|| StoreError::UnknownSortKey(order.field.clone()))?;
        by_id |= order.field == "id";
        select = select.order_by(column, order.direction.into());
    }
    if !by_id {
        select = select.order_by_asc(id_column);
    }

    let paginator = select.paginate(tx, request.size);
    let total = paginator.num_items().await?;
    // pages starting at or past the last row are empty; skip the query
    let content = match request.offset() {
        Some(offset) if offset < total => paginator.fetch_page(request.page).await?,
        _ => Vec::new(),
    };
    Ok((content, total))
}
