use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};

use models::{category, role};

use super::{StoreError, StoreResult};

/// Association target that is either just an id or a fully loaded row.
#[derive(Clone, Debug, PartialEq)]
pub enum Reference<T> {
    Lazy(i32),
    Loaded(T),
}

pub trait Identified {
    fn id(&self) -> i32;
}

impl Identified for category::Model {
    fn id(&self) -> i32 { self.id }
}

impl Identified for role::Model {
    fn id(&self) -> i32 { self.id }
}

impl<T: Identified> Reference<T> {
    pub fn id(&self) -> i32 {
        match self {
            Reference::Lazy(id) => *id,
            Reference::Loaded(m) => m.id(),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Reference::Lazy(_) => None,
            Reference::Loaded(m) => Some(m),
        }
    }
}

/// Load every referenced row in one query, keeping request order and
/// dropping duplicate ids. The first missing id is reported.
pub async fn resolve_all<E>(
    tx: &DatabaseTransaction,
    refs: Vec<Reference<E::Model>>,
    id_column: E::Column,
    resource: &'static str,
) -> StoreResult<Vec<Reference<E::Model>>>
where
    E: EntityTrait,
    E::Model: Identified + Clone + Send + Sync,
{
    let mut seen = HashSet::new();
    let ids: Vec<i32> = refs.iter().map(Reference::id).filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let by_id: HashMap<i32, E::Model> = E::find()
        .filter(id_column.is_in(ids.clone()))
        .all(tx)
        .await?
        .into_iter()
        .map(|m| (m.id(), m))
        .collect();
    ids.into_iter()
        .map(|id| by_id.get(&id).cloned().map(Reference::Loaded).ok_or(StoreError::DanglingReference { resource, id }))
        .collect()
}

/// Group association targets by owner given `(owner_id, target_id)` link rows.
pub async fn load_grouped<E>(
    tx: &DatabaseTransaction,
    mut links: Vec<(i32, i32)>,
    id_column: E::Column,
) -> StoreResult<HashMap<i32, Vec<Reference<E::Model>>>>
where
    E: EntityTrait,
    E::Model: Identified + Clone + Send + Sync,
{
    let mut grouped: HashMap<i32, Vec<Reference<E::Model>>> = HashMap::new();
    if links.is_empty() {
        return Ok(grouped);
    }
    links.sort_unstable();
    let mut target_ids: Vec<i32> = links.iter().map(|(_, t)| *t).collect();
    target_ids.sort_unstable();
    target_ids.dedup();
    let targets: HashMap<i32, E::Model> = E::find()
        .filter(id_column.is_in(target_ids))
        .all(tx)
        .await?
        .into_iter()
        .map(|m| (m.id(), m))
        .collect();
    for (owner, target) in links {
        let entry = grouped.entry(owner).or_default();
        match targets.get(&target) {
            Some(m) => entry.push(Reference::Loaded(m.clone())),
            None => entry.push(Reference::Lazy(target)),
        }
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i32) -> role::Model { role::Model { id, authority: format!("ROLE_{id}") } }

    #[test]
    fn reference_exposes_id_either_way() {
        assert_eq!(Reference::<role::Model>::Lazy(7).id(), 7);
        assert_eq!(Reference::Loaded(role(3)).id(), 3);
        assert!(Reference::<role::Model>::Lazy(7).loaded().is_none());
        assert_eq!(Reference::Loaded(role(3)).loaded().map(|r| r.authority.as_str()), Some("ROLE_3"));
    }
}
