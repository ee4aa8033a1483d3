//! Pagination contract shared by every resource service.
//!
//! A `PageRequest` is normalized against a page-size ceiling before it reaches
//! the store; the store performs the actual `LIMIT/OFFSET`, `ORDER BY` and
//! count, and the result comes back as a `Page`.

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 12;
/// Largest page a caller can get; bigger requests are clamped.
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl From<Direction> for sea_orm::Order {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Asc => sea_orm::Order::Asc,
            Direction::Desc => sea_orm::Order::Desc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self { Self { field: field.into(), direction: Direction::Asc } }

    pub fn desc(field: impl Into<String>) -> Self { Self { field: field.into(), direction: Direction::Desc } }

    /// Parse `field`, `field,asc` or `field,desc` (direction is case-insensitive).
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let mut parts = raw.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default();
        if field.is_empty() {
            return Err(ServiceError::validation("sort", "sort property must not be empty"));
        }
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => return Err(ServiceError::validation("sort", format!("unknown sort direction `{d}`"))),
        };
        if parts.next().is_some() {
            return Err(ServiceError::validation("sort", format!("malformed sort `{raw}`")));
        }
        Ok(Self { field: field.to_string(), direction })
    }
}

/// Page request: zero-based page index, page size, ordering and an optional
/// substring filter on the resource's name-like column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
    pub filter: Option<String>,
}

impl PageRequest {
    pub fn of(page: u64, size: u64) -> Self {
        Self { page, size, sort: Vec::new(), filter: None }
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn filtered(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Reject an empty page size, clamp to `max_page_size`, drop a blank filter.
    pub fn normalize(mut self, max_page_size: u64) -> Result<Self, ServiceError> {
        if self.size == 0 {
            return Err(ServiceError::validation("size", "page size must be greater than zero"));
        }
        self.size = self.size.min(max_page_size.max(1));
        self.filter = self.filter.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
        Ok(self)
    }

    /// Row offset of the first element of this page, or `None` when it lies
    /// past anything a backend can address (`i64::MAX`).
    pub fn offset(&self) -> Option<u64> {
        self.page.checked_mul(self.size).filter(|offset| *offset <= i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self::of(0, DEFAULT_PAGE_SIZE) }
}

/// One slice of an ordered result set plus the total row count.
///
/// `total_elements` comes from a separate count query and is not snapshot
/// consistent with `content` under concurrent writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub sort: Vec<SortOrder>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 { 0 } else { total_elements.div_ceil(request.size) };
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
            sort: request.sort.clone(),
        }
    }

    pub fn is_empty(&self) -> bool { self.content.is_empty() }

    #[cfg(test)]
    pub fn is_last(&self) -> bool { self.number.saturating_add(1) >= self.total_pages }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            sort: self.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rejects_zero_size() {
        let err = PageRequest::of(0, 0).normalize(MAX_PAGE_SIZE).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "size"));
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let req = PageRequest::of(5, 1000).normalize(MAX_PAGE_SIZE).unwrap();
        assert_eq!(req.page, 5);
        assert_eq!(req.size, 100);
        assert_eq!(req.offset(), Some(500));
    }

    #[test]
    fn offset_past_addressable_range_is_none() {
        assert_eq!(PageRequest::of(u64::MAX / 5, 10).offset(), None);
        assert_eq!(PageRequest::of(i64::MAX as u64 / 10 + 1, 10).offset(), None);
        assert_eq!(PageRequest::of(i64::MAX as u64 / 10, 10).offset(), Some(i64::MAX as u64 / 10 * 10));
    }

    #[test]
    fn normalize_drops_blank_filter() {
        let req = PageRequest::of(0, 10).filtered("   ").normalize(MAX_PAGE_SIZE).unwrap();
        assert_eq!(req.filter, None);
        let req = PageRequest::of(0, 10).filtered(" PC ").normalize(MAX_PAGE_SIZE).unwrap();
        assert_eq!(req.filter.as_deref(), Some("PC"));
    }

    #[test]
    fn default_values_are_sane() {
        let d = PageRequest::default();
        assert_eq!(d.page, 0);
        assert_eq!(d.size, DEFAULT_PAGE_SIZE);
        assert!(d.sort.is_empty());
    }

    #[test]
    fn parse_sort_orders() {
        assert_eq!(SortOrder::parse("name").unwrap(), SortOrder::asc("name"));
        assert_eq!(SortOrder::parse("price,DESC").unwrap(), SortOrder::desc("price"));
        assert_eq!(SortOrder::parse(" date , asc ").unwrap(), SortOrder::asc("date"));
        assert!(SortOrder::parse("").is_err());
        assert!(SortOrder::parse("name,sideways").is_err());
        assert!(SortOrder::parse("name,asc,extra").is_err());
    }

    #[test]
    fn page_metadata() {
        let req = PageRequest::of(2, 10).sorted(SortOrder::asc("name"));
        let page = Page::new(vec![1, 2, 3, 4, 5], &req, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_last());
        assert_eq!(page.sort, vec![SortOrder::asc("name")]);

        let beyond = Page::<u8>::new(Vec::new(), &PageRequest::of(50, 10), 25);
        assert!(beyond.is_empty());
        assert_eq!(beyond.total_elements, 25);

        let doubled = page.map(|n| n * 2);
        assert_eq!(doubled.content, vec![2, 4, 6, 8, 10]);
        assert_eq!(doubled.number, 2);
    }
}
