//! Pagination types for list queries
//!
//! `PageRequest` is what the client asked for (`?page=3`, `?page=last`),
//! `Paginator` knows the total and validates the request, and `Page` is the
//! resolved slice of items handed to templates.

use serde::Serialize;

/// Why a requested page cannot be served
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPage {
    #[error("Page is not 'last', nor can it be converted to an integer")]
    NotAnInteger,
    #[error("That page number is less than 1")]
    LessThanOne,
    #[error("Page {0} contains no results")]
    Empty(u32),
}

/// The page a client asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u32),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl PageRequest {
    /// Parse the raw `page` query value; absent or blank means the first page
    pub fn parse(raw: Option<&str>) -> Result<Self, InvalidPage> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::default());
        };
        if raw == "last" {
            return Ok(Self::Last);
        }
        raw.parse::<u32>()
            .map(Self::Number)
            .map_err(|_| InvalidPage::NotAnInteger)
    }
}

/// Splits `count` items into pages of `per_page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u32,
    count: i64,
}

impl Paginator {
    /// A zero page size is treated as one item per page
    pub fn new(per_page: u32, count: i64) -> Self {
        Self {
            per_page: per_page.max(1),
            count: count.max(0),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    /// Number of pages; an empty listing still has its first page
    pub fn num_pages(&self) -> u32 {
        let pages = (self.count as u64).div_ceil(self.per_page as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    /// Resolve a request to a concrete, in-range page number
    pub fn validate(&self, request: PageRequest) -> Result<u32, InvalidPage> {
        let number = match request {
            PageRequest::Last => self.num_pages(),
            PageRequest::Number(0) => return Err(InvalidPage::LessThanOne),
            PageRequest::Number(n) => n,
        };
        if number > self.num_pages() {
            return Err(InvalidPage::Empty(number));
        }
        Ok(number)
    }

    /// Row offset of the first item on `number`
    pub fn offset(&self, number: u32) -> i64 {
        number.saturating_sub(1) as i64 * self.per_page as i64
    }

    /// Row limit for a page query
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    /// Wrap fetched items into a page
    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            paginator: *self,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    paginator: Paginator,
}

impl<T> Page<T> {
    /// An unpaginated page holding every item
    pub fn single(items: Vec<T>) -> Self {
        let count = items.len() as i64;
        let per_page = u32::try_from(items.len()).unwrap_or(u32::MAX).max(1);
        Self {
            items,
            number: 1,
            paginator: Paginator::new(per_page, count),
        }
    }

    pub fn num_pages(&self) -> u32 {
        self.paginator.num_pages()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// 1-based index of the first item on this page (0 for an empty listing)
    pub fn start_index(&self) -> i64 {
        if self.paginator.count() == 0 {
            return 0;
        }
        self.paginator.offset(self.number) + 1
    }

    /// 1-based index of the last item on this page
    pub fn end_index(&self) -> i64 {
        if self.number == self.num_pages() {
            return self.paginator.count();
        }
        self.number as i64 * self.paginator.per_page() as i64
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            paginator: self.paginator,
        }
    }

    /// Template-facing summary (`page_obj`)
    pub fn info(&self) -> PageInfo {
        PageInfo {
            number: self.number,
            num_pages: self.num_pages(),
            count: self.paginator.count(),
            per_page: self.paginator.per_page(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            has_other_pages: self.has_next() || self.has_previous(),
            next_page_number: self.has_next().then(|| self.number + 1),
            previous_page_number: self.has_previous().then(|| self.number - 1),
            start_index: self.start_index(),
            end_index: self.end_index(),
        }
    }
}

/// Serialized page metadata exposed to templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub count: i64,
    pub per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
    pub next_page_number: Option<u32>,
    pub previous_page_number: Option<u32>,
    pub start_index: i64,
    pub end_index: i64,
}
