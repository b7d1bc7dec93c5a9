//! Fixed-size pagination of ordered listings.
//!
//! The requested page number comes straight from the query string. Anything
//! that is not a page inside the listing resolves to page 1, so callers never
//! see an error from here.

use serde::Serialize;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: usize = 10;

/// Offset/limit for one resolved page of a listing of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
}

/// One page of items plus the navigation data a listing needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// An empty listing still has one (empty) page.
    pub fn num_pages(&self, count: usize) -> usize {
        if count == 0 {
            1
        } else {
            (count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw page parameter against a listing of `count` items.
    pub fn resolve(&self, raw_page: Option<&str>, count: usize) -> usize {
        let num_pages = self.num_pages(count);
        raw_page
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|number| (1..=num_pages).contains(number))
            .unwrap_or(1)
    }

    /// Offset/limit for store-side slicing.
    pub fn window(&self, raw_page: Option<&str>, count: usize) -> PageWindow {
        let number = self.resolve(raw_page, count);
        let offset = (number - 1) * self.per_page;

        PageWindow {
            number,
            num_pages: self.num_pages(count),
            count,
            offset,
            limit: self.per_page.min(count.saturating_sub(offset)),
        }
    }

    /// Slice an already materialized, ordered sequence.
    pub fn paginate<T>(&self, items: Vec<T>, raw_page: Option<&str>) -> Page<T> {
        let window = self.window(raw_page, items.len());
        let page_items = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        Page::new(window, page_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn first_page_holds_at_most_ten() {
        let paginator = Paginator::default();
        for n in [0, 1, 9, 10, 11, 35] {
            let page = paginator.paginate(numbers(n), None);
            assert_eq!(page.len(), n.min(10), "n = {}", n);
            assert_eq!(page.number, 1);
        }
    }

    #[test]
    fn last_page_holds_remainder() {
        let paginator = Paginator::default();

        let page = paginator.paginate(numbers(13), Some("2"));
        assert_eq!(page.number, 2);
        assert_eq!(page.items, vec![10, 11, 12]);
        assert!(!page.has_next);
        assert!(page.has_previous);

        let page = paginator.paginate(numbers(20), Some("2"));
        assert_eq!(page.len(), 10);
        assert_eq!(page.num_pages, 2);
    }

    #[test]
    fn malformed_page_falls_back_to_first() {
        let paginator = Paginator::default();
        for raw in ["abc", "", "0", "-1", "2.5", "99", "18446744073709551616"] {
            let page = paginator.paginate(numbers(15), Some(raw));
            assert_eq!(page.number, 1, "raw = {:?}", raw);
            assert_eq!(page.items, numbers(10));
        }
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let page = Paginator::default().paginate(Vec::<u8>::new(), Some("3"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.count, 0);
        assert!(page.is_empty());
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn window_matches_in_memory_slicing() {
        let paginator = Paginator::default();
        for count in [0usize, 7, 10, 23] {
            for raw in [None, Some("1"), Some("2"), Some("3"), Some("x")] {
                let window = paginator.window(raw, count);
                let page = paginator.paginate(numbers(count), raw);
                assert_eq!(window.number, page.number);
                assert_eq!(window.limit, page.len());
                assert_eq!(page.items.first().copied(), numbers(count).get(window.offset).copied());
            }
        }
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }
}
