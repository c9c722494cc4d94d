//! Order List Pager
//!
//! Pure pagination over a slice. Out-of-range page indices are clamped.

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Clamped page index actually rendered
    pub index: usize,
    /// Position of `items[0]` in the full list
    pub offset: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Index of the last page (0 for an empty list)
pub fn max_page(total: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    if total == 0 {
        0
    } else {
        (total - 1) / size
    }
}

pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let index = page_index.min(max_page(items.len(), size));
    let start = index * size;
    let end = (start + size).min(items.len());

    Page {
        items: &items[start..end],
        index,
        offset: start,
        has_prev: index > 0,
        has_next: end < items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_twelve() {
        let orders: Vec<u32> = (0..12).collect();
        let p = page(&orders, 0, DEFAULT_PAGE_SIZE);
        assert_eq!(p.items, &[0, 1, 2, 3, 4]);
        assert!(!p.has_prev);
        assert!(p.has_next);
    }

    #[test]
    fn test_last_page_of_twelve() {
        let orders: Vec<u32> = (0..12).collect();
        let p = page(&orders, 2, DEFAULT_PAGE_SIZE);
        assert_eq!(p.items, &[10, 11]);
        assert_eq!(p.offset, 10);
        assert!(p.has_prev);
        assert!(!p.has_next);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let orders: Vec<u32> = (0..12).collect();
        let p = page(&orders, 9, DEFAULT_PAGE_SIZE);
        assert_eq!(p.index, 2);
        assert_eq!(p.items, &[10, 11]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_trailing_page() {
        let orders: Vec<u32> = (0..10).collect();
        assert_eq!(max_page(orders.len(), 5), 1);
        let p = page(&orders, 1, 5);
        assert_eq!(p.items, &[5, 6, 7, 8, 9]);
        assert!(!p.has_next);
    }

    #[test]
    fn test_empty_list() {
        let orders: Vec<u32> = Vec::new();
        let p = page(&orders, 3, 5);
        assert!(p.items.is_empty());
        assert_eq!(p.index, 0);
        assert!(!p.has_prev);
        assert!(!p.has_next);
    }
}
