use serde::Serialize;

/// Rows to skip and take for one page, plus the page count for the whole result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: i64,
    pub take: i64,
    pub total_page: i64,
}

/// Paging metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub current_page: i64,
    pub size: i64,
    pub total_page: i64,
}

impl Paging {
    /// Compute the window for `page` of `size` rows over `total` matches.
    ///
    /// `page` and `size` are already validated as >= 1. A page past the end is not
    /// an error: its window simply selects nothing.
    pub fn window(total: i64, page: i64, size: i64) -> Window {
        let total = total.max(0);
        Window {
            skip: (page - 1).saturating_mul(size),
            take: size,
            total_page: if total == 0 { 0 } else { (total - 1) / size + 1 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T: Serialize> {
    pub data: Vec<T>,
    pub paging: Paging,
}

impl<T: Serialize> PageResult<T> {
    pub fn new(data: Vec<T>, page: i64, size: i64, total_page: i64) -> Self {
        Self {
            data,
            paging: Paging {
                current_page: page,
                size,
                total_page,
            },
        }
    }

    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            paging: self.paging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_twenty_five() {
        assert_eq!(Paging::window(25, 1, 10), Window { skip: 0, take: 10, total_page: 3 });
    }

    #[test]
    fn last_partial_page() {
        assert_eq!(Paging::window(25, 3, 10), Window { skip: 20, take: 10, total_page: 3 });
    }

    #[test]
    fn empty_result_has_zero_pages() {
        assert_eq!(Paging::window(0, 1, 10).total_page, 0);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        assert_eq!(Paging::window(20, 1, 10).total_page, 2);
        assert_eq!(Paging::window(1, 1, 1).total_page, 1);
    }

    #[test]
    fn page_past_the_end_keeps_true_total() {
        let w = Paging::window(5, 4, 2);
        assert_eq!(w.skip, 6);
        assert_eq!(w.total_page, 3);
    }
}
