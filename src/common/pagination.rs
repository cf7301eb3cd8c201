// src/common/pagination.rs

// Paginação feita no painel, sobre listas já carregadas da API
// (as tabelas de produtos, armazéns e estoque).

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Página atual, começando em 1.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Recorta `all` na página pedida. Páginas fora do intervalo são ajustadas
    /// para a primeira ou a última.
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        let items = all
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    /// "Previous" fica desabilitado na primeira página.
    pub fn can_previous(&self) -> bool {
        self.page > 1
    }

    /// "Next" fica desabilitado na última página.
    pub fn can_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn previous_page(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next_page(&self) -> usize {
        (self.page + 1).min(self.total_pages)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Filtro de texto das tabelas: sem diferenciar maiúsculas, em qualquer um dos campos.
pub fn filter_by_text<T>(items: Vec<T>, needle: &str, fields: impl Fn(&T) -> Vec<&str>) -> Vec<T> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            fields(item)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_disables_previous() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 1, 10);
        assert!(!page.can_previous());
        assert!(page.can_next());
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn last_page_disables_next() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 3, 10);
        assert!(page.can_previous());
        assert!(!page.can_next());
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.previous_page(), 2);
        assert_eq!(page.next_page(), 3);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let page = Page::paginate(vec![1, 2, 3], 9, 10);
        assert_eq!(page.page, 1);
        assert!(!page.can_previous());
        assert!(!page.can_next());

        let empty: Page<u8> = Page::paginate(vec![], 0, 10);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.can_next());
    }

    #[test]
    fn text_filter_matches_any_field() {
        let rows = vec![("Kopi Arabica", "KOP-001"), ("Teh Hijau", "TEH-002")];
        let found = filter_by_text(rows.clone(), "teh", |r| vec![r.0, r.1]);
        assert_eq!(found, vec![("Teh Hijau", "TEH-002")]);

        let by_sku = filter_by_text(rows.clone(), "kop-0", |r| vec![r.0, r.1]);
        assert_eq!(by_sku.len(), 1);

        assert_eq!(filter_by_text(rows, "  ", |r| vec![r.0]).len(), 2);
    }
}
