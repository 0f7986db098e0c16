//! Search and category filtering over a fetched list.
//!
//! [`ListView`] keeps the unmodified collection next to the filtered view.
//! Every change to the search term or category re-derives the view from the
//! full collection, never from the previous view, so the order in which
//! filters are changed has no effect on the result.

use serde::Serialize;

use crate::course::Course;
use crate::school::School;

/// Category key that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Items that can be matched by the text search and category filter.
pub trait Searchable {
    /// Fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Category used by [`CategoryFilter::Named`]. Items without one never
    /// match a named category.
    fn category_name(&self) -> Option<&str> {
        None
    }
}

impl Searchable for School {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.shortname.as_str()];
        fields.extend(self.city.as_deref());
        fields.push(self.description.as_str());
        fields
    }
}

impl Searchable for Course {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.fullname.as_str(), self.shortname.as_str()];
        fields.extend(self.summary.as_deref());
        fields.extend(self.category_name.as_deref());
        fields
    }

    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }
}

/// Category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a selection; `all` and the empty string mean no filtering.
    pub fn parse(selection: &str) -> Self {
        if selection.is_empty() || selection == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(selection.to_string())
        }
    }

    /// Case-insensitive containment of the selection in the item's category.
    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        match self {
            Self::All => true,
            Self::Named(selection) => item
                .category_name()
                .is_some_and(|c| contains_ignore_case(c, selection)),
        }
    }
}

/// Case-insensitive substring search across an item's search fields. An
/// empty term matches everything.
pub fn matches_search<T: Searchable>(item: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    item.search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A fetched collection plus its filtered view.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    all: Vec<T>,
    filtered: Vec<T>,
    search: String,
    category: CategoryFilter,
}

impl<T: Searchable + Clone> ListView<T> {
    /// Wrap a freshly fetched collection. The view starts unfiltered.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            filtered: items.clone(),
            all: items,
            search: String::new(),
            category: CategoryFilter::All,
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.refresh();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.refresh();
    }

    /// Builder form of [`set_search`](Self::set_search).
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    /// Builder form of [`set_category`](Self::set_category).
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.set_category(category);
        self
    }

    pub fn all(&self) -> &[T] {
        &self.all
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Snapshot suitable for an API response.
    pub fn page(&self) -> ListPage<T> {
        ListPage {
            items: self.filtered.clone(),
            total: self.all.len(),
            matched: self.filtered.len(),
        }
    }

    fn refresh(&mut self) {
        self.filtered = self
            .all
            .iter()
            .filter(|item| matches_search(*item, &self.search) && self.category.matches(*item))
            .cloned()
            .collect();
    }
}

/// Filtered items with the size of the unfiltered collection.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub matched: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school::SchoolStatus;

    fn school(id: &str, name: &str, shortname: &str, city: Option<&str>, description: &str) -> School {
        School {
            id: id.into(),
            name: name.into(),
            shortname: shortname.into(),
            description: description.into(),
            city: city.map(Into::into),
            country: None,
            logo: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            user_count: 0,
            course_count: 0,
            status: SchoolStatus::Active,
        }
    }

    fn course(id: i64, fullname: &str, summary: Option<&str>, category: Option<&str>) -> Course {
        Course {
            id,
            fullname: fullname.into(),
            shortname: format!("C{id}"),
            summary: summary.map(Into::into),
            category_name: category.map(Into::into),
            format: None,
            startdate: None,
            enddate: None,
            visible: true,
        }
    }

    fn schools() -> Vec<School> {
        vec![
            school("1", "Lincoln Academy", "lincoln", Some("Springfield"), ""),
            school("2", "Oak Park High", "oakpark", Some("Shelbyville"), "Public high school"),
            school("3", "Riverside Primary", "riverside", None, "Near the river"),
        ]
    }

    fn courses() -> Vec<Course> {
        vec![
            course(10, "Classroom Management", Some("<p>Teaching routines</p>"), Some("Teaching Skills")),
            course(11, "Formative Assessment", None, Some("Assessment")),
            course(12, "Leading Teams", Some("For school leaders"), Some("Leadership")),
            course(13, "Digital Tools", Some("Using technology"), None),
        ]
    }

    fn ids<T, F: Fn(&T) -> String>(items: &[T], f: F) -> Vec<String> {
        items.iter().map(f).collect()
    }

    #[test]
    fn new_view_is_unfiltered() {
        let view = ListView::new(schools());
        assert_eq!(view.filtered().len(), 3);
        assert_eq!(view.all().len(), 3);
    }

    #[test]
    fn empty_search_is_pass_through() {
        let view = ListView::new(schools()).with_search("");
        assert_eq!(view.filtered(), view.all());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let view = ListView::new(schools()).with_search("SPRING");
        assert_eq!(ids(view.filtered(), |s| s.id.clone()), vec!["1"]);

        let view = ListView::new(schools()).with_search("river");
        assert_eq!(ids(view.filtered(), |s| s.id.clone()), vec!["3"]);

        let view = ListView::new(schools()).with_search("high school");
        assert_eq!(ids(view.filtered(), |s| s.id.clone()), vec!["2"]);
    }

    #[test]
    fn filtered_is_subset_and_every_item_matches() {
        for term in ["a", "li", "park", "zzz", "E", " "] {
            let view = ListView::new(schools()).with_search(term);
            for item in view.filtered() {
                assert!(view.all().contains(item));
                assert!(matches_search(item, term));
            }
        }
    }

    #[test]
    fn refiltering_starts_from_the_full_list() {
        let mut view = ListView::new(schools());
        view.set_search("lincoln");
        assert_eq!(view.filtered().len(), 1);
        view.set_search("oak");
        assert_eq!(ids(view.filtered(), |s| s.id.clone()), vec!["2"]);
        view.set_search("");
        assert_eq!(view.filtered().len(), 3);
    }

    #[test]
    fn course_search_includes_summary_and_category() {
        let view = ListView::new(courses()).with_search("routines");
        assert_eq!(ids(view.filtered(), |c| c.id.to_string()), vec!["10"]);

        let view = ListView::new(courses()).with_search("leadership");
        assert_eq!(ids(view.filtered(), |c| c.id.to_string()), vec!["12"]);
    }

    #[test]
    fn category_all_returns_unmodified_list() {
        let view = ListView::new(courses()).with_category(CategoryFilter::parse("all"));
        assert_eq!(view.filtered(), view.all());
    }

    #[test]
    fn named_category_matches_by_containment() {
        let view = ListView::new(courses()).with_category(CategoryFilter::parse("teaching"));
        assert_eq!(ids(view.filtered(), |c| c.id.to_string()), vec!["10"]);
        for item in view.filtered() {
            assert!(item
                .category_name
                .as_deref()
                .unwrap()
                .to_lowercase()
                .contains("teaching"));
        }
    }

    #[test]
    fn uncategorised_items_never_match_named_category() {
        let view = ListView::new(courses()).with_category(CategoryFilter::parse("technology"));
        assert!(view.filtered().is_empty());
    }

    #[test]
    fn filter_order_does_not_matter() {
        let a = ListView::new(courses())
            .with_search("a")
            .with_category(CategoryFilter::parse("assessment"));
        let b = ListView::new(courses())
            .with_category(CategoryFilter::parse("assessment"))
            .with_search("a");
        assert_eq!(a.filtered(), b.filtered());
        assert_eq!(ids(a.filtered(), |c| c.id.to_string()), vec!["11"]);
    }

    #[test]
    fn page_reports_totals() {
        let page = ListView::new(schools()).with_search("oak").page();
        assert_eq!(page.total, 3);
        assert_eq!(page.matched, 1);
        assert_eq!(page.items.len(), 1);
    }
}
