use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use crate::error::{Result, XsvError};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a logical column declared in a [`ColumnMap`].
///
/// The handle stays valid for the lifetime of its map and across rebinding;
/// only the position it resolves to changes. A handle from another map never
/// resolves to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    map: u64,
    slot: usize,
}

impl Column {
    /// Declaration order of this column within its map.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, Clone)]
struct ColumnEntry {
    name: String,
    index: Option<usize>,
}

/// Binds human-readable column names to positions discovered from a header.
///
/// Columns are declared once and bound against as many headers as needed.
/// Binding resets every column first, so an index is only meaningful relative
/// to the most recent [`bind`](ColumnMap::bind). Names match
/// case-insensitively unless the map was created with
/// [`case_sensitive`](ColumnMap::case_sensitive).
///
/// ```
/// use xsvlib::core::column_map::ColumnMap;
///
/// let mut columns = ColumnMap::new();
/// let id = columns.declare("id").unwrap();
/// let name = columns.declare("Name").unwrap();
///
/// assert!(columns.bind(&["NAME", "ID"]));
/// assert_eq!(columns.index_of(id), Some(1));
/// assert_eq!(columns.index_of(name), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct ColumnMap {
    id: u64,
    case_sensitive: bool,
    entries: Vec<ColumnEntry>,
    lookup: HashMap<String, usize>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnMap {
    /// Creates an empty map with case-insensitive name matching.
    pub fn new() -> Self {
        Self::with_case_sensitivity(false)
    }

    /// Creates an empty map that matches names exactly.
    pub fn case_sensitive() -> Self {
        Self::with_case_sensitivity(true)
    }

    pub fn with_case_sensitivity(case_sensitive: bool) -> Self {
        Self {
            id: NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed),
            case_sensitive,
            entries: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Declares every header name and binds the map against that same header,
    /// so each column resolves to its own position.
    pub fn from_header<S: AsRef<str>>(header: &[S], case_sensitive: bool) -> Result<Self> {
        let mut map = Self::with_case_sensitivity(case_sensitive);
        for name in header {
            map.declare(name.as_ref())?;
        }
        map.bind(header);
        Ok(map)
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.case_sensitive {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(name.to_lowercase())
        }
    }

    fn handle(&self, slot: usize) -> Column {
        Column { map: self.id, slot }
    }

    fn entry(&self, column: Column) -> Option<&ColumnEntry> {
        if column.map != self.id {
            return None;
        }
        self.entries.get(column.slot)
    }

    /// Declares a new column. Declaring the same name twice is an error.
    pub fn declare(&mut self, name: &str) -> Result<Column> {
        if self.lookup.contains_key(self.key(name).as_ref()) {
            return Err(XsvError::DuplicateColumn(name.to_string()));
        }
        Ok(self.insert(name))
    }

    /// Declares a column, or returns the existing one with the same name.
    pub fn declare_or_get(&mut self, name: &str) -> Column {
        match self.find(name) {
            Some(column) => column,
            None => self.insert(name),
        }
    }

    fn insert(&mut self, name: &str) -> Column {
        let slot = self.entries.len();
        let key = self.key(name).into_owned();
        self.entries.push(ColumnEntry {
            name: name.to_string(),
            index: None,
        });
        self.lookup.insert(key, slot);
        self.handle(slot)
    }

    /// Looks a column up by name without creating it.
    pub fn find(&self, name: &str) -> Option<Column> {
        self.lookup
            .get(self.key(name).as_ref())
            .map(|&slot| self.handle(slot))
    }

    /// Looks a column up by name, failing when it was never declared.
    pub fn get(&self, name: &str) -> Result<Column> {
        self.find(name)
            .ok_or_else(|| XsvError::UnknownColumn(name.to_string()))
    }

    /// The declared name of a column, or `None` for a handle from another map.
    pub fn column_name(&self, column: Column) -> Option<&str> {
        self.entry(column).map(|entry| entry.name.as_str())
    }

    /// The position the column was bound to by the last [`bind`](ColumnMap::bind).
    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.entry(column).and_then(|entry| entry.index)
    }

    pub fn is_bound(&self, column: Column) -> bool {
        self.index_of(column).is_some()
    }

    pub(crate) fn describe(&self, column: Column) -> String {
        match self.column_name(column) {
            Some(name) => name.to_string(),
            None => format!("#{} of another column map", column.slot),
        }
    }

    /// Binds every declared column against a header.
    ///
    /// All bindings are reset first; then each header position binds the
    /// declared column of the same name (if any). When a name occurs more than
    /// once in the header its last position wins. Returns `true` when every
    /// declared column found a position. A shortfall is not an error here, see
    /// [`require_bind`](ColumnMap::require_bind).
    pub fn bind<S: AsRef<str>>(&mut self, header: &[S]) -> bool {
        for entry in &mut self.entries {
            entry.index = None;
        }
        for (index, name) in header.iter().enumerate() {
            let slot = self.lookup.get(self.key(name.as_ref()).as_ref()).copied();
            if let Some(slot) = slot {
                self.entries[slot].index = Some(index);
            }
        }

        let complete = self.entries.iter().all(|entry| entry.index.is_some());
        if complete {
            debug!("Bound {} column(s) against a header of {}", self.len(), header.len());
        } else {
            warn!(
                "Columns missing from header: {}",
                self.unbound_names().join(", ")
            );
        }
        complete
    }

    /// Binds like [`bind`](ColumnMap::bind) and turns a shortfall into
    /// [`XsvError::MissingColumns`] naming every missing column.
    pub fn require_bind<S: AsRef<str>>(&mut self, header: &[S]) -> Result<()> {
        if self.bind(header) {
            Ok(())
        } else {
            Err(XsvError::MissingColumns(
                self.unbound_names().into_iter().map(String::from).collect(),
            ))
        }
    }

    /// All declared columns, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        (0..self.entries.len()).map(|slot| self.handle(slot))
    }

    pub fn unbound_columns(&self) -> Vec<Column> {
        self.iter()
            .filter(|&column| !self.is_bound(column))
            .collect()
    }

    pub fn unbound_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.index.is_none())
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// All declared columns. When `sorted`, unbound columns come first, then
    /// bound ones by position; ties are broken by name.
    pub fn all_columns(&self, sorted: bool) -> Vec<Column> {
        let mut columns: Vec<Column> = self.iter().collect();
        if sorted {
            columns.sort_by(|a, b| {
                let a = &self.entries[a.slot];
                let b = &self.entries[b.slot];
                (a.index, &a.name).cmp(&(b.index, &b.name))
            });
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(map: &ColumnMap, columns: &[Column]) -> Vec<String> {
        columns
            .iter()
            .map(|&c| map.column_name(c).unwrap().to_string())
            .collect()
    }

    #[test]
    fn binding_reports_unbound_columns() {
        let mut map = ColumnMap::new();
        let c = map.declare("c").unwrap();
        let e = map.declare("e").unwrap();
        let g = map.declare("g").unwrap();
        let a = map.declare("a").unwrap();
        let b = map.declare("b").unwrap();

        assert!(!map.bind(&["b", "c", "d", "e"]));

        let mut unbound = map.unbound_names();
        unbound.sort();
        assert_eq!(unbound, vec!["a", "g"]);

        assert_eq!(map.index_of(c), Some(1));
        assert_eq!(map.index_of(e), Some(3));
        assert_eq!(map.index_of(g), None);
        assert_eq!(map.index_of(a), None);
        assert_eq!(map.index_of(b), Some(0));

        let all = map.all_columns(true);
        assert_eq!(names(&map, &all), vec!["a", "g", "b", "c", "e"]);

        assert!(map.bind(&["a", "b", "c", "e", "g"]));
        assert!(map.unbound_columns().is_empty());
    }

    #[test]
    fn binding_twice_is_idempotent() {
        let mut map = ColumnMap::new();
        let x = map.declare("x").unwrap();
        let y = map.declare("y").unwrap();
        let header = ["y", "z", "x"];

        map.bind(&header);
        let first = (map.index_of(x), map.index_of(y));
        map.bind(&header);
        let second = (map.index_of(x), map.index_of(y));

        assert_eq!(first, (Some(2), Some(0)));
        assert_eq!(first, second);
    }

    #[test]
    fn rebinding_resets_previous_indices() {
        let mut map = ColumnMap::new();
        let x = map.declare("x").unwrap();
        assert!(map.bind(&["x"]));
        assert!(!map.bind(&["y"]));
        assert_eq!(map.index_of(x), None);
    }

    #[test]
    fn duplicate_declaration_is_rejected_unless_tolerated() {
        let mut map = ColumnMap::new();
        let first = map.declare("Foo").unwrap();
        assert!(matches!(
            map.declare("foo"),
            Err(XsvError::DuplicateColumn(name)) if name == "foo"
        ));
        assert_eq!(map.declare_or_get("FOO"), first);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn case_sensitive_map_matches_exactly() {
        let mut map = ColumnMap::case_sensitive();
        let upper = map.declare("Id").unwrap();
        let lower = map.declare("id").unwrap();
        assert!(!map.bind(&["id"]));
        assert_eq!(map.index_of(lower), Some(0));
        assert_eq!(map.index_of(upper), None);
        assert!(map.find("ID").is_none());
    }

    #[test]
    fn require_bind_lists_every_missing_column() {
        let mut map = ColumnMap::new();
        map.declare("a").unwrap();
        map.declare("b").unwrap();
        map.declare("c").unwrap();

        let error = map.require_bind(&["b"]).unwrap_err();
        match error {
            XsvError::MissingColumns(missing) => assert_eq!(missing, vec!["a", "c"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn handles_from_another_map_never_resolve() {
        let mut one = ColumnMap::new();
        let mut two = ColumnMap::new();
        let a1 = one.declare("a").unwrap();
        two.declare("a").unwrap();
        two.bind(&["a"]);

        assert_eq!(two.index_of(a1), None);
        assert_eq!(two.column_name(a1), None);
        assert!(matches!(two.get("missing"), Err(XsvError::UnknownColumn(_))));
    }

    #[test]
    fn from_header_binds_in_header_order() {
        let map = ColumnMap::from_header(&["baz", "foo"], false).unwrap();
        let foo = map.get("FOO").unwrap();
        assert_eq!(map.index_of(foo), Some(1));
        assert!(ColumnMap::from_header(&["a", "A"], false).is_err());
    }
}
