//! Portfolio entries - the facts the engine is allowed to talk about

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a portfolio entry (e.g. `"p1"`, `"exp-acme"`)
///
/// Identifiers come from the knowledge file and are compared as plain strings,
/// which also gives the retriever its deterministic tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(String);

impl EntryId {
    /// Create an identifier from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of portfolio fact
///
/// The declaration order is the canonical load order of the knowledge store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Something the owner built
    Project,
    /// A role or position held
    Experience,
    /// A degree, course or certification
    Education,
    /// A skill, language or tool
    Skill,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 4] = [
        Category::Project,
        Category::Experience,
        Category::Education,
        Category::Skill,
    ];

    /// Lowercase name used in knowledge files and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Project => "project",
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Skill => "skill",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "project" | "projects" => Ok(Category::Project),
            "experience" | "work" | "job" => Ok(Category::Experience),
            "education" => Ok(Category::Education),
            "skill" | "skills" => Ok(Category::Skill),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// A calendar date with year precision and optional month precision
///
/// Portfolio timelines rarely carry days, so `"2021"` and `"2021-06"` are the only
/// accepted forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartialDate {
    year: u16,
    month: Option<u8>,
}

impl PartialDate {
    /// Create a date, validating the month range
    pub fn new(year: u16, month: Option<u8>) -> Result<Self, String> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(format!("Month out of range: {}", m));
            }
        }
        Ok(Self { year, month })
    }

    /// Calendar year
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Calendar month (1-12), if known
    pub fn month(&self) -> Option<u8> {
        self.month
    }
}

impl FromStr for PartialDate {
    type Err = String;

    /// Parse `"YYYY"` or `"YYYY-MM"`
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::PartialDate;
    ///
    /// let date: PartialDate = "2021-06".parse().unwrap();
    /// assert_eq!(date.year(), 2021);
    /// assert_eq!(date.month(), Some(6));
    /// assert!("June 2021".parse::<PartialDate>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.splitn(2, '-');

        let year_part = parts.next().unwrap_or_default();
        if year_part.len() != 4 {
            return Err(format!("Invalid year in date '{}'", s));
        }
        let year = year_part
            .parse::<u16>()
            .map_err(|_| format!("Invalid year in date '{}'", s))?;

        let month = match parts.next() {
            Some(m) if m.len() == 2 => Some(
                m.parse::<u8>()
                    .map_err(|_| format!("Invalid month in date '{}'", s))?,
            ),
            Some(_) => return Err(format!("Invalid month in date '{}'", s)),
            None => None,
        };

        Self::new(year, month)
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(m) => write!(f, "{:04}-{:02}", self.year, m),
            None => write!(f, "{:04}", self.year),
        }
    }
}

/// One immutable fact in the knowledge store
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Kind of fact
    pub category: Category,

    /// Short human-readable title ("Chat App", "Senior Engineer at Acme")
    pub title: String,

    /// Free-text description
    pub body: String,

    /// Lowercased keyword tags
    pub tags: BTreeSet<String>,

    /// When the entry started, if dated
    pub start: Option<PartialDate>,

    /// When the entry ended; `None` with a start date means ongoing
    pub end: Option<PartialDate>,
}

impl PortfolioEntry {
    /// Create an undated entry with no tags
    pub fn new(
        id: impl Into<EntryId>,
        category: Category,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            title: title.into(),
            body: body.into(),
            tags: BTreeSet::new(),
            start: None,
            end: None,
        }
    }

    /// Attach tags (lowercased and trimmed)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    /// Attach a date range
    pub fn with_dates(mut self, start: Option<PartialDate>, end: Option<PartialDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Whether the entry is still running (has a start and no end)
    pub fn is_ongoing(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Human-readable date range, e.g. `"2019-03 – present"`
    pub fn date_range(&self) -> Option<String> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => Some(format!("{} – {}", s, e)),
            (Some(s), None) => Some(format!("{} – present", s)),
            (None, Some(e)) => Some(format!("until {}", e)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_canonical() {
        let mut shuffled = vec![Category::Skill, Category::Project, Category::Education, Category::Experience];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Project".parse::<Category>().unwrap(), Category::Project);
        assert_eq!("skills".parse::<Category>().unwrap(), Category::Skill);
        assert!("hobby".parse::<Category>().is_err());
    }

    #[test]
    fn test_partial_date_parse() {
        let year_only: PartialDate = "2019".parse().unwrap();
        assert_eq!(year_only.month(), None);
        assert_eq!(year_only.to_string(), "2019");

        let with_month: PartialDate = "2019-03".parse().unwrap();
        assert_eq!(with_month.to_string(), "2019-03");

        assert!("2019-13".parse::<PartialDate>().is_err());
        assert!("19".parse::<PartialDate>().is_err());
        assert!("2019-3".parse::<PartialDate>().is_err());
        assert!("".parse::<PartialDate>().is_err());
    }

    #[test]
    fn test_partial_date_ordering() {
        let a: PartialDate = "2019".parse().unwrap();
        let b: PartialDate = "2019-01".parse().unwrap();
        let c: PartialDate = "2020".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_entry_tags_normalized() {
        let entry = PortfolioEntry::new("p1", Category::Project, "Chat App", "body")
            .with_tags(["AI", " Web ", ""]);
        assert_eq!(entry.tags.len(), 2);
        assert!(entry.tags.contains("ai"));
        assert!(entry.tags.contains("web"));
    }

    #[test]
    fn test_date_range() {
        let start = "2019-03".parse().ok();
        let entry = PortfolioEntry::new("e1", Category::Experience, "Engineer", "body")
            .with_dates(start, None);
        assert!(entry.is_ongoing());
        assert_eq!(entry.date_range().unwrap(), "2019-03 – present");
    }
}
