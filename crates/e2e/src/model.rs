//! Bloglist domain model as observed through the UI
//!
//! The harness never reads the app's database. These types describe what a
//! scenario *expects* the rendered page to show, so assertions can be derived
//! from the model instead of being spelled out by hand.

use serde::{Deserialize, Serialize};

/// A user created through `POST /api/users` before a scenario runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl SeedUser {
    pub fn new(name: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// The user every scenario logs in as by default
    pub fn primary() -> Self {
        Self::new("John Doe", "john", "johnpw")
    }

    /// A second account used to check ownership rules
    pub fn secondary() -> Self {
        Self::new("Jane Roe", "jane", "janepw")
    }

    /// Confirmation text shown after a successful login
    pub fn logged_in_text(&self) -> String {
        format!("{} logged in", self.name)
    }
}

impl Default for SeedUser {
    fn default() -> Self {
        Self::primary()
    }
}

/// A blog entry as listed on the front page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub title: String,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub likes: u64,
    pub owner_username: String,
}

impl BlogEntry {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        url: impl Into<String>,
        owner: &SeedUser,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            url: url.into(),
            likes: 0,
            owner_username: owner.username.clone(),
        }
    }

    /// Collapsed heading text, e.g. `first title, by first author`
    pub fn heading(&self) -> String {
        format!("{}, by {}", self.title, self.author)
    }

    /// Pattern for an entry whose text starts with this heading, so that
    /// `a, by x` never matches an entry titled `aa`
    pub fn heading_pattern(&self) -> String {
        format!(r"^\s*{}", regex::escape(&self.heading()))
    }

    /// Pattern for the like counter at exactly this count, so that `likes 1`
    /// never matches `likes 12`
    pub fn likes_pattern(&self) -> String {
        format!(r"\blikes {}(\D|$)", self.likes)
    }

    /// Whether the remove control should be rendered for this session
    pub fn removable_by(&self, session: &Session) -> bool {
        session.username() == Some(self.owner_username.as_str())
    }
}

/// Client-side login state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user: &SeedUser) -> Self {
        Self {
            username: Some(user.username.clone()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Expected state of the blog list, tracked alongside a scenario's actions
#[derive(Debug, Clone, Default)]
pub struct BlogList {
    entries: Vec<BlogEntry>,
}

impl BlogList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: BlogEntry) -> &BlogEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn get(&self, title: &str) -> Option<&BlogEntry> {
        self.entries.iter().find(|e| e.title == title)
    }

    /// Record one like and return the new count
    pub fn like(&mut self, title: &str) -> Option<u64> {
        let entry = self.entries.iter_mut().find(|e| e.title == title)?;
        entry.likes += 1;
        Some(entry.likes)
    }

    /// Remove an entry on behalf of `session`. Only the owner may do this.
    pub fn remove(&mut self, title: &str, session: &Session) -> Option<BlogEntry> {
        let index = self.entries.iter().position(|e| e.title == title)?;
        if !self.entries[index].removable_by(session) {
            return None;
        }
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order: likes descending, ties in creation order
    pub fn expected_order(&self) -> Vec<&BlogEntry> {
        let mut ordered: Vec<&BlogEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.likes.cmp(&a.likes));
        ordered
    }
}

/// Returns true when `likes` is non-increasing
pub fn is_ordered_by_likes(likes: &[u64]) -> bool {
    likes.windows(2).all(|w| w[0] >= w[1])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    /// CSS selector of the banner
    pub fn selector(&self) -> &'static str {
        match self {
            NotificationKind::Success => ".success",
            NotificationKind::Error => ".error",
        }
    }

    /// Computed `color` of the banner text
    pub fn color(&self) -> &'static str {
        match self {
            NotificationKind::Success => "rgb(0, 128, 0)",
            NotificationKind::Error => "rgb(255, 0, 0)",
        }
    }

    pub fn border_style(&self) -> &'static str {
        "solid"
    }
}

/// A feedback banner with its literal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn blog_added(entry: &BlogEntry) -> Self {
        Self::success(format!("A new blog {} by {} added", entry.title, entry.author))
    }

    pub fn blog_liked(entry: &BlogEntry) -> Self {
        Self::success(format!("Liked {}", entry.title))
    }

    pub fn blog_removed(entry: &BlogEntry) -> Self {
        Self::success(format!("Removed {}", entry.title))
    }

    pub fn wrong_credentials() -> Self {
        Self::error("Wrong credentials")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn entry(title: &str) -> BlogEntry {
        BlogEntry::new(title, "someone", "https://example.com", &SeedUser::primary())
    }

    #[test]
    fn test_heading_and_confirmation_text() {
        let e = BlogEntry::new("first title", "first author", "https://first.com", &SeedUser::primary());
        assert_eq!(e.heading(), "first title, by first author");
        assert_eq!(SeedUser::primary().logged_in_text(), "John Doe logged in");
    }

    #[test]
    fn test_notification_messages() {
        let e = BlogEntry::new("first title", "first author", "https://first.com", &SeedUser::primary());
        assert_eq!(Notification::blog_added(&e).message, "A new blog first title by first author added");
        assert_eq!(Notification::blog_liked(&e).message, "Liked first title");
        assert_eq!(Notification::blog_removed(&e).message, "Removed first title");

        let err = Notification::wrong_credentials();
        assert_eq!(err.message, "Wrong credentials");
        assert_eq!(err.kind.selector(), ".error");
        assert_eq!(err.kind.color(), "rgb(255, 0, 0)");
        assert_eq!(err.kind.border_style(), "solid");
    }

    #[test]
    fn test_like_increments_by_one() {
        let mut list = BlogList::new();
        list.add(entry("a"));
        assert_eq!(list.like("a"), Some(1));
        assert_eq!(list.like("a"), Some(2));
        assert_eq!(list.like("missing"), None);
    }

    #[test]
    fn test_only_owner_may_remove() {
        let mut list = BlogList::new();
        list.add(entry("a"));

        let stranger = Session::logged_in(&SeedUser::secondary());
        assert!(list.remove("a", &stranger).is_none());
        assert!(list.remove("a", &Session::anonymous()).is_none());
        assert_eq!(list.len(), 1);

        let owner = Session::logged_in(&SeedUser::primary());
        assert!(list.remove("a", &owner).is_some());
        assert!(list.is_empty());
    }

    #[test]
    fn test_expected_order_is_stable_by_likes() {
        let mut list = BlogList::new();
        list.add(entry("first"));
        list.add(entry("second"));
        list.add(entry("third"));

        list.like("third");
        list.like("third");
        list.like("second");

        let titles: Vec<&str> = list.expected_order().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        // first and second now tie on 1 like and keep creation order
        list.like("first");
        let titles: Vec<&str> = list.expected_order().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first", "second"]);

        let likes: Vec<u64> = list.expected_order().iter().map(|e| e.likes).collect();
        assert!(is_ordered_by_likes(&likes));
    }

    #[test]
    fn test_likes_pattern_is_exact() {
        let mut e = entry("a");
        e.likes = 12;
        let twelve = regex::Regex::new(&e.likes_pattern()).unwrap();
        assert!(twelve.is_match("likes 12 like"));
        assert!(twelve.is_match("likes 12"));
        assert!(!twelve.is_match("likes 120"));

        e.likes = 1;
        let one = regex::Regex::new(&e.likes_pattern()).unwrap();
        assert!(one.is_match("likes 1 like"));
        assert!(!one.is_match("likes 12 like"));
        assert!(!one.is_match("likes 10"));
    }

    #[test]
    fn test_heading_pattern_ignores_longer_titles() {
        let owner = SeedUser::primary();
        let short = BlogEntry::new("a", "x", "u", &owner);
        let pattern = regex::Regex::new(&short.heading_pattern()).unwrap();
        assert!(pattern.is_match("a, by x view"));
        assert!(!pattern.is_match("aa, by x view"));

        let dotted = BlogEntry::new("v1.0 (beta)", "x", "u", &owner);
        let pattern = regex::Regex::new(&dotted.heading_pattern()).unwrap();
        assert!(pattern.is_match("v1.0 (beta), by x"));
        assert!(!pattern.is_match("v1x0 (beta), by x"));
    }

    #[test_case(&[], true ; "empty")]
    #[test_case(&[3], true ; "single")]
    #[test_case(&[3, 2, 2, 0], true ; "ties allowed")]
    #[test_case(&[1, 2], false ; "increasing")]
    #[test_case(&[5, 0, 1], false ; "late inversion")]
    fn test_is_ordered_by_likes(likes: &[u64], expected: bool) {
        assert_eq!(is_ordered_by_likes(likes), expected);
    }
}
