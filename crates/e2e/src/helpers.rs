//! Reusable UI interactions shared by scenarios

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::model::{BlogEntry, BlogList, Notification, SeedUser, Session};
use crate::step::Step;

/// Container of one rendered blog entry
pub const ENTRY_SELECTOR: &str = ".blog";

pub fn open_app() -> Vec<Step> {
    vec![Step::Goto { path: "/".to_string() }]
}

/// Open the login form if collapsed, fill in credentials and submit
pub fn login_with(username: &str, password: &str) -> Vec<Step> {
    vec![
        Step::click(Locator::button("login")),
        Step::fill(Locator::test_id("username"), username),
        Step::fill(Locator::test_id("password"), password),
        Step::click(Locator::button("login")),
    ]
}

/// Log in and wait for the confirmation
pub fn login_as(user: &SeedUser) -> Vec<Step> {
    let mut steps = login_with(&user.username, &user.password);
    steps.push(Step::expect_visible(Locator::text(user.logged_in_text())));
    steps
}

pub fn logout() -> Vec<Step> {
    vec![
        Step::click(Locator::button("logout")),
        Step::expect_visible(Locator::button("login")),
    ]
}

/// Fill and submit the "create new" form, then wait for `expected_content`
/// to be rendered
pub fn create_blog(title: &str, author: &str, url: &str, expected_content: &str) -> Vec<Step> {
    vec![
        Step::click(Locator::button("create new")),
        Step::fill(Locator::test_id("title"), title),
        Step::fill(Locator::test_id("author"), author),
        Step::fill(Locator::test_id("url"), url),
        Step::click(Locator::button("create").exact()),
        Step::wait_for(Locator::text(expected_content)),
    ]
}

/// Create `entry` and wait for its heading
pub fn create_entry(entry: &BlogEntry) -> Vec<Step> {
    create_blog(&entry.title, &entry.author, &entry.url, &entry.heading())
}

/// The single rendered entry whose text starts with `entry`'s heading
pub fn entry_locator(entry: &BlogEntry) -> Locator {
    Locator::css(ENTRY_SELECTOR).matching(entry.heading_pattern())
}

/// `target` shows exactly `entry`'s like count
fn expect_likes(target: Locator, entry: &BlogEntry) -> Step {
    Step::expect_visible(target.matching(entry.likes_pattern()))
}

/// Banner is visible, carries the message and is styled for its kind
pub fn expect_notification(notification: &Notification) -> Vec<Step> {
    let banner = Locator::css(notification.kind.selector()).has_text(notification.message.clone());
    vec![
        Step::expect_visible(banner.clone()),
        Step::expect_text(banner.clone(), notification.message.clone()),
        Step::expect_css(banner.clone(), "border-style", notification.kind.border_style()),
        Step::expect_css(banner, "color", notification.kind.color()),
    ]
}

/// Expand an entry to show url, likes and controls
pub fn show_details(entry: &BlogEntry) -> Vec<Step> {
    let entry_loc = entry_locator(entry);
    vec![
        Step::click(entry_loc.clone().within(Locator::button("view"))),
        Step::expect_visible(entry_loc.clone().within(Locator::button("hide"))),
        expect_likes(entry_loc, entry),
    ]
}

/// Like an entry once and wait for the counter to move by exactly one.
///
/// `list` tracks the expected likes; the entry must be expanded. The
/// `Liked` banner is left to the caller, since an earlier banner may still
/// be on screen.
pub fn like(list: &mut BlogList, title: &str) -> E2eResult<Vec<Step>> {
    let before = list
        .get(title)
        .cloned()
        .ok_or_else(|| E2eError::InvalidScenario(format!("cannot like unknown blog '{}'", title)))?;
    list.like(title);
    let after = BlogEntry {
        likes: before.likes + 1,
        ..before.clone()
    };

    let entry_loc = entry_locator(&before);
    Ok(vec![
        expect_likes(entry_loc.clone(), &before),
        Step::click(entry_loc.clone().within(Locator::button("like"))),
        expect_likes(entry_loc, &after),
    ])
}

/// Remove control is present only for the owner's session and absent
/// (not just disabled) for everyone else
pub fn expect_remove_control(entry: &BlogEntry, session: &Session) -> Step {
    let remove = entry_locator(entry).within(Locator::button("remove"));
    if entry.removable_by(session) {
        Step::expect_visible(remove)
    } else {
        Step::expect_count(remove, 0)
    }
}

/// Remove an expanded entry, accepting the confirmation dialog. Only the
/// owner's session can do this.
pub fn remove(list: &mut BlogList, title: &str, session: &Session) -> E2eResult<Vec<Step>> {
    let entry = list.remove(title, session).ok_or_else(|| {
        E2eError::InvalidScenario(format!(
            "'{}' cannot remove blog '{}'",
            session.username().unwrap_or("anonymous"),
            title
        ))
    })?;

    let mut steps = vec![
        Step::HandleDialogs { accept: true },
        Step::click(entry_locator(&entry).within(Locator::button("remove"))),
    ];
    steps.extend(expect_notification(&Notification::blog_removed(&entry)));
    steps.push(Step::expect_count(entry_locator(&entry), 0));
    Ok(steps)
}

/// Index-based order check against the like-descending sort key.
///
/// The n-th rendered entry must show the n-th largest like count. Its heading
/// is checked too unless another entry shares the count, since the relative
/// order of ties is up to the app. Entries must be expanded.
pub fn expect_order(list: &BlogList) -> Vec<Step> {
    let ordered = list.expected_order();
    let mut steps = vec![Step::expect_count(Locator::css(ENTRY_SELECTOR), ordered.len())];
    for (i, entry) in ordered.iter().enumerate() {
        let nth = Locator::css(ENTRY_SELECTOR).nth(i);
        steps.push(expect_likes(nth.clone(), entry));

        let tied = ordered.iter().filter(|e| e.likes == entry.likes).count() > 1;
        if !tied {
            steps.push(Step::expect_visible(nth.matching(entry.heading_pattern())));
        }
    }
    steps
}
