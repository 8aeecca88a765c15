//! Built-in bloglist scenarios

use crate::error::E2eResult;
use crate::helpers::{
    create_entry, entry_locator, expect_notification, expect_order, expect_remove_control, like,
    login_as, login_with, logout, open_app, remove, show_details,
};
use crate::locator::Locator;
use crate::model::{BlogEntry, BlogList, Notification, SeedUser, Session};
use crate::scenario::Scenario;
use crate::step::Step;

/// All built-in scenarios for the given seed user
pub fn builtin(seed: &SeedUser) -> E2eResult<Vec<Scenario>> {
    Ok(vec![
        front_page_can_be_opened(),
        login_form_is_shown(),
        login_succeeds(seed),
        login_fails(seed),
        blog_can_be_created(seed),
        blog_can_be_liked(seed)?,
        owner_can_delete_blog(seed)?,
        only_owner_sees_remove(seed),
        blogs_are_ordered_by_likes(seed)?,
    ])
}

fn first_blog(owner: &SeedUser) -> BlogEntry {
    BlogEntry::new("first title", "first author", "https://first.com", owner)
}

pub fn front_page_can_be_opened() -> Scenario {
    Scenario::new("front page can be opened")
        .tag("smoke")
        .steps(open_app())
        .step(Step::expect_visible(Locator::text("Log in to application")))
}

pub fn login_form_is_shown() -> Scenario {
    Scenario::new("login form is shown")
        .tag("smoke")
        .tag("login")
        .steps(open_app())
        .step(Step::click(Locator::button("login")))
        .step(Step::expect_visible(Locator::test_id("username")))
        .step(Step::expect_visible(Locator::test_id("password")))
}

pub fn login_succeeds(seed: &SeedUser) -> Scenario {
    Scenario::new("login succeeds with correct credentials")
        .tag("login")
        .steps(open_app())
        .steps(login_with(&seed.username, &seed.password))
        .step(Step::expect_visible(Locator::text(seed.logged_in_text())))
}

pub fn login_fails(seed: &SeedUser) -> Scenario {
    let wrong_password = format!("{}-wrong", seed.password);
    Scenario::new("login fails with wrong credentials")
        .tag("login")
        .steps(open_app())
        .steps(login_with(&seed.username, &wrong_password))
        .steps(expect_notification(&Notification::wrong_credentials()))
        .step(Step::expect_hidden(Locator::text(seed.logged_in_text())))
}

pub fn blog_can_be_created(seed: &SeedUser) -> Scenario {
    let entry = first_blog(seed);
    Scenario::new("a new blog can be created")
        .tag("blogs")
        .steps(open_app())
        .steps(login_as(seed))
        .steps(create_entry(&entry))
        .step(Step::expect_visible(Locator::text(entry.heading())))
        .steps(expect_notification(&Notification::blog_added(&entry)))
}

pub fn blog_can_be_liked(seed: &SeedUser) -> E2eResult<Scenario> {
    let mut list = BlogList::new();
    let entry = list.add(first_blog(seed)).clone();

    // The first banner may still be shown, so the second like checks the
    // counter only
    Ok(Scenario::new("a blog can be liked")
        .tag("blogs")
        .steps(open_app())
        .steps(login_as(seed))
        .steps(create_entry(&entry))
        .steps(show_details(&entry))
        .steps(like(&mut list, &entry.title)?)
        .steps(expect_notification(&Notification::blog_liked(&entry)))
        .steps(like(&mut list, &entry.title)?))
}

pub fn owner_can_delete_blog(seed: &SeedUser) -> E2eResult<Scenario> {
    let session = Session::logged_in(seed);
    let mut list = BlogList::new();
    let entry = list.add(first_blog(seed)).clone();

    Ok(Scenario::new("the owner can delete a blog")
        .tag("blogs")
        .tag("authorization")
        .steps(open_app())
        .steps(login_as(seed))
        .steps(create_entry(&entry))
        .steps(show_details(&entry))
        .step(Step::expect_text(entry_locator(&entry), seed.username.clone()))
        .step(expect_remove_control(&entry, &session))
        .steps(remove(&mut list, &entry.title, &session)?))
}

pub fn only_owner_sees_remove(seed: &SeedUser) -> Scenario {
    let other = if seed.username == SeedUser::secondary().username {
        SeedUser::primary()
    } else {
        SeedUser::secondary()
    };
    let entry = first_blog(seed);

    Scenario::new("only the owner sees the remove button")
        .tag("blogs")
        .tag("authorization")
        .with_user(other.clone())
        .steps(open_app())
        .steps(login_as(seed))
        .steps(create_entry(&entry))
        .steps(logout())
        .steps(login_as(&other))
        .steps(show_details(&entry))
        .step(expect_remove_control(&entry, &Session::logged_in(&other)))
}

pub fn blogs_are_ordered_by_likes(seed: &SeedUser) -> E2eResult<Scenario> {
    let mut list = BlogList::new();
    let entries = [
        list.add(BlogEntry::new("first title", "first author", "https://first.com", seed)).clone(),
        list.add(BlogEntry::new("second title", "second author", "https://second.com", seed)).clone(),
        list.add(BlogEntry::new("third title", "third author", "https://third.com", seed)).clone(),
    ];

    let mut scenario = Scenario::new("blogs are ordered by likes")
        .tag("blogs")
        .tag("ordering")
        .steps(open_app())
        .steps(login_as(seed));

    for entry in &entries {
        scenario = scenario.steps(create_entry(entry));
    }
    for entry in &entries {
        scenario = scenario.steps(show_details(entry));
    }

    // third: 2, second: 1, first: 0 gives a distinct count per entry
    for title in ["third title", "second title", "third title"] {
        scenario = scenario.steps(like(&mut list, title)?).steps(expect_order(&list));
    }
    Ok(scenario)
}
