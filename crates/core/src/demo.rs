//! Fixed gallery data for running without a backend.

use chrono::DateTime;

use crate::print::{Category, PrintCard};
use crate::types::Timestamp;

fn at(unix_secs: i64) -> Timestamp {
    DateTime::from_timestamp(unix_secs, 0).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn card(
    id: &str,
    title: &str,
    description: &str,
    image_text: (&str, &str),
    counts: (u64, u64, u64),
    category: (&str, &str),
    author: (&str, &str, &str),
    created_at: Timestamp,
) -> PrintCard {
    let (color, label) = image_text;
    let (upvotes, views, comments) = counts;
    let (category_name, category_slug) = category;
    let (username, display_name, initial) = author;
    PrintCard {
        id: id.into(),
        title: title.into(),
        description: Some(description.into()),
        preview_image_url: Some(format!(
            "https://via.placeholder.com/400x400/{color}/FFFFFF?text={label}"
        )),
        upvote_count: upvotes,
        view_count: views,
        comment_count: comments,
        category_name: Some(category_name.into()),
        category_slug: Some(category_slug.into()),
        username: username.into(),
        display_name: Some(display_name.into()),
        avatar_url: Some(format!(
            "https://via.placeholder.com/40/{color}/FFFFFF?text={initial}"
        )),
        created_at,
    }
}

/// Demo prints, newest first.
pub fn demo_prints() -> Vec<PrintCard> {
    vec![
        card(
            "1",
            "Benchy the Benchmark Boat",
            "Classic 3D printing test model. Perfect first print!",
            ("4F46E5", "Benchy+Boat"),
            (142, 1205, 23),
            ("Functional Parts", "functional"),
            ("maker_dave", "Dave the Maker", "D"),
            at(1_705_314_600), // 2024-01-15T10:30:00Z
        ),
        card(
            "2",
            "Dragon Miniature",
            "Highly detailed fantasy dragon for tabletop gaming. Printed in resin.",
            ("EC4899", "Dragon"),
            (89, 654, 12),
            ("Miniatures & Figures", "miniatures"),
            ("resin_queen", "Sarah R.", "S"),
            at(1_705_245_600), // 2024-01-14T15:20:00Z
        ),
        card(
            "3",
            "Articulated Octopus",
            "Flexi print that moves! No supports needed.",
            ("F59E0B", "Octopus"),
            (215, 2103, 45),
            ("Toys & Games", "toys"),
            ("flexi_fan", "Alex M.", "A"),
            at(1_705_139_100), // 2024-01-13T09:45:00Z
        ),
        card(
            "4",
            "Phone Stand",
            "Simple and elegant phone stand. Print in any color!",
            ("06B6D4", "Phone+Stand"),
            (67, 432, 8),
            ("Functional Parts", "functional"),
            ("maker_dave", "Dave the Maker", "D"),
            at(1_705_068_900), // 2024-01-12T14:15:00Z
        ),
    ]
}

/// Categories offered by the upload form in demo mode.
pub fn demo_categories() -> Vec<Category> {
    [
        (1, "Functional Parts", "functional"),
        (2, "Miniatures & Figures", "miniatures"),
        (3, "Toys & Games", "toys"),
    ]
    .into_iter()
    .map(|(id, name, slug)| Category {
        id,
        name: name.into(),
        slug: slug.into(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_prints_are_newest_first() {
        let prints = demo_prints();
        assert_eq!(prints.len(), 4);
        assert!(prints.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[test]
    fn demo_timestamps_match_source_dates() {
        let benchy = &demo_prints()[0];
        let expected = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(benchy.created_at, expected);
        assert_eq!(benchy.upvote_count, 142);
    }

    #[test]
    fn demo_categories_cover_demo_prints() {
        let slugs: Vec<String> = demo_categories().into_iter().map(|c| c.slug).collect();
        for print in demo_prints() {
            let slug = print.category_slug.unwrap();
            assert!(slugs.contains(&slug), "missing category {slug}");
        }
    }
}
