//! Post preprocessing: duplicate removal and thread consolidation.
//!
//! Exports can repeat a post, and authors often split one announcement over
//! several posts published within a minute or two. Both are folded away
//! before classification so that each announcement is scored and traded once.

use std::collections::HashSet;

use chrono::Duration;

use super::post::{sort_chronologically, Post};

/// Drop posts whose id was already seen, keeping the first occurrence.
pub fn dedupe_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

/// Merge posts published within `window` of a thread's first post.
///
/// Walking chronologically, the earliest unassigned post anchors a thread
/// and every later unassigned post within `window` of the anchor joins it.
/// Membership is measured from the anchor only, so threads do not chain.
/// A merged post keeps the anchor's id, timestamp and engagement. A zero
/// window returns the posts sorted but otherwise untouched.
pub fn consolidate_threads(mut posts: Vec<Post>, window: Duration) -> Vec<Post> {
    sort_chronologically(&mut posts);
    if window <= Duration::zero() {
        return posts;
    }

    let mut pending: Vec<Option<Post>> = posts.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(pending.len());

    for i in 0..pending.len() {
        let Some(anchor) = pending[i].take() else {
            continue;
        };
        let mut members = Vec::new();
        for slot in &mut pending[i + 1..] {
            let joins = match slot.as_ref() {
                Some(p) => p.timestamp - anchor.timestamp <= window,
                None => continue,
            };
            if !joins {
                break;
            }
            members.extend(slot.take());
        }
        merged.push(merge(anchor, members));
    }

    merged
}

fn merge(anchor: Post, members: Vec<Post>) -> Post {
    if members.is_empty() {
        return anchor;
    }
    let thread_count = anchor.thread_count + members.iter().map(|p| p.thread_count).sum::<usize>();
    let text = std::iter::once(anchor.text.as_str())
        .chain(members.iter().map(|p| p.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n\n");
    Post {
        text,
        thread_count,
        ..anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::Engagement;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 10, h, m, 0).unwrap()
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let posts = vec![
            Post::new("1", at(10, 0), "first copy"),
            Post::new("2", at(10, 5), "other"),
            Post::new("1", at(10, 0), "second copy"),
        ];
        let kept = dedupe_by_id(posts);
        assert_eq!(ids(&kept), vec!["1", "2"]);
        assert_eq!(kept[0].text, "first copy");
    }

    #[test]
    fn close_posts_become_one_thread() {
        let posts = vec![
            Post::new("c", at(10, 30), "unrelated"),
            Post::new("b", at(10, 1), "mainnet goes live"),
            Post::new("a", at(10, 0), "Big news 1/2"),
        ];
        let out = consolidate_threads(posts, Duration::minutes(2));
        assert_eq!(ids(&out), vec!["a", "c"]);
        assert_eq!(out[0].text, "Big news 1/2\n\nmainnet goes live");
        assert_eq!(out[0].thread_count, 2);
        assert_eq!(out[0].timestamp, at(10, 0));
        assert!(out[0].is_thread());
        assert!(!out[1].is_thread());
    }

    #[test]
    fn threads_are_measured_from_the_anchor() {
        let posts = vec![
            Post::new("a", at(10, 0), "1"),
            Post::new("b", at(10, 2), "2"),
            Post::new("c", at(10, 4), "3"),
        ];
        let out = consolidate_threads(posts, Duration::minutes(2));
        assert_eq!(ids(&out), vec!["a", "c"]);
        assert_eq!(out[0].thread_count, 2);
        assert_eq!(out[1].thread_count, 1);
    }

    #[test]
    fn merged_post_keeps_anchor_engagement() {
        let lead = Engagement {
            likes: 450,
            retweets: 120,
            ..Engagement::default()
        };
        let posts = vec![
            Post::new("a", at(10, 0), "1").with_engagement(lead),
            Post::new("b", at(10, 1), "2").with_engagement(Engagement {
                likes: 3,
                ..Engagement::default()
            }),
        ];
        let out = consolidate_threads(posts, Duration::minutes(2));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].engagement, Some(lead));
    }

    #[test]
    fn zero_window_only_sorts() {
        let posts = vec![
            Post::new("b", at(10, 1), "2"),
            Post::new("a", at(10, 0), "1"),
        ];
        let out = consolidate_threads(posts, Duration::zero());
        assert_eq!(ids(&out), vec!["a", "b"]);
        assert!(out.iter().all(|p| p.thread_count == 1));
    }

    #[test]
    fn empty_input() {
        assert!(consolidate_threads(Vec::new(), Duration::minutes(2)).is_empty());
        assert!(dedupe_by_id(Vec::new()).is_empty());
    }
}
