/// Display list of skills in use: `current` first, then up to
/// `history_limit` distinct names from the end of `history`, most recent
/// first, without duplicates.
#[must_use]
pub fn active_skills(current: Option<&str>, history: &[&str], history_limit: usize) -> Vec<String> {
    let mut recent: Vec<&str> = Vec::with_capacity(history_limit);
    for &name in history.iter().rev() {
        if recent.len() == history_limit {
            break;
        }
        if !recent.contains(&name) {
            recent.push(name);
        }
    }

    let mut skills: Vec<String> = Vec::with_capacity(recent.len() + 1);
    for name in current.into_iter().chain(recent) {
        if !skills.iter().any(|s| s == name) {
            skills.push(name.to_string());
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_current_and_recent_history() {
        let history = ["interviewer", "specs", "designer"];
        assert_eq!(
            active_skills(Some("designer"), &history, 2),
            vec!["designer", "specs"]
        );
        assert_eq!(
            active_skills(Some("qa"), &history, 2),
            vec!["qa", "designer", "specs"]
        );
    }

    #[test]
    fn test_repeated_history_entries_count_once() {
        let history = ["a", "b", "b", "b"];
        assert_eq!(active_skills(None, &history, 2), vec!["b", "a"]);
        assert!(active_skills(None, &[], 2).is_empty());
        assert_eq!(active_skills(Some("x"), &history, 0), vec!["x"]);
    }

    proptest! {
        #[test]
        fn prop_no_duplicates_and_bounded(
            current in proptest::option::of("[a-c]"),
            history in proptest::collection::vec("[a-d]", 0..12),
            limit in 0usize..4,
        ) {
            let history: Vec<&str> = history.iter().map(String::as_str).collect();
            let skills = active_skills(current.as_deref(), &history, limit);
            let mut deduped = skills.clone();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), skills.len());
            prop_assert!(skills.len() <= limit + 1);
            if let Some(current) = current {
                prop_assert_eq!(skills.first().map(String::as_str), Some(current.as_str()));
            }
        }
    }
}
