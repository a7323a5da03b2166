use super::article::MAX_TAGS;

/// A tag as shown in the tag input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub text: String,
}

impl Tag {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
        }
    }

    pub fn from_ids(tag_ids: &[String]) -> Vec<Tag> {
        tag_ids.iter().map(|id| Tag::new(id.clone())).collect()
    }
}

/// Parses comma separated tag input into tag ids.
///
/// Entries are trimmed, blanks dropped and duplicates removed keeping the
/// first occurrence. Anything past `MAX_TAGS` is discarded.
pub fn normalize_tags(input: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let id = raw.trim();
        if id.is_empty() || ids.iter().any(|existing| existing == id) {
            continue;
        }
        ids.push(id.to_string());
        if ids.len() == MAX_TAGS {
            break;
        }
    }
    ids
}

pub fn join_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_dedupes() {
        assert_eq!(
            normalize_tags(" rust , web,,rust, cms "),
            vec!["rust", "web", "cms"]
        );
    }

    #[test]
    fn normalize_caps_at_five() {
        let ids = normalize_tags("a,b,c,d,e,f,g");
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn tags_round_trip_through_text() {
        let tags = Tag::from_ids(&["x".to_string(), "y".to_string()]);
        assert_eq!(tags[0], Tag { id: "x".into(), text: "x".into() });
        assert_eq!(normalize_tags(&join_tags(&tags)), vec!["x", "y"]);
    }
}
