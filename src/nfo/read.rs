use super::{NfoError, XmlElement, ACCEPTED_ROOTS};
use crate::record::{Actor, Rating, VideoRecord};
use std::path::Path;

/// Read an NFO file and check that its root element is one we accept.
pub fn read_nfo(path: &Path) -> Result<XmlElement, NfoError> {
    let content = std::fs::read_to_string(path).map_err(|e| NfoError::io(path, e))?;
    let root = XmlElement::parse(&content)?;

    if !ACCEPTED_ROOTS.contains(&root.name.as_str()) {
        return Err(NfoError::UnexpectedRoot(root.name));
    }
    Ok(root)
}

/// Populate `record.detail` from its sidecar NFO.
pub fn parse_nfo_into_record(record: &mut VideoRecord) -> Result<(), NfoError> {
    let root = read_nfo(&record.sidecars.nfo)?;
    apply_nfo(record, &root);
    Ok(())
}

/// Copy the fields of a parsed NFO into the record.
///
/// Shows without `<season>` are treated as season 1, and shows without
/// `<status>` are treated as ended.
pub fn apply_nfo(record: &mut VideoRecord, root: &XmlElement) {
    let is_tv = record.is_tv();
    let detail = &mut record.detail;

    detail.title = text(root, "title");
    detail.original_title = text(root, "originaltitle");
    detail.plot = text(root, "plot");
    detail.director = text(root, "director");
    detail.premiered = text(root, "premiered");

    detail.rating = Rating {
        score: parse_or_default(root.find("ratings/rating/value")),
        votes: parse_or_default(root.find("ratings/rating/votes")),
    };

    detail.unique_ids.clear();
    for uid in root.children_named("uniqueid") {
        let provider = uid.attr("type").unwrap_or("unknown").to_string();
        detail.unique_ids.insert(provider, uid.text.trim().to_string());
    }

    detail.genres = texts(root, "genre");
    detail.countries = texts(root, "country");
    detail.credits = texts(root, "credit");
    detail.studios = texts(root, "studio");

    detail.actors = root
        .children_named("actor")
        .enumerate()
        .map(|(i, actor)| Actor {
            name: text(actor, "name"),
            role: text(actor, "role"),
            order: actor
                .child_text("order")
                .and_then(|o| o.trim().parse().ok())
                .unwrap_or(i as u32),
            thumb: text(actor, "thumb"),
        })
        .collect();

    // The set a movie was discovered in survives an NFO without <set>.
    if let Some(name) = root.child("set").and_then(|set| {
        let name = set.child_text("name").unwrap_or(set.text.as_str()).trim();
        (!name.is_empty()).then(|| name.to_string())
    }) {
        detail.set_name = Some(name);
    }

    if is_tv {
        detail.season_number = root
            .child_text("season")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);
        detail.is_ended = root.child_text("status").map_or(true, |s| s.trim() == "Ended");
    }
}

fn text(node: &XmlElement, name: &str) -> String {
    node.child_text(name).unwrap_or_default().to_string()
}

fn texts(node: &XmlElement, name: &str) -> Vec<String> {
    node.children_named(name)
        .map(|c| c.text.clone())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_or_default<T: std::str::FromStr + Default>(node: Option<&XmlElement>) -> T {
    node.and_then(|n| n.text.trim().parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfoforge_common::{FileLayout, VideoCategory};
    use std::path::PathBuf;

    fn show() -> VideoRecord {
        VideoRecord::show(Path::new("/tv/Show"), vec![PathBuf::from("/tv/Show/E01.mkv")])
    }

    #[test]
    fn test_show_defaults_when_tags_absent() {
        let root = XmlElement::parse("<tvshow><title>Dark</title></tvshow>").unwrap();
        let mut record = show();
        record.detail.season_number = 3;
        apply_nfo(&mut record, &root);

        assert_eq!(record.detail.title, "Dark");
        assert_eq!(record.detail.season_number, 1);
        assert!(record.detail.is_ended);
    }

    #[test]
    fn test_show_continuing_status() {
        let root = XmlElement::parse(
            "<tvshow><status>Continuing</status><season>2</season></tvshow>",
        )
        .unwrap();
        let mut record = show();
        apply_nfo(&mut record, &root);

        assert_eq!(record.detail.season_number, 2);
        assert!(!record.detail.is_ended);
    }

    #[test]
    fn test_movie_fields() {
        let xml = r#"<movie>
            <title>The Matrix</title>
            <uniqueid type="tmdb" default="true">603</uniqueid>
            <uniqueid type="imdb">tt0133093</uniqueid>
            <credit>Lilly Wachowski</credit>
            <actor><name>Keanu Reeves</name><role>Neo</role><order>0</order><thumb/></actor>
            <actor><name>Carrie-Anne Moss</name><role>Trinity</role></actor>
            <set><name>The Matrix Collection</name></set>
        </movie>"#;
        let root = XmlElement::parse(xml).unwrap();
        let mut record =
            VideoRecord::movie(VideoCategory::MovieSet, Path::new("/m/M.mkv"), FileLayout::InFolder);
        apply_nfo(&mut record, &root);

        let detail = &record.detail;
        assert_eq!(detail.unique_ids.get("tmdb").map(String::as_str), Some("603"));
        assert_eq!(detail.unique_ids.get("imdb").map(String::as_str), Some("tt0133093"));
        assert_eq!(detail.credits, vec!["Lilly Wachowski"]);
        assert_eq!(detail.actors.len(), 2);
        assert_eq!(detail.actors[1].order, 1);
        assert_eq!(detail.set_name.as_deref(), Some("The Matrix Collection"));
        assert_eq!(detail.rating, Rating::default());
    }

    #[test]
    fn test_read_nfo_root_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.nfo");
        let bad = dir.path().join("bad.nfo");
        std::fs::write(&good, "<episodedetails><title>x</title></episodedetails>").unwrap();
        std::fs::write(&bad, "<musicvideo><title>x</title></musicvideo>").unwrap();

        assert!(read_nfo(&good).is_ok());
        assert!(matches!(read_nfo(&bad), Err(NfoError::UnexpectedRoot(r)) if r == "musicvideo"));
        assert!(matches!(
            read_nfo(&dir.path().join("missing.nfo")),
            Err(NfoError::Io { .. })
        ));
    }
}
