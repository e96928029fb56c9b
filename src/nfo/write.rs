use super::NfoError;
use crate::record::VideoRecord;
use nfoforge_common::paths::episode_nfo_path;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-episode fields written to `episodedetails` NFOs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeMeta {
    pub title: String,
    pub plot: String,
    pub season: u32,
    pub episode: u32,
}

/// Title used for an episode the provider has not listed yet.
pub fn generated_episode_title(number: usize, language: &str) -> String {
    if language.to_ascii_lowercase().starts_with("zh") {
        format!("第{number}集")
    } else {
        format!("Episode {number}")
    }
}

struct NfoWriter {
    inner: Writer<Vec<u8>>,
}

impl NfoWriter {
    fn new() -> Result<Self, NfoError> {
        let mut inner = Writer::new_with_indent(Vec::new(), b' ', 2);
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { inner })
    }

    fn start(&mut self, element: BytesStart<'_>) -> Result<(), NfoError> {
        self.inner.write_event(Event::Start(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), NfoError> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, name: &str, text: &str) -> Result<(), NfoError> {
        self.start(BytesStart::new(name))?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn texts(&mut self, name: &str, values: &[String]) -> Result<(), NfoError> {
        values.iter().try_for_each(|v| self.text(name, v))
    }

    fn finish(self) -> Vec<u8> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        bytes
    }
}

/// Serialize a record to NFO XML.
///
/// With `hdr_title_suffix` the HDR label is appended to the title of HDR
/// content unless the title already carries it. The `uniqueid` of
/// `default_provider` is marked as the default one.
pub fn render_record(
    record: &VideoRecord,
    hdr_title_suffix: bool,
    default_provider: &str,
) -> Result<Vec<u8>, NfoError> {
    let detail = &record.detail;
    let root = record.category.nfo_root();

    let mut title = detail.title.clone();
    if hdr_title_suffix && record.hdr.is_hdr() && !title.contains(record.hdr.label()) {
        title = format!("{} {}", title, record.hdr.label());
    }

    let mut w = NfoWriter::new()?;
    w.start(BytesStart::new(root))?;

    w.text("title", &title)?;
    w.text("originaltitle", &detail.original_title)?;

    w.start(BytesStart::new("ratings"))?;
    w.start(BytesStart::new("rating").with_attributes([
        ("name", "themoviedb"),
        ("max", "10"),
        ("default", "true"),
    ]))?;
    w.text("value", &detail.rating.score.to_string())?;
    w.text("votes", &detail.rating.votes.to_string())?;
    w.end("rating")?;
    w.end("ratings")?;

    w.text("plot", &detail.plot)?;

    for (provider, id) in &detail.unique_ids {
        let is_default = if provider == default_provider { "true" } else { "false" };
        w.start(
            BytesStart::new("uniqueid")
                .with_attributes([("type", provider.as_str()), ("default", is_default)]),
        )?;
        w.inner.write_event(Event::Text(BytesText::new(id)))?;
        w.end("uniqueid")?;
    }

    w.texts("genre", &detail.genres)?;
    w.texts("country", &detail.countries)?;

    if record.is_tv() {
        w.text("status", if detail.is_ended { "Ended" } else { "Continuing" })?;
        w.text("season", &detail.season_number.to_string())?;
    } else {
        w.texts("credit", &detail.credits)?;
    }

    w.text("director", &detail.director)?;
    w.text("premiered", &detail.premiered)?;
    w.texts("studio", &detail.studios)?;

    for actor in &detail.actors {
        w.start(BytesStart::new("actor"))?;
        w.text("name", &actor.name)?;
        w.text("role", &actor.role)?;
        w.text("order", &actor.order.to_string())?;
        w.text("thumb", &actor.thumb)?;
        w.end("actor")?;
    }

    if let Some(set_name) = detail.set_name.as_deref().filter(|_| !record.is_tv()) {
        w.start(BytesStart::new("set"))?;
        w.text("name", set_name)?;
        w.end("set")?;
    }

    w.end(root)?;
    Ok(w.finish())
}

/// Write the record's NFO to `path`.
pub fn write_record_as_nfo(
    record: &VideoRecord,
    path: &Path,
    hdr_title_suffix: bool,
    default_provider: &str,
) -> Result<(), NfoError> {
    let bytes = render_record(record, hdr_title_suffix, default_provider)?;
    std::fs::write(path, bytes).map_err(|e| NfoError::io(path, e))?;
    debug!(path = %path.display(), "Wrote NFO");
    Ok(())
}

fn render_episode(meta: &EpisodeMeta) -> Result<Vec<u8>, NfoError> {
    let mut w = NfoWriter::new()?;
    w.start(BytesStart::new("episodedetails"))?;
    w.text("title", &meta.title)?;
    w.text("season", &meta.season.to_string())?;
    w.text("episode", &meta.episode.to_string())?;
    w.text("plot", &meta.plot)?;
    w.end("episodedetails")?;
    Ok(w.finish())
}

/// Write one `episodedetails` NFO per on-disk episode, pairing provider
/// episodes with files by position.
///
/// When the counts differ the provider list cannot be trusted for every file:
/// with `force_online_meta` the files the provider covers still get provider
/// data and the rest get generated entries, otherwise every file gets a
/// generated entry. Returns the number of NFOs written.
pub fn write_episode_nfos(
    provider_episodes: &[EpisodeMeta],
    episode_paths: &[PathBuf],
    season: u32,
    force_online_meta: bool,
    language: &str,
) -> Result<usize, NfoError> {
    let counts_match = provider_episodes.len() == episode_paths.len();
    if !counts_match {
        warn!(
            provider = provider_episodes.len(),
            on_disk = episode_paths.len(),
            force_online_meta,
            "Provider episode count differs from files on disk"
        );
    }

    for (i, path) in episode_paths.iter().enumerate() {
        let online = provider_episodes
            .get(i)
            .filter(|_| counts_match || force_online_meta);

        let meta = match online {
            Some(meta) => meta.clone(),
            None => EpisodeMeta {
                title: generated_episode_title(i + 1, language),
                plot: String::new(),
                season,
                episode: (i + 1) as u32,
            },
        };

        let nfo_path = episode_nfo_path(path);
        let bytes = render_episode(&meta)?;
        std::fs::write(&nfo_path, bytes).map_err(|e| NfoError::io(&nfo_path, e))?;
    }

    Ok(episode_paths.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfo::XmlElement;
    use nfoforge_common::{FileLayout, HdrClass, VideoCategory};

    fn episodes(n: usize) -> Vec<EpisodeMeta> {
        (1..=n)
            .map(|i| EpisodeMeta {
                title: format!("Online {i}"),
                plot: format!("Plot {i}"),
                season: 2,
                episode: i as u32,
            })
            .collect()
    }

    fn episode_files(dir: &Path, n: usize) -> Vec<PathBuf> {
        (1..=n)
            .map(|i| {
                let p = dir.join(format!("Show.S02E{i:02}.mkv"));
                std::fs::write(&p, b"").unwrap();
                p
            })
            .collect()
    }

    fn episode_title(path: &Path) -> String {
        let xml = std::fs::read_to_string(episode_nfo_path(path)).unwrap();
        let root = XmlElement::parse(&xml).unwrap();
        assert_eq!(root.name, "episodedetails");
        root.child_text("title").unwrap().to_string()
    }

    #[test]
    fn test_hdr_suffix_applied_once() {
        let mut record =
            VideoRecord::movie(VideoCategory::Movie, Path::new("/m/A.mkv"), FileLayout::Standalone);
        record.detail.title = "Dune".into();
        record.hdr = HdrClass::DolbyVisionHdr10;

        let xml = String::from_utf8(render_record(&record, true, "tmdb").unwrap()).unwrap();
        assert_eq!(
            XmlElement::parse(&xml).unwrap().child_text("title"),
            Some("Dune DV HDR10")
        );

        record.detail.title = "Dune DV HDR10".into();
        let xml = String::from_utf8(render_record(&record, true, "tmdb").unwrap()).unwrap();
        assert_eq!(
            XmlElement::parse(&xml).unwrap().child_text("title"),
            Some("Dune DV HDR10")
        );
    }

    #[test]
    fn test_no_suffix_for_sdr_or_when_disabled() {
        let mut record =
            VideoRecord::movie(VideoCategory::Movie, Path::new("/m/A.mkv"), FileLayout::Standalone);
        record.detail.title = "Dune".into();

        record.hdr = HdrClass::Sdr;
        let xml = String::from_utf8(render_record(&record, true, "tmdb").unwrap()).unwrap();
        assert!(xml.contains("<title>Dune</title>"));

        record.hdr = HdrClass::Hdr10;
        let xml = String::from_utf8(render_record(&record, false, "tmdb").unwrap()).unwrap();
        assert!(xml.contains("<title>Dune</title>"));
    }

    #[test]
    fn test_document_layout() {
        let mut record = VideoRecord::show(Path::new("/tv/S"), Vec::new());
        record.detail.unique_ids.insert("tmdb".into(), "1399".into());
        record.detail.unique_ids.insert("imdb".into(), "tt0944947".into());
        record.detail.credits = vec!["ignored for tv".into()];

        let xml = String::from_utf8(render_record(&record, true, "tmdb").unwrap()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(r#"<uniqueid type="tmdb" default="true">1399</uniqueid>"#));
        assert!(xml.contains(r#"<uniqueid type="imdb" default="false">tt0944947</uniqueid>"#));
        assert!(xml.contains(r#"<rating name="themoviedb" max="10" default="true">"#));
        assert!(!xml.contains("<credit>"));

        let root = XmlElement::parse(&xml).unwrap();
        assert_eq!(root.name, "tvshow");
        assert_eq!(root.child_text("status"), Some("Continuing"));
    }

    #[test]
    fn test_episode_counts_match_uses_provider() {
        let dir = tempfile::tempdir().unwrap();
        let files = episode_files(dir.path(), 3);

        let written = write_episode_nfos(&episodes(3), &files, 2, false, "en-US").unwrap();
        assert_eq!(written, 3);
        assert_eq!(episode_title(&files[0]), "Online 1");
        assert_eq!(episode_title(&files[2]), "Online 3");
    }

    #[test]
    fn test_episode_mismatch_without_force_generates_all() {
        let dir = tempfile::tempdir().unwrap();
        let files = episode_files(dir.path(), 3);

        write_episode_nfos(&episodes(5), &files, 2, false, "en-US").unwrap();
        for (i, file) in files.iter().enumerate() {
            assert_eq!(episode_title(file), format!("Episode {}", i + 1));
        }
    }

    #[test]
    fn test_episode_mismatch_with_force_mixes_sources() {
        let dir = tempfile::tempdir().unwrap();
        let files = episode_files(dir.path(), 4);

        write_episode_nfos(&episodes(2), &files, 2, true, "zh-CN").unwrap();
        assert_eq!(episode_title(&files[0]), "Online 1");
        assert_eq!(episode_title(&files[1]), "Online 2");
        assert_eq!(episode_title(&files[2]), "第3集");

        let xml = std::fs::read_to_string(episode_nfo_path(&files[3])).unwrap();
        let root = XmlElement::parse(&xml).unwrap();
        assert_eq!(root.child_text("season"), Some("2"));
        assert_eq!(root.child_text("episode"), Some("4"));
        assert_eq!(root.child_text("plot"), Some(""));
    }
}
