//! Mapping provider responses onto [`MetadataDetail`].

use super::provider::{Credits, MovieDetail, Named, SeasonSummary, TvDetail};
use crate::record::{Actor, MetadataDetail, Rating, TMDB_ID_KEY};

/// Season names that already mean "season one" and get no numeric suffix.
const SEASON_ONE_ALIASES: &[&str] = &[
    "第一部",
    "第1部",
    "第 1 部",
    "第一季",
    "第1季",
    "第 1 季",
    "SEASON ONE",
    "SEASON1",
    "SEASON 1",
];

fn names(entries: &[Named]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.name.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

fn insert_id(detail: &mut MetadataDetail, provider: &str, id: Option<String>) {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        detail.unique_ids.insert(provider.to_string(), id);
    }
}

pub fn apply_movie_detail(detail: &mut MetadataDetail, movie: &MovieDetail) {
    detail.title = movie.title.clone();
    detail.original_title = movie.original_title.clone();
    detail.rating = Rating {
        score: movie.vote_average,
        votes: movie.vote_count,
    };
    detail.plot = movie.overview.clone();
    detail.premiered = movie.release_date.clone();
    detail.genres = names(&movie.genres);
    detail.countries = names(&movie.production_countries);
    detail.studios = names(&movie.production_companies);

    detail.unique_ids.clear();
    detail.unique_ids.insert(TMDB_ID_KEY.to_string(), movie.id.to_string());
    insert_id(detail, "imdb", movie.imdb_id.clone());
}

/// Cast from the acting department, writers and the director.
///
/// `thumb_url` turns a profile path fragment into an absolute URL.
pub fn apply_credits(
    detail: &mut MetadataDetail,
    credits: &Credits,
    thumb_url: impl Fn(&str) -> String,
) {
    detail.actors = credits
        .cast
        .iter()
        .filter(|c| c.known_for_department == "Acting")
        .map(|c| Actor {
            name: c.name.clone(),
            role: c.character.clone(),
            order: c.order,
            thumb: c
                .profile_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(&thumb_url)
                .unwrap_or_default(),
        })
        .collect();

    detail.credits = credits
        .crew
        .iter()
        .filter(|c| matches!(c.job.as_str(), "Writer" | "Screenplay"))
        .map(|c| c.name.clone())
        .collect();

    if let Some(director) = credits.crew.iter().find(|c| c.job == "Director") {
        detail.director = director.name.clone();
    }
}

pub fn is_season_one_alias(name: &str) -> bool {
    let name = name.trim();
    SEASON_ONE_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(name))
}

pub fn select_season(tv: &TvDetail, season_number: u32) -> Option<&SeasonSummary> {
    tv.seasons.iter().find(|s| s.season_number == season_number)
}

/// Show title for one season: the bare show name for season one, otherwise
/// the show name followed by the season number.
pub fn season_title(show_name: &str, season: &SeasonSummary) -> String {
    if season.season_number == 1 || is_season_one_alias(&season.name) {
        show_name.to_string()
    } else {
        format!("{show_name} {}", season.season_number)
    }
}

pub fn is_ended_status(status: &str) -> bool {
    matches!(status, "Ended" | "Canceled")
}

/// Apply show-level detail narrowed to one season.
pub fn apply_tv_detail(detail: &mut MetadataDetail, tv: &TvDetail, season: &SeasonSummary) {
    detail.title = season_title(&tv.name, season);
    detail.original_title = tv.original_name.clone();
    detail.rating = Rating {
        score: tv.vote_average,
        votes: tv.vote_count,
    };
    detail.plot = if season.overview.trim().is_empty() {
        tv.overview.clone()
    } else {
        season.overview.clone()
    };
    detail.premiered = tv.first_air_date.clone();
    detail.genres = names(&tv.genres);
    detail.countries = names(&tv.production_countries);
    detail.studios = names(&tv.production_companies);
    detail.season_number = season.season_number;
    detail.is_ended = is_ended_status(&tv.status);

    detail.unique_ids.clear();
    detail.unique_ids.insert(TMDB_ID_KEY.to_string(), tv.id.to_string());
    if let Some(ext) = &tv.external_ids {
        insert_id(detail, "imdb", ext.imdb_id.clone());
        insert_id(detail, "tvdb", ext.tvdb_id.map(|id| id.to_string()));
    }
}

/// Season poster if the season has one, else the show poster.
pub fn season_poster(tv: &TvDetail, season: &SeasonSummary) -> Option<String> {
    season
        .poster_path
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| tv.poster_path.clone().filter(|p| !p.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::{CastMember, CrewMember, ExternalIds};

    fn season(number: u32, name: &str, overview: &str) -> SeasonSummary {
        SeasonSummary {
            season_number: number,
            name: name.into(),
            overview: overview.into(),
            poster_path: None,
        }
    }

    fn show() -> TvDetail {
        TvDetail {
            id: 1399,
            name: "权力的游戏".into(),
            original_name: "Game of Thrones".into(),
            overview: "Show overview".into(),
            status: "Ended".into(),
            poster_path: Some("/show.jpg".into()),
            external_ids: Some(ExternalIds {
                imdb_id: Some("tt0944947".into()),
                tvdb_id: Some(121361),
            }),
            seasons: vec![season(1, "第一季", ""), season(2, "Season 2", "Season overview")],
            ..Default::default()
        }
    }

    #[test]
    fn test_season_title_numbering() {
        assert_eq!(season_title("Dark", &season(1, "Staffel 1", "")), "Dark");
        assert_eq!(season_title("Dark", &season(3, "Season One", "")), "Dark");
        assert_eq!(season_title("Dark", &season(0, "第 1 部", "")), "Dark");
        assert_eq!(season_title("Dark", &season(2, "Staffel 2", "")), "Dark 2");
    }

    #[test]
    fn test_tv_detail_season_fallbacks() {
        let tv = show();
        let mut detail = MetadataDetail::default();

        apply_tv_detail(&mut detail, &tv, &tv.seasons[0]);
        assert_eq!(detail.title, "权力的游戏");
        assert_eq!(detail.plot, "Show overview");
        assert!(detail.is_ended);
        assert_eq!(detail.unique_ids.get("tvdb").map(String::as_str), Some("121361"));
        assert_eq!(detail.unique_ids.get("tmdb").map(String::as_str), Some("1399"));

        apply_tv_detail(&mut detail, &tv, &tv.seasons[1]);
        assert_eq!(detail.title, "权力的游戏 2");
        assert_eq!(detail.plot, "Season overview");
        assert_eq!(detail.season_number, 2);
    }

    #[test]
    fn test_detail_replaces_previous_ids() {
        let mut detail = MetadataDetail::default();
        detail.unique_ids.insert("imdb".into(), "tt0133093".into());
        detail.unique_ids.insert(TMDB_ID_KEY.into(), "603".into());

        let movie = MovieDetail {
            id: 999,
            imdb_id: None,
            ..Default::default()
        };
        apply_movie_detail(&mut detail, &movie);
        assert_eq!(detail.unique_ids.len(), 1);
        assert_eq!(detail.unique_ids.get(TMDB_ID_KEY).map(String::as_str), Some("999"));

        let mut tv = show();
        tv.external_ids = None;
        detail.unique_ids.insert("tvdb".into(), "1".into());
        apply_tv_detail(&mut detail, &tv, &tv.seasons[0]);
        assert_eq!(detail.unique_ids.len(), 1);
        assert_eq!(detail.unique_ids.get(TMDB_ID_KEY).map(String::as_str), Some("1399"));
    }

    #[test]
    fn test_season_poster_preference() {
        let mut tv = show();
        assert_eq!(season_poster(&tv, &tv.seasons[0]).as_deref(), Some("/show.jpg"));

        tv.seasons[0].poster_path = Some("/season.jpg".into());
        assert_eq!(season_poster(&tv, &tv.seasons[0]).as_deref(), Some("/season.jpg"));
        assert!(select_season(&tv, 5).is_none());
    }

    #[test]
    fn test_credits_filtering() {
        let credits = Credits {
            cast: vec![
                CastMember {
                    name: "Keanu Reeves".into(),
                    character: "Neo".into(),
                    order: 0,
                    known_for_department: "Acting".into(),
                    profile_path: Some("/keanu.jpg".into()),
                },
                CastMember {
                    name: "Stunt Double".into(),
                    known_for_department: "Crew".into(),
                    order: 1,
                    ..Default::default()
                },
            ],
            crew: vec![
                CrewMember { name: "Lilly".into(), job: "Screenplay".into() },
                CrewMember { name: "Lana".into(), job: "Director".into() },
                CrewMember { name: "Bill".into(), job: "Producer".into() },
            ],
        };

        let mut detail = MetadataDetail::default();
        apply_credits(&mut detail, &credits, |p| format!("https://img/original{p}"));

        assert_eq!(detail.actors.len(), 1);
        assert_eq!(detail.actors[0].thumb, "https://img/original/keanu.jpg");
        assert_eq!(detail.credits, vec!["Lilly"]);
        assert_eq!(detail.director, "Lana");
    }

    #[test]
    fn test_ended_statuses() {
        assert!(is_ended_status("Ended"));
        assert!(is_ended_status("Canceled"));
        assert!(!is_ended_status("Returning Series"));
    }
}
